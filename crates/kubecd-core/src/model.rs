//! Environment and release definitions
//!
//! An environment file describes one deployment target (cluster, namespace,
//! default values) together with the releases deployed into it:
//!
//! ```yaml
//! name: prod
//! kubeNamespace: web
//! cluster:
//!   name: prod-cluster
//!   provider:
//!     gke:
//!       project: my-project
//!       clusterName: prod
//!       zone: europe-west1-b
//! defaultValues:
//!   - key: ingress.ip
//!     valueFrom:
//!       gceResource:
//!         address:
//!           name: prod-ip
//! releases:
//!   - name: frontend
//!     chart:
//!       dir: charts/frontend
//!     valuesFile: values-frontend.yaml
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// A deployment target
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub name: String,

    /// Namespace releases are installed into
    #[serde(default = "default_namespace")]
    pub kube_namespace: String,

    #[serde(default)]
    pub cluster: Option<Cluster>,

    /// Values file applied to every release (helm argv only)
    #[serde(default)]
    pub default_values_file: Option<String>,

    /// Values applied to every release, below release-level values
    #[serde(default)]
    pub default_values: Option<Vec<ChartValue>>,

    #[serde(default)]
    pub releases: Vec<Release>,

    /// Helm repositories the releases pull charts from
    #[serde(default)]
    pub helm_repos: Vec<HelmRepo>,
}

fn default_namespace() -> String {
    "default".to_string()
}

impl Environment {
    /// Load an environment file, remembering its location on every release
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut env: Environment = serde_yaml::from_str(&content)
            .map_err(|e| CoreError::parse(path.display().to_string(), e))?;

        let mut seen = HashSet::new();
        for release in &env.releases {
            if !seen.insert(release.name.as_str()) {
                return Err(CoreError::InvalidEnvironment {
                    path: path.to_path_buf(),
                    message: format!("duplicate release name '{}'", release.name),
                });
            }
        }

        for release in &mut env.releases {
            release.from_file = Some(path.to_path_buf());
        }
        Ok(env)
    }

    /// Get a release by name
    pub fn get_release(&self, name: &str) -> Option<&Release> {
        self.releases.iter().find(|r| r.name == name)
    }

    /// GKE settings of this environment's cluster, if any
    pub fn gke(&self) -> Option<&GkeProvider> {
        self.cluster.as_ref()?.provider.gke.as_ref()
    }
}

/// Helm repository reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelmRepo {
    pub name: String,
    pub url: String,
}

/// Kubernetes cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    #[serde(default)]
    pub provider: Provider,
}

/// Cluster provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Provider {
    #[serde(default)]
    pub gke: Option<GkeProvider>,
}

/// Google Kubernetes Engine cluster settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GkeProvider {
    pub project: String,
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
}

/// A release: one chart (or set of manifests) deployed into an environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub name: String,

    #[serde(default)]
    pub chart: Option<Chart>,

    /// Values file, relative to the file defining the release
    #[serde(default)]
    pub values_file: Option<String>,

    /// Inline values, highest precedence
    #[serde(default)]
    pub values: Option<Vec<ChartValue>>,

    /// Do not pass environment default values to helm
    #[serde(default)]
    pub skip_default_values: bool,

    /// Plain manifests applied with kubectl instead of a chart
    #[serde(default)]
    pub resource_files: Option<Vec<String>>,

    #[serde(skip)]
    pub from_file: Option<PathBuf>,
}

impl Release {
    /// Resolve `path` relative to the file this release was defined in
    pub fn abs_path(&self, path: &str) -> PathBuf {
        resolve_path_from_file(path, self.from_file.as_deref())
    }
}

/// Resolve `path` relative to the directory containing `file`
///
/// Absolute paths and paths without a reference file are returned as-is.
pub fn resolve_path_from_file(path: &str, file: Option<&Path>) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match file.and_then(Path::parent) {
        Some(dir) => dir.join(path),
        None => path.to_path_buf(),
    }
}

/// Chart a release deploys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chart {
    /// Remote chart reference (e.g. "stable/nginx-ingress")
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Local chart directory
    #[serde(default)]
    pub dir: Option<String>,
}

/// Where a chart comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartSource<'a> {
    Local { dir: &'a str },
    Remote { reference: &'a str, version: &'a str },
}

impl Chart {
    /// The chart source, local directory first
    ///
    /// `None` when the chart names neither a directory nor a versioned reference.
    pub fn source(&self) -> Option<ChartSource<'_>> {
        if let Some(dir) = &self.dir {
            return Some(ChartSource::Local { dir });
        }
        match (&self.reference, &self.version) {
            (Some(reference), Some(version)) => Some(ChartSource::Remote { reference, version }),
            _ => None,
        }
    }
}

/// A single value entry: dotted key plus literal or external source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartValue {
    pub key: String,

    /// Literal value; a placeholder when `value_from` is set
    #[serde(default)]
    pub value: String,

    /// Read in map form: `valueFrom: {gceResource: {address: {name: ..}}}`
    #[serde(
        default,
        with = "serde_yaml::with::singleton_map_recursive",
        skip_serializing_if = "Option::is_none"
    )]
    pub value_from: Option<ValueFrom>,
}

impl ChartValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            value_from: None,
        }
    }

    pub fn from_source(key: impl Into<String>, source: ValueFrom) -> Self {
        Self {
            key: key.into(),
            value: String::new(),
            value_from: Some(source),
        }
    }
}

/// External source of a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueFrom {
    /// A Google Compute Engine resource
    GceResource(GceResource),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GceResource {
    /// Reserved IP address
    Address(GceAddressRef),
}

/// Reserved GCE address, looked up by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GceAddressRef {
    pub name: String,
    /// Global address instead of a regional one
    #[serde(default)]
    pub is_global: bool,
}
