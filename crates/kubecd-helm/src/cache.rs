//! Content-addressed cache for inspected chart values
//!
//! `helm inspect values` for a remote chart is slow and its output never
//! changes for a given (reference, version), so the raw output is stored on
//! disk under the SHA-1 of both.
//!
//! Layout: `${KUBECD_CACHE:-$HOME}/.kubecd/cache/inspect/<hex digest>`.
//! Concurrent writers race; the last one wins.

use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{HelmError, Result};
use crate::runner::Runner;

/// Environment variable overriding the cache root
pub const CACHE_ENV_VAR: &str = "KUBECD_CACHE";

/// On-disk cache of `helm inspect values` output
#[derive(Clone)]
pub struct InspectCache {
    dir: PathBuf,
    runner: Arc<dyn Runner>,
}

impl InspectCache {
    /// Create a cache storing entries directly in `dir`
    pub fn new(dir: PathBuf, runner: Arc<dyn Runner>) -> Self {
        Self { dir, runner }
    }

    /// Cache directory from `KUBECD_CACHE`, falling back to the home directory
    pub fn default_dir() -> Result<PathBuf> {
        let root = std::env::var_os(CACHE_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::resolve_dir(root.as_deref())
    }

    /// Cache directory under `root`, or under the home directory without one
    pub fn resolve_dir(root: Option<&Path>) -> Result<PathBuf> {
        let root = match root {
            Some(root) => root.to_path_buf(),
            None => dirs::home_dir().ok_or_else(|| HelmError::CacheDir {
                message: format!("{CACHE_ENV_VAR} is not set and no home directory was found"),
            })?,
        };
        Ok(root.join(".kubecd").join("cache").join("inspect"))
    }

    /// Directory holding cache entries
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hex SHA-1 over `reference` followed by `version`
    pub fn cache_key(reference: &str, version: &str) -> String {
        let mut hasher = Sha1::new();
        hasher.update(reference.as_bytes());
        hasher.update(version.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Path of the entry for a chart version
    pub fn entry_path(&self, reference: &str, version: &str) -> PathBuf {
        self.dir.join(Self::cache_key(reference, version))
    }

    /// Default values of a remote chart, read through the cache
    pub fn inspect(&self, reference: &str, version: &str) -> Result<Vec<u8>> {
        let path = self.entry_path(reference, version);

        if std::fs::metadata(&path).is_ok() {
            tracing::debug!(%reference, %version, path = %path.display(), "inspect cache hit");
            return std::fs::read(&path).map_err(|source| HelmError::CacheRead { path, source });
        }

        tracing::debug!(%reference, %version, "inspect cache miss");
        let args = vec![
            "inspect".to_string(),
            "values".to_string(),
            reference.to_string(),
            "--version".to_string(),
            version.to_string(),
        ];
        let out = self
            .runner
            .run("helm", &args)
            .map_err(|source| HelmError::Inspect {
                reference: reference.to_string(),
                version: version.to_string(),
                source,
            })?;

        std::fs::create_dir_all(&self.dir).map_err(|source| HelmError::CacheWrite {
            path: self.dir.clone(),
            source,
        })?;
        std::fs::write(&path, &out).map_err(|source| HelmError::CacheWrite {
            path: path.clone(),
            source,
        })?;

        Ok(out)
    }
}
