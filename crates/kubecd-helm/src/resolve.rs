//! Value-from resolution
//!
//! A [`ChartValue`] may carry a [`ValueFrom`] descriptor instead of a literal.
//! Each descriptor kind implements [`ExternalSource`]; [`ValueResolver`]
//! dispatches to it and wraps failures with the key and environment.

use regex::Regex;
use std::sync::{Arc, LazyLock};

use kubecd_core::{
    ChartValue, Environment, GceAddressRef, GceResource, GkeProvider, ValueFrom, ValueTree, expand,
};

use crate::error::{BoxError, HelmError, Result};
use crate::runner::Runner;

/// An external source a value can be read from
pub trait ExternalSource {
    /// Look up the value for `env`, using `runner` for any external call
    fn resolve(&self, env: &Environment, runner: &dyn Runner) -> std::result::Result<String, BoxError>;
}

impl ExternalSource for ValueFrom {
    fn resolve(&self, env: &Environment, runner: &dyn Runner) -> std::result::Result<String, BoxError> {
        match self {
            ValueFrom::GceResource(GceResource::Address(address)) => address.resolve(env, runner),
        }
    }
}

impl ExternalSource for GceAddressRef {
    fn resolve(&self, env: &Environment, runner: &dyn Runner) -> std::result::Result<String, BoxError> {
        let gke = env
            .gke()
            .ok_or_else(|| format!("environment '{}' has no GKE cluster provider", env.name))?;
        let argv = gce_address_argv(self, gke)?;
        let out = runner.run("gcloud", &argv)?;
        Ok(String::from_utf8_lossy(&out).trim().to_string())
    }
}

static ZONE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-[a-z]$").expect("zone suffix pattern is valid"));

/// Region containing a zone: `"us-central1-a"` -> `"us-central1"`
///
/// Strings without a single-letter zone suffix are returned unchanged.
pub fn zone_to_region(zone: &str) -> String {
    ZONE_SUFFIX.replace(zone, "").into_owned()
}

/// `gcloud` arguments describing a reserved address
pub fn gce_address_argv(
    address: &GceAddressRef,
    gke: &GkeProvider,
) -> std::result::Result<Vec<String>, String> {
    let mut argv: Vec<String> = [
        "compute",
        "addresses",
        "describe",
        address.name.as_str(),
        "--format",
        "value(address)",
        "--project",
        gke.project.as_str(),
    ]
    .into_iter()
    .map(String::from)
    .collect();

    if address.is_global {
        argv.push("--global".to_string());
    } else {
        let region = match (&gke.zone, &gke.region) {
            (Some(zone), _) => zone_to_region(zone),
            (None, Some(region)) => region.clone(),
            (None, None) => {
                return Err(format!(
                    "address '{}' is regional but the cluster has neither zone nor region",
                    address.name
                ));
            }
        };
        argv.push("--region".to_string());
        argv.push(region);
    }

    Ok(argv)
}

/// Resolves value entries against an environment
#[derive(Clone)]
pub struct ValueResolver {
    runner: Arc<dyn Runner>,
}

impl ValueResolver {
    pub fn new(runner: Arc<dyn Runner>) -> Self {
        Self { runner }
    }

    /// Resolve one entry
    ///
    /// Returns a copy of the entry with `value` filled in from its external
    /// source. With `skip_external`, or without a source, the copy is unchanged.
    pub fn resolve(&self, value: &ChartValue, env: &Environment, skip_external: bool) -> Result<ChartValue> {
        let resolved = ChartValue::new(value.key.clone(), value.value.clone());
        let source = match &value.value_from {
            Some(source) if !skip_external => source,
            _ => return Ok(resolved),
        };

        let literal = source
            .resolve(env, self.runner.as_ref())
            .map_err(|source| HelmError::ExternalResolution {
                key: value.key.clone(),
                environment: env.name.clone(),
                source,
            })?;
        tracing::debug!(key = %value.key, env = %env.name, "resolved external value");

        Ok(ChartValue { value: literal, ..resolved })
    }

    /// Resolve a list of entries and build the tree they describe
    ///
    /// Later entries win over earlier ones on the same key.
    pub fn values_to_tree(
        &self,
        values: &[ChartValue],
        env: &Environment,
        skip_external: bool,
    ) -> Result<ValueTree> {
        let mut result = ValueTree::new();
        for value in values {
            let resolved = self.resolve(value, env, skip_external)?;
            result.merge(&expand(&resolved.key, resolved.value));
        }
        Ok(result)
    }
}
