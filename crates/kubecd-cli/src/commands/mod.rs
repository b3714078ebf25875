//! CLI commands

use kubecd_helm::InspectCache;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub mod deploy;
pub mod inspect;
pub mod values;

/// Inspect cache directory under `--cache-dir`, else `KUBECD_CACHE` or the home directory
///
/// An empty `KUBECD_CACHE` counts as unset.
fn inspect_cache_dir(cache_root: Option<&Path>) -> Result<PathBuf> {
    let dir = match cache_root {
        Some(root) => InspectCache::resolve_dir(Some(root))?,
        None => InspectCache::default_dir()?,
    };
    tracing::debug!(dir = %dir.display(), "using inspect cache");
    Ok(dir)
}
