//! Inspect command - print the default values of a remote chart

use console::style;
use kubecd_helm::{InspectCache, ProcessRunner};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::error::{CliError, Result};

pub fn run(reference: &str, version: &str, cache_root: Option<&Path>) -> Result<()> {
    let cache = InspectCache::new(super::inspect_cache_dir(cache_root)?, Arc::new(ProcessRunner));

    eprintln!(
        "{} {} v{}",
        style("Chart").cyan().bold(),
        reference,
        version
    );
    eprintln!(
        "  {}: {}",
        style("Cache entry").dim(),
        cache.entry_path(reference, version).display()
    );

    let values = cache.inspect(reference, version)?;
    tracing::debug!(%reference, %version, bytes = values.len(), "inspected chart values");

    std::io::stdout()
        .write_all(&values)
        .map_err(|e| CliError::Io {
            message: e.to_string(),
        })?;

    Ok(())
}
