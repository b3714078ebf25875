//! Values command - print the resolved values of a release

use clap::ValueEnum;
use console::style;
use kubecd_core::Environment;
use kubecd_helm::{ProcessRunner, ValuesPipeline};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::error::{CliError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

pub fn run(
    env_file: &Path,
    release_name: &str,
    skip_value_from: bool,
    key: Option<&str>,
    output: OutputFormat,
    cache_root: Option<&Path>,
    debug: bool,
) -> Result<()> {
    let env = Environment::load(env_file)?;
    let release = env.get_release(release_name).ok_or_else(|| {
        let names: Vec<&str> = env.releases.iter().map(|r| r.name.as_str()).collect();
        CliError::environment_with_help(
            format!("release '{}' not found in environment '{}'", release_name, env.name),
            format!("available releases: {}", names.join(", ")),
        )
    })?;

    let pipeline = ValuesPipeline::new(Arc::new(ProcessRunner), super::inspect_cache_dir(cache_root)?);
    let values = pipeline.resolve_values(release, &env, skip_value_from)?;

    tracing::info!(release = %release.name, env = %env.name, keys = values.len(), "resolved values");
    if debug {
        eprintln!(
            "{} Resolved {} top-level key(s) for release {} in {}",
            style("DEBUG").dim(),
            values.len(),
            release.name,
            env.name
        );
    }

    let rendered = match key {
        Some(key) => {
            let node = values.get(key).ok_or_else(|| CliError::KeyNotFound {
                key: key.to_string(),
            })?;
            render(node, output)?
        }
        None => render(&values, output)?,
    };
    print!("{}", rendered);

    Ok(())
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|e| CliError::internal(format!("Failed to serialize values: {}", e))),
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map(|json| json + "\n")
            .map_err(|e| CliError::internal(format!("Failed to serialize values: {}", e))),
    }
}
