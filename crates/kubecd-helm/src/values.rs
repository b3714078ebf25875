//! Resolved values for a release in an environment
//!
//! Sources are merged in ascending precedence:
//! 1. Chart defaults (`values.yaml` of a local chart, or inspected remote defaults)
//! 2. Environment `defaultValues`
//! 3. Release `valuesFile`
//! 4. Release inline `values`

use std::path::PathBuf;
use std::sync::Arc;

use kubecd_core::{ChartSource, Environment, Release, ValueTree};

use crate::cache::InspectCache;
use crate::error::{HelmError, Result};
use crate::resolve::ValueResolver;
use crate::runner::Runner;

/// Computes the final values handed to helm for a release
#[derive(Clone)]
pub struct ValuesPipeline {
    resolver: ValueResolver,
    cache: InspectCache,
}

impl ValuesPipeline {
    /// Create a pipeline running collaborators through `runner`, caching
    /// inspected chart values in `cache_dir`
    pub fn new(runner: Arc<dyn Runner>, cache_dir: PathBuf) -> Self {
        Self {
            resolver: ValueResolver::new(runner.clone()),
            cache: InspectCache::new(cache_dir, runner),
        }
    }

    /// Merge every value source of `release` for `env`
    ///
    /// The first failing source aborts the whole resolution.
    pub fn resolve_values(
        &self,
        release: &Release,
        env: &Environment,
        skip_external: bool,
    ) -> Result<ValueTree> {
        let mut values = ValueTree::new();

        let defaults = self
            .chart_defaults(release)
            .map_err(in_step(release, env, "chart default values"))?;
        if let Some(defaults) = defaults {
            values.merge(&defaults);
        }

        if let Some(default_values) = &env.default_values {
            let env_values = self
                .resolver
                .values_to_tree(default_values, env, skip_external)
                .map_err(in_step(release, env, "defaultValues"))?;
            values.merge(&env_values);
        }

        if let Some(values_file) = &release.values_file {
            let path = release.abs_path(values_file);
            let file_values = ValueTree::from_file(&path)
                .map_err(|e| in_step(release, env, "release values file")(e.into()))?;
            tracing::debug!(release = %release.name, path = %path.display(), "merged release values file");
            values.merge(&file_values);
        }

        if let Some(inline) = &release.values {
            let inline_values = self
                .resolver
                .values_to_tree(inline, env, skip_external)
                .map_err(in_step(release, env, "inline values"))?;
            values.merge(&inline_values);
        }

        Ok(values)
    }

    /// Default values bundled with the release's chart
    fn chart_defaults(&self, release: &Release) -> Result<Option<ValueTree>> {
        let Some(chart) = &release.chart else {
            return Ok(None);
        };

        match chart.source() {
            Some(ChartSource::Local { dir }) => {
                let chart_dir = release.abs_path(dir);
                if !chart_dir.is_dir() {
                    return Err(HelmError::MissingChartSource {
                        release: release.name.clone(),
                        message: format!("chart.dir {} does not exist", chart_dir.display()),
                    });
                }
                let values_file = chart_dir.join("values.yaml");
                if !values_file.exists() {
                    tracing::debug!(release = %release.name, "chart has no values.yaml");
                    return Ok(None);
                }
                Ok(Some(ValueTree::from_file(&values_file)?))
            }
            Some(ChartSource::Remote { reference, version }) => {
                let output = self.cache.inspect(reference, version)?;
                let origin = format!("inspected values of chart {reference} version {version}");
                Ok(Some(ValueTree::from_slice(origin, &output)?))
            }
            None => Err(HelmError::MissingChartSource {
                release: release.name.clone(),
                message: "chart names neither a dir nor a reference with a version".to_string(),
            }),
        }
    }
}

/// Wrap a step's error with the release and environment it failed for
fn in_step<'a>(
    release: &'a Release,
    env: &'a Environment,
    step: &'static str,
) -> impl Fn(HelmError) -> HelmError + 'a {
    move |e| e.in_step(&release.name, &env.name, step)
}
