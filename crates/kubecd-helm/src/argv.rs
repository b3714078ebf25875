//! Command lines for deploying an environment
//!
//! Chart releases become `helm upgrade -i` invocations, manifest releases
//! become `kubectl apply`. Values are passed to helm as `--values` files and
//! `--set-string` lists, resolving value-from entries on the way.

use std::path::PathBuf;

use kubecd_core::{ChartSource, ChartValue, Environment, HelmRepo, Release};

use crate::error::{HelmError, Result};
use crate::resolve::ValueResolver;

/// kubectl context name used for an environment
pub fn kube_context_name(env_name: &str) -> String {
    format!("env:{env_name}")
}

/// `helm repo add` for every repository, then `helm repo update`
pub fn repo_setup_commands(repos: &[HelmRepo]) -> Vec<Vec<String>> {
    let mut commands: Vec<Vec<String>> = repos
        .iter()
        .map(|repo| argv(["helm", "repo", "add", repo.name.as_str(), repo.url.as_str()]))
        .collect();
    commands.push(argv(["helm", "repo", "update"]));
    commands
}

pub fn use_context_command(env_name: &str) -> Vec<String> {
    argv(["kubectl", "config", "use-context", kube_context_name(env_name).as_str()])
}

pub fn kubectl_apply_argv(resource_files: &[PathBuf], dry_run: bool, env_name: &str) -> Vec<String> {
    let mut cmd = argv(["kubectl", "--context", kube_context_name(env_name).as_str(), "apply"]);
    if dry_run {
        cmd.push("--dry-run".to_string());
    }
    for file in resource_files {
        cmd.push("-f".to_string());
        cmd.push(file.display().to_string());
    }
    cmd
}

/// Builds helm command lines, resolving value-from entries with `resolver`
pub struct HelmArgv<'a> {
    resolver: &'a ValueResolver,
    dry_run: bool,
    debug: bool,
    diff: bool,
}

impl<'a> HelmArgv<'a> {
    pub fn new(resolver: &'a ValueResolver) -> Self {
        Self {
            resolver,
            dry_run: false,
            debug: false,
            diff: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Make [`HelmArgv::deploy_commands`] produce `helm diff upgrade` lines
    pub fn diff(mut self, diff: bool) -> Self {
        self.diff = diff;
        self
    }

    /// `key=value,...` for `--set-string`
    pub fn format_set_values(&self, values: &[ChartValue], env: &Environment) -> Result<String> {
        let pairs = values
            .iter()
            .map(|value| -> Result<String> {
                let resolved = self.resolver.resolve(value, env, false)?;
                Ok(format!("{}={}", resolved.key, resolved.value))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(pairs.join(","))
    }

    /// Values arguments in ascending precedence
    pub fn values_argv(&self, release: &Release, env: &Environment) -> Result<Vec<String>> {
        let mut cmd = Vec::new();
        if !release.skip_default_values {
            if let Some(file) = &env.default_values_file {
                cmd.push("--values".to_string());
                cmd.push(release.abs_path(file).display().to_string());
            }
            if let Some(values) = &env.default_values {
                cmd.push("--set-string".to_string());
                cmd.push(self.format_set_values(values, env)?);
            }
        }
        if let Some(file) = &release.values_file {
            cmd.push("--values".to_string());
            cmd.push(release.abs_path(file).display().to_string());
        }
        if let Some(values) = &release.values {
            cmd.push("--set-string".to_string());
            cmd.push(self.format_set_values(values, env)?);
        }
        Ok(cmd)
    }

    /// Chart location arguments: a local directory or `<reference> --version <version>`
    pub fn chart_args(&self, release: &Release) -> Result<Vec<String>> {
        let missing = |message: String| HelmError::MissingChartSource {
            release: release.name.clone(),
            message,
        };
        let chart = release
            .chart
            .as_ref()
            .ok_or_else(|| missing("release has no chart".to_string()))?;

        match chart.source() {
            Some(ChartSource::Local { dir }) => {
                let chart_dir = release.abs_path(dir);
                if !chart_dir.exists() {
                    return Err(missing(format!("chart.dir {} does not exist", chart_dir.display())));
                }
                Ok(vec![chart_dir.display().to_string()])
            }
            Some(ChartSource::Remote { reference, version }) => {
                Ok(argv([reference, "--version", version]))
            }
            None => Err(missing(
                "chart names neither a dir nor a reference with a version".to_string(),
            )),
        }
    }

    /// `helm upgrade -i` for a release
    pub fn apply_argv(&self, release: &Release, env: &Environment) -> Result<Vec<String>> {
        let chart_args = self.chart_args(release)?;
        let values_args = self.values_argv(release, env)?;

        let mut cmd = base_argv(env);
        cmd.extend(argv(["upgrade", release.name.as_str()]));
        cmd.extend(chart_args);
        cmd.extend(argv(["-i", "--namespace", env.kube_namespace.as_str()]));
        cmd.extend(values_args);
        if self.dry_run {
            cmd.push("--dry-run".to_string());
        }
        if self.debug {
            cmd.push("--debug".to_string());
        }
        Ok(cmd)
    }

    /// `helm diff upgrade` for a release
    pub fn diff_argv(&self, release: &Release, env: &Environment) -> Result<Vec<String>> {
        let mut cmd = base_argv(env);
        cmd.extend(argv(["diff", "upgrade", release.name.as_str()]));
        cmd.extend(self.chart_args(release)?);
        cmd.extend(self.values_argv(release, env)?);
        Ok(cmd)
    }

    /// One command per release of `env`, optionally limited to `only` releases
    ///
    /// In diff mode only chart releases produce a command.
    pub fn deploy_commands(&self, env: &Environment, only: Option<&[String]>) -> Result<Vec<Vec<String>>> {
        if let Some(names) = only {
            for name in names {
                if env.get_release(name).is_none() {
                    return Err(HelmError::ReleaseNotFound {
                        release: name.clone(),
                        environment: env.name.clone(),
                    });
                }
            }
        }

        let mut commands = Vec::new();
        for release in &env.releases {
            if only.is_some_and(|names| !names.contains(&release.name)) {
                continue;
            }
            if release.chart.is_some() {
                commands.push(if self.diff {
                    self.diff_argv(release, env)?
                } else {
                    self.apply_argv(release, env)?
                });
            } else if self.diff {
                continue;
            } else if let Some(files) = &release.resource_files {
                let files: Vec<PathBuf> = files.iter().map(|f| release.abs_path(f)).collect();
                commands.push(kubectl_apply_argv(&files, self.dry_run, &env.name));
            }
        }
        Ok(commands)
    }
}

fn base_argv(env: &Environment) -> Vec<String> {
    argv(["helm", "--kube-context", kube_context_name(&env.name).as_str()])
}

fn argv<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.into_iter().map(String::from).collect()
}
