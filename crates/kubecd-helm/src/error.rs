//! Error types for values resolution

use kubecd_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed cause of a failed external lookup
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of an external command
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("no output registered for command: {command}")]
    Unexpected { command: String },
}

/// Values resolution errors
#[derive(Debug, Error)]
pub enum HelmError {
    /// Reading or parsing a values or environment file
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("failed to resolve value '{key}' in environment '{environment}': {source}")]
    ExternalResolution {
        key: String,
        environment: String,
        #[source]
        source: BoxError,
    },

    #[error("error while running \"helm inspect values\" for {reference} version {version}: {source}")]
    Inspect {
        reference: String,
        version: String,
        #[source]
        source: CommandError,
    },

    #[error("error while writing cache file {}: {source}", path.display())]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read cache file {}: {source}", path.display())]
    CacheRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not determine cache directory: {message}")]
    CacheDir { message: String },

    #[error("release '{release}': {message}")]
    MissingChartSource { release: String, message: String },

    #[error("env '{environment}': release not found: '{release}'")]
    ReleaseNotFound { release: String, environment: String },

    /// A pipeline step failed; `source` holds the step's error
    #[error("failed to resolve {step} for release '{release}' in environment '{environment}': {source}")]
    Resolve {
        release: String,
        environment: String,
        step: &'static str,
        #[source]
        source: Box<HelmError>,
    },
}

impl HelmError {
    /// Attach release/environment context for a pipeline step
    pub fn in_step(self, release: &str, environment: &str, step: &'static str) -> Self {
        HelmError::Resolve {
            release: release.to_string(),
            environment: environment.to_string(),
            step,
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping pipeline context
    pub fn root(&self) -> &HelmError {
        match self {
            HelmError::Resolve { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for values resolution
pub type Result<T> = std::result::Result<T, HelmError>;
