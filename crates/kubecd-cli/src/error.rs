//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use kubecd_core::CoreError;
use kubecd_helm::HelmError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Environment file invalid, or it does not define what was asked for
    #[error("Environment error: {message}")]
    #[diagnostic(code(kubecd::cli::environment))]
    Environment {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Values could not be parsed or merged
    #[error("Values error: {message}")]
    #[diagnostic(code(kubecd::cli::values))]
    Values { message: String },

    /// helm or gcloud failed
    #[error("External command failed: {message}")]
    #[diagnostic(code(kubecd::cli::external))]
    External {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(kubecd::cli::io))]
    Io { message: String },

    /// Requested key is not in the resolved values
    #[error("Key not found: {key}")]
    #[diagnostic(code(kubecd::cli::key))]
    KeyNotFound { key: String },

    /// Output serialization or anything unexpected
    #[error("Internal error: {message}")]
    #[diagnostic(code(kubecd::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Environment { .. } => exit_codes::ENVIRONMENT_ERROR,
            CliError::Values { .. } => exit_codes::VALUES_ERROR,
            CliError::External { .. } => exit_codes::EXTERNAL_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::KeyNotFound { .. } => exit_codes::ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create an environment error with help text
    pub fn environment_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Environment {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::FileRead { .. } => CliError::Io {
                message: err.to_string(),
            },
            CoreError::FileParse { .. } | CoreError::InvalidEnvironment { .. } => {
                CliError::Environment {
                    message: err.to_string(),
                    help: None,
                }
            }
        }
    }
}

/// Classified by the innermost error, reported with the full context chain
impl From<HelmError> for CliError {
    fn from(err: HelmError) -> Self {
        let message = err.to_string();
        match err.root() {
            HelmError::Core(CoreError::FileRead { .. })
            | HelmError::CacheRead { .. }
            | HelmError::CacheWrite { .. }
            | HelmError::CacheDir { .. } => CliError::Io { message },
            HelmError::Core(_) => CliError::Values { message },
            HelmError::ExternalResolution { .. } => CliError::External {
                message,
                help: Some("use --skip-value-from to keep placeholder values".to_string()),
            },
            HelmError::Inspect { .. } => CliError::External {
                message,
                help: Some("check that the chart repository was added with `helm repo add`".to_string()),
            },
            HelmError::MissingChartSource { .. } | HelmError::ReleaseNotFound { .. } => {
                CliError::Environment {
                    message,
                    help: None,
                }
            }
            HelmError::Resolve { .. } => CliError::internal(message),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
