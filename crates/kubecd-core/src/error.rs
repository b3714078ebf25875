//! Core error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("error while reading {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error while parsing {origin}: {message}")]
    FileParse { origin: String, message: String },

    #[error("Invalid environment file {}: {message}", path.display())]
    InvalidEnvironment { path: PathBuf, message: String },
}

impl CoreError {
    pub(crate) fn parse(origin: impl Into<String>, message: impl ToString) -> Self {
        Self::FileParse {
            origin: origin.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
