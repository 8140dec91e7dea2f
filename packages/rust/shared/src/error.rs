//! Error types for the dataset toolkit.
//!
//! Library crates use [`DatasetError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all export and review operations.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// HTTP transport error talking to the GitHub API.
    #[error("network error: {0}")]
    Network(String),

    /// Response or input body could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad repository name, unusable record, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A discussion record lacks a required field.
    #[error("record on line {line} is missing required field `{field}`")]
    MissingField { line: usize, field: &'static str },

    /// A discussion record has every field but one of them is unusable.
    #[error("record on line {line} is invalid: {reason}")]
    InvalidRecord { line: usize, reason: String },

    /// The GraphQL endpoint answered with an `errors` payload or no data.
    #[error("GraphQL error: {0}")]
    GraphQl(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DatasetError>;

impl DatasetError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
