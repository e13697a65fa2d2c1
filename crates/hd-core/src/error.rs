//! Error types for histdrift

use thiserror::Error;

/// histdrift error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// Contract violation, e.g. asking a check for validity before
    /// confirming applicability.
    #[error("Illegal state: {0}")]
    IllegalState(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
