//! Error types for security evaluation.

use thiserror::Error;

/// Result type alias for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Errors that can occur during security evaluation.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Evaluator not configured: {0}")]
    NotConfigured(String),

    #[error("Evaluator command failed: {0}")]
    CommandFailed(String),

    #[error("Evaluator returned malformed output: {0}")]
    MalformedOutput(String),

    #[error("Invalid rule '{rule}': {message}")]
    InvalidRule { rule: String, message: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
