//! Error types for IaC generation.

use thiserror::Error;

/// Result type alias for IaC operations.
pub type IacResult<T> = Result<T, IacError>;

/// Errors that can occur during code generation.
#[derive(Error, Debug)]
pub enum IacError {
    #[error("Generator not configured: {0}")]
    NotConfigured(String),

    #[error("Generator command failed: {0}")]
    CommandFailed(String),

    #[error("Generator produced empty output")]
    EmptyArtifact,

    #[error("Specification has no providers")]
    EmptySpec,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
