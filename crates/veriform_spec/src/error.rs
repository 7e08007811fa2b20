//! Error types for specification extraction.

use thiserror::Error;

/// Result type alias for specification operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors that can occur while extracting or parsing a specification.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Extractor not configured: {0}")]
    NotConfigured(String),

    #[error("Extractor command failed: {0}")]
    CommandFailed(String),

    #[error("Extractor returned malformed output: {0}")]
    MalformedOutput(String),

    #[error("Specification is empty")]
    EmptySpec,

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
