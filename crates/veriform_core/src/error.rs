//! Error types for pipeline orchestration.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Unrecoverable input errors.
///
/// Adapter failures are not errors at this level: they are classified into
/// the `NotGenerated` outcome of a `PipelineResult` instead.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Description is empty")]
    EmptyDescription,
}
