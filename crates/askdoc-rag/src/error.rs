//! Error types for the answer pipeline.

use askdoc_core::ClientError;
use thiserror::Error;

/// Result type for answer operations.
pub type RagResult<T> = Result<T, RagError>;

/// Errors that can occur during an answer turn.
#[derive(Error, Debug)]
pub enum RagError {
    #[error("prompt must not be empty")]
    EmptyPrompt,

    #[error(transparent)]
    Client(#[from] ClientError),
}
