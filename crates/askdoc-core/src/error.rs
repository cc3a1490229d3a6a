//! Shared error types.

use thiserror::Error;

/// A failure reported by an external service client (embedding, vector index,
/// or completion).
///
/// Raw transport errors never cross a pipeline boundary; each client
/// translates them into one of these before returning.
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("service returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse service response: {0}")]
    Parse(String),
}
