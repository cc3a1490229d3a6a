//! Error types for the ingestion pipeline.

use askdoc_core::ClientError;
use thiserror::Error;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur during ingestion.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("file exceeds the {limit_mb} MiB upload limit")]
    FileTooLarge { size: usize, limit_mb: usize },

    #[error("unsupported file type: {0}. Supported: PDF, TXT, MD")]
    UnsupportedFormat(String),

    #[error("file appears to be empty")]
    EmptyContent,

    #[error("no content could be extracted from the document")]
    EmptyExtraction,

    #[error("failed to parse {filename}: {message}")]
    Parse { filename: String, message: String },

    #[error("invalid chunking configuration: {0}")]
    InvalidChunking(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("vector deletion failed, document {document_id} kept in the registry: {source}")]
    IndexDelete {
        document_id: String,
        source: ClientError,
    },
}
