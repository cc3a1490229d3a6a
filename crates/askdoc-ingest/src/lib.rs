//! Askdoc Ingest - document ingestion pipeline.
//!
//! This crate provides:
//! - Document loading (PDF, plain text, markdown) with format dispatch
//! - Fixed-size overlapping chunking
//! - The ingestion pipeline: load, chunk, embed, index, register
//! - Document deletion with registry/index consistency

mod chunker;
mod error;
mod ingestor;
mod loaders;

pub use chunker::{ChunkConfig, Chunker};
pub use error::{IngestError, IngestResult};
pub use ingestor::Ingestor;
pub use loaders::{load_document, FileKind, TextUnit};
