//! Askdoc Pinecone - vector index client.
//!
//! Implements the [`askdoc_core::VectorIndex`] seam over a Pinecone-style
//! REST API: batch upsert, similarity query, delete by id.

mod client;
mod types;

pub use client::PineconeClient;
pub use types::*;
