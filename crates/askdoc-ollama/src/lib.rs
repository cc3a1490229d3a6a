//! Askdoc Ollama - Ollama-backed embedding and completion clients.
//!
//! Implements the [`askdoc_core::EmbeddingClient`] and
//! [`askdoc_core::CompletionClient`] seams over Ollama's HTTP API.

mod client;
mod types;

pub use client::OllamaClient;
pub use types::*;
