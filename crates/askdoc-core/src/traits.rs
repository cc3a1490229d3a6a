//! Trait seams between the pipelines and their external services.
//!
//! The pipelines are written against these traits so the HTTP clients can be
//! swapped or mocked without touching pipeline code. All clients are
//! constructed once at process start and passed in explicitly.

use crate::error::ClientError;
use crate::types::{ChatMessage, RetrievedDocument};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// A record to insert into the vector index.
#[derive(Debug, Clone)]
pub struct IndexPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: serde_json::Value,
}

/// Converts text into fixed-length numeric vectors.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ClientError>;

    /// Embed a batch of texts. Output order matches input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ClientError>;
}

/// External vector store: batch upsert, similarity query, delete by id.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite points in one logical batch.
    async fn upsert(&self, points: &[IndexPoint]) -> Result<(), ClientError>;

    /// Nearest-neighbor query. Scores are normalized to [0, 1], 1.0 = identical.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>, ClientError>;

    /// Delete points by id. Ids not present in the index are ignored.
    async fn delete(&self, ids: &[String]) -> Result<(), ClientError>;
}

/// A completion fragment stream: each item is a text delta, or the error that
/// ended the stream. The channel closing without an error means the response
/// is complete.
pub type CompletionStream = mpsc::Receiver<Result<String, ClientError>>;

/// External language model.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate the full response for a chat exchange.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ClientError>;

    /// Stream the response incrementally. Dropping the receiver cancels the
    /// underlying request.
    async fn complete_stream(
        &self,
        messages: &[ChatMessage],
    ) -> Result<CompletionStream, ClientError>;
}
