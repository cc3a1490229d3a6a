//! Main ingestion pipeline.

use crate::chunker::Chunker;
use crate::error::{IngestError, IngestResult};
use crate::loaders::load_document;
use askdoc_core::{
    new_id, Chunk, ClientError, DocumentEntry, EmbeddingClient, IndexPoint, IngestEvent,
    IngestReceipt, IngestStage, VectorIndex,
};
use askdoc_db::DocumentRegistry;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Composes loading, chunking, embedding, and indexing into one pipeline,
/// and owns chunk-id assignment and progress reporting.
///
/// The registry is written only after the index upsert succeeds, so a
/// registry entry never references chunks that are not in the index.
#[derive(Clone)]
pub struct Ingestor {
    embeddings: Arc<dyn EmbeddingClient>,
    index: Arc<dyn VectorIndex>,
    registry: Arc<DocumentRegistry>,
    chunker: Chunker,
    max_file_bytes: usize,
}

impl Ingestor {
    pub fn new(
        embeddings: Arc<dyn EmbeddingClient>,
        index: Arc<dyn VectorIndex>,
        registry: Arc<DocumentRegistry>,
        chunker: Chunker,
        max_file_bytes: usize,
    ) -> Self {
        Self {
            embeddings,
            index,
            registry,
            chunker,
            max_file_bytes,
        }
    }

    /// Ingest an uploaded file: validate, load, chunk, embed, index, register.
    pub async fn ingest(
        &self,
        bytes: &[u8],
        filename: &str,
        mime_type: &str,
    ) -> IngestResult<IngestReceipt> {
        self.run(bytes, filename, mime_type, None).await
    }

    /// Ingest with live progress feedback.
    ///
    /// Reports the same stages and the same final result as [`ingest`]: the
    /// stream ends with either a `done` stage carrying the receipt or a
    /// single terminal error event.
    ///
    /// [`ingest`]: Ingestor::ingest
    pub fn ingest_stream(
        &self,
        bytes: Vec<u8>,
        filename: String,
        mime_type: String,
    ) -> mpsc::Receiver<IngestEvent> {
        let (tx, rx) = mpsc::channel(16);
        let ingestor = self.clone();

        tokio::spawn(async move {
            match ingestor
                .run(&bytes, &filename, &mime_type, Some(&tx))
                .await
            {
                Ok(receipt) => {
                    let _ = tx
                        .send(IngestEvent::Stage(IngestStage::Done { result: receipt }))
                        .await;
                }
                Err(e) => {
                    let _ = tx
                        .send(IngestEvent::Error {
                            error: e.to_string(),
                        })
                        .await;
                }
            }
        });

        rx
    }

    async fn run(
        &self,
        bytes: &[u8],
        filename: &str,
        mime_type: &str,
        progress: Option<&mpsc::Sender<IngestEvent>>,
    ) -> IngestResult<IngestReceipt> {
        report(progress, IngestStage::Parsing).await;
        let units = load_document(bytes, filename, mime_type, self.max_file_bytes)?;

        report(progress, IngestStage::Chunking).await;
        // A fresh random id per ingestion: re-uploading identical content is
        // always a distinct document with a disjoint chunk-id set.
        let document_id = new_id();
        let mut chunks: Vec<Chunk> = Vec::new();

        for unit in &units {
            let texts = match self.chunker.split(&unit.text) {
                Ok(texts) => texts,
                // A blank unit (e.g. an empty PDF page) is skipped, not fatal
                Err(IngestError::EmptyContent) => continue,
                Err(e) => return Err(e),
            };
            for text in texts {
                let ordinal = chunks.len();
                chunks.push(
                    Chunk::new(document_id.clone(), ordinal, text)
                        .with_metadata(unit.metadata.clone()),
                );
            }
        }

        if chunks.is_empty() {
            return Err(IngestError::EmptyExtraction);
        }

        report(progress, IngestStage::Indexing {
            total: chunks.len(),
        })
        .await;

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embeddings.embed_batch(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(IngestError::Client(ClientError::Parse(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            ))));
        }

        let points: Vec<IndexPoint> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexPoint {
                id: chunk.id.clone(),
                vector,
                text: chunk.text.clone(),
                metadata: chunk.metadata.clone(),
            })
            .collect();

        self.index.upsert(&points).await?;

        let chunk_ids = chunks.iter().map(|c| c.id.clone()).collect();
        self.registry
            .insert(DocumentEntry::new(document_id.clone(), filename, chunk_ids));

        info!(
            "Ingested {} as document {} ({} chunks)",
            filename,
            document_id,
            chunks.len()
        );

        Ok(IngestReceipt {
            document_id,
            chunks: chunks.len(),
            filename: filename.to_string(),
        })
    }

    /// Delete a document and its vectors.
    ///
    /// Returns false for an unknown id (idempotent no-op). If the index
    /// deletion fails the registry entry is kept, so a retry can still find
    /// the chunk ids; stale-but-consistent beats orphaned vectors.
    pub async fn delete(&self, document_id: &str) -> IngestResult<bool> {
        let entry = match self.registry.get(document_id) {
            Some(entry) => entry,
            None => return Ok(false),
        };

        if let Err(e) = self.index.delete(&entry.chunk_ids).await {
            warn!(
                "Vector deletion failed for document {}; keeping registry entry: {}",
                document_id, e
            );
            return Err(IngestError::IndexDelete {
                document_id: document_id.to_string(),
                source: e,
            });
        }

        self.registry.remove(document_id);
        info!(
            "Deleted document {} ({} chunks)",
            document_id,
            entry.chunk_ids.len()
        );
        Ok(true)
    }
}

async fn report(progress: Option<&mpsc::Sender<IngestEvent>>, stage: IngestStage) {
    if let Some(tx) = progress {
        // A vanished consumer doesn't abort the ingestion; the work completes
        // and the registry stays consistent with the index.
        let _ = tx.send(IngestEvent::Stage(stage)).await;
    }
}
