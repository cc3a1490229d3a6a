//! CLI command implementations.

pub mod ask;
pub mod chats;
pub mod docs;
pub mod ingest;
pub mod init;

use anyhow::{Context, Result};
use askdoc_config::{AppPaths, Config};
use askdoc_db::{ConversationStore, Database, DocumentRegistry, SnapshotStore};
use askdoc_ingest::{ChunkConfig, Chunker, Ingestor};
use askdoc_ollama::OllamaClient;
use askdoc_pinecone::PineconeClient;
use askdoc_rag::{RagConfig, RagPipeline};
use std::sync::Arc;

/// Everything a command needs, wired once at startup.
///
/// All external clients are constructed here from validated configuration and
/// passed into the pipelines explicitly.
pub struct App {
    pub registry: Arc<DocumentRegistry>,
    pub conversations: Arc<ConversationStore>,
    pub ingestor: Ingestor,
    pub rag: RagPipeline,
}

/// Get the application paths.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::new().context("Failed to determine application directories")
}

/// Load and validate configuration.
pub fn load_config() -> Result<Config> {
    Config::load().context("Failed to load configuration")
}

/// Build the application, ensuring askdoc is initialized.
pub fn build_app() -> Result<App> {
    let paths = get_paths()?;

    if !paths.is_initialized() {
        anyhow::bail!("Askdoc is not initialized. Run 'askdoc init' first.");
    }

    let config = load_config()?;

    let database: Arc<dyn SnapshotStore> = Arc::new(
        Database::open(&paths.database_file).context("Failed to open database")?,
    );
    let registry = Arc::new(
        DocumentRegistry::with_snapshot(database.clone())
            .context("Failed to load document registry")?,
    );
    let conversations = Arc::new(
        ConversationStore::with_snapshot(database).context("Failed to load conversations")?,
    );

    let ollama = Arc::new(
        OllamaClient::from_config(&config.ollama).context("Failed to create Ollama client")?,
    );
    let pinecone = Arc::new(
        PineconeClient::from_config(&config.pinecone)
            .context("Failed to create vector index client")?,
    );

    let chunker = Chunker::new(ChunkConfig {
        chunk_size: config.chunking.chunk_size,
        chunk_overlap: config.chunking.chunk_overlap,
    })
    .context("Invalid chunking configuration")?;

    let ingestor = Ingestor::new(
        ollama.clone(),
        pinecone.clone(),
        registry.clone(),
        chunker,
        config.limits.max_file_size_bytes(),
    );

    let rag = RagPipeline::new(
        ollama.clone(),
        pinecone,
        ollama,
        conversations.clone(),
        RagConfig {
            top_k: config.retrieval.top_k,
        },
    );

    Ok(App {
        registry,
        conversations,
        ingestor,
        rag,
    })
}
