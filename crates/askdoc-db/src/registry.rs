//! In-memory document registry.

use crate::error::DbResult;
use crate::snapshot::SnapshotStore;
use askdoc_core::{DocumentEntry, DocumentId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::warn;

/// Maps a document id to its chunk ids and metadata.
///
/// Mutated only by the ingestion pipeline's ingest and delete operations;
/// readers get cloned records and never observe a partial update. Each
/// mutation is mirrored to the snapshot store; a failed mirror is logged and
/// the in-memory state stays authoritative.
pub struct DocumentRegistry {
    entries: RwLock<HashMap<DocumentId, DocumentEntry>>,
    snapshot: Option<Arc<dyn SnapshotStore>>,
}

impl DocumentRegistry {
    /// Create an empty registry with no durable mirror.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            snapshot: None,
        }
    }

    /// Create a registry hydrated from, and mirrored to, a snapshot store.
    pub fn with_snapshot(snapshot: Arc<dyn SnapshotStore>) -> DbResult<Self> {
        let entries = snapshot
            .load_documents()?
            .into_iter()
            .map(|e| (e.document_id.clone(), e))
            .collect();

        Ok(Self {
            entries: RwLock::new(entries),
            snapshot: Some(snapshot),
        })
    }

    /// Register an ingested document.
    pub fn insert(&self, entry: DocumentEntry) {
        {
            let mut entries = self.entries.write().expect("registry lock poisoned");
            entries.insert(entry.document_id.clone(), entry);
        }
        self.persist();
    }

    /// Remove a document's entry, returning it if present.
    pub fn remove(&self, document_id: &str) -> Option<DocumentEntry> {
        let removed = {
            let mut entries = self.entries.write().expect("registry lock poisoned");
            entries.remove(document_id)
        };
        if removed.is_some() {
            self.persist();
        }
        removed
    }

    /// Look up a document's entry.
    pub fn get(&self, document_id: &str) -> Option<DocumentEntry> {
        let entries = self.entries.read().expect("registry lock poisoned");
        entries.get(document_id).cloned()
    }

    /// List all entries, most recently uploaded first.
    pub fn list(&self) -> Vec<DocumentEntry> {
        let entries = self.entries.read().expect("registry lock poisoned");
        let mut all: Vec<DocumentEntry> = entries.values().cloned().collect();
        all.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        all
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self) {
        if let Some(snapshot) = &self.snapshot {
            let all: Vec<DocumentEntry> = {
                let entries = self.entries.read().expect("registry lock poisoned");
                entries.values().cloned().collect()
            };
            if let Err(e) = snapshot.save_documents(&all) {
                warn!("Failed to mirror document registry: {}", e);
            }
        }
    }
}

impl Default for DocumentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
