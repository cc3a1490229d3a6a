//! In-memory conversation store.

use crate::error::DbResult;
use crate::snapshot::SnapshotStore;
use askdoc_core::{Conversation, ConversationId, ConversationMessage, ConversationSummary};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::warn;

/// Append-only per-conversation message log.
///
/// Conversations live in an arena of per-id mutexes: concurrent turns on
/// different conversations never contend, and a single conversation is never
/// mutated by two tasks at once. Readers get cloned records (copy-on-read).
pub struct ConversationStore {
    arena: RwLock<HashMap<ConversationId, Arc<Mutex<Conversation>>>>,
    snapshot: Option<Arc<dyn SnapshotStore>>,
}

impl ConversationStore {
    /// Create an empty store with no durable mirror.
    pub fn new() -> Self {
        Self {
            arena: RwLock::new(HashMap::new()),
            snapshot: None,
        }
    }

    /// Create a store hydrated from, and mirrored to, a snapshot store.
    pub fn with_snapshot(snapshot: Arc<dyn SnapshotStore>) -> DbResult<Self> {
        let arena = snapshot
            .load_conversations()?
            .into_iter()
            .map(|c| (c.id.clone(), Arc::new(Mutex::new(c))))
            .collect();

        Ok(Self {
            arena: RwLock::new(arena),
            snapshot: Some(snapshot),
        })
    }

    /// Create a new conversation.
    pub fn create(&self) -> Conversation {
        let conversation = Conversation::new();
        {
            let mut arena = self.arena.write().expect("conversation lock poisoned");
            arena.insert(
                conversation.id.clone(),
                Arc::new(Mutex::new(conversation.clone())),
            );
        }
        self.persist();
        conversation
    }

    /// Get a conversation by id.
    pub fn get(&self, id: &str) -> Option<Conversation> {
        let slot = {
            let arena = self.arena.read().expect("conversation lock poisoned");
            arena.get(id).cloned()
        };
        slot.map(|slot| slot.lock().expect("conversation lock poisoned").clone())
    }

    /// Reuse the conversation with the given id if it resolves, otherwise
    /// create a new one.
    pub fn get_or_create(&self, id: Option<&str>) -> Conversation {
        if let Some(id) = id {
            if let Some(existing) = self.get(id) {
                return existing;
            }
        }
        self.create()
    }

    /// Append a message, refreshing the conversation's `updated_at`.
    ///
    /// Returns false if the conversation no longer exists.
    pub fn append(&self, id: &str, message: ConversationMessage) -> bool {
        let slot = {
            let arena = self.arena.read().expect("conversation lock poisoned");
            arena.get(id).cloned()
        };

        let Some(slot) = slot else {
            return false;
        };

        {
            let mut conversation = slot.lock().expect("conversation lock poisoned");
            conversation.messages.push(message);
            conversation.updated_at = Utc::now();
        }
        self.persist();
        true
    }

    /// List all conversations, most recently updated first.
    pub fn list_summaries(&self) -> Vec<ConversationSummary> {
        let slots: Vec<Arc<Mutex<Conversation>>> = {
            let arena = self.arena.read().expect("conversation lock poisoned");
            arena.values().cloned().collect()
        };

        let mut summaries: Vec<ConversationSummary> = slots
            .iter()
            .map(|slot| {
                let conversation = slot.lock().expect("conversation lock poisoned");
                ConversationSummary {
                    id: conversation.id.clone(),
                    title: conversation.title(),
                    updated_at: conversation.updated_at,
                }
            })
            .collect();

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }

    /// Delete a conversation. Returns false if it did not exist.
    pub fn delete(&self, id: &str) -> bool {
        let removed = {
            let mut arena = self.arena.write().expect("conversation lock poisoned");
            arena.remove(id).is_some()
        };
        if removed {
            self.persist();
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.arena.read().expect("conversation lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self) {
        if let Some(snapshot) = &self.snapshot {
            let all: Vec<Conversation> = {
                let arena = self.arena.read().expect("conversation lock poisoned");
                arena
                    .values()
                    .map(|slot| slot.lock().expect("conversation lock poisoned").clone())
                    .collect()
            };
            if let Err(e) = snapshot.save_conversations(&all) {
                warn!("Failed to mirror conversation store: {}", e);
            }
        }
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
