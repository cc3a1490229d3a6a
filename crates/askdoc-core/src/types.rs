//! Core domain types for askdoc.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for documents.
pub type DocumentId = String;

/// Unique identifier for chunks.
pub type ChunkId = String;

/// Unique identifier for conversations.
pub type ConversationId = String;

/// Unique identifier for messages.
pub type MessageId = String;

/// Generate a new unique ID.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Deterministic chunk id for a document ordinal.
///
/// Stable for the lifetime of the document, so deletion can address exactly
/// this document's vectors without scanning the index.
pub fn chunk_id(document_id: &str, ordinal: usize) -> ChunkId {
    format!("{}-chunk-{}", document_id, ordinal)
}

/// A bounded slice of a document's text, the unit of embedding and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub document_id: DocumentId,
    pub ordinal: usize,
    pub text: String,
    pub metadata: serde_json::Value,
}

impl Chunk {
    pub fn new(document_id: impl Into<DocumentId>, ordinal: usize, text: impl Into<String>) -> Self {
        let document_id = document_id.into();
        Self {
            id: chunk_id(&document_id, ordinal),
            document_id,
            ordinal,
            text: text.into(),
            metadata: serde_json::json!({}),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Registry record for an ingested document.
///
/// `chunk_ids` is exactly the set of chunk ids upserted to the vector index
/// for this document; the record is written only after the upsert succeeds and
/// removed only after the index deletion succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub document_id: DocumentId,
    pub filename: String,
    pub chunk_ids: Vec<ChunkId>,
    pub uploaded_at: DateTime<Utc>,
}

impl DocumentEntry {
    pub fn new(
        document_id: impl Into<DocumentId>,
        filename: impl Into<String>,
        chunk_ids: Vec<ChunkId>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            filename: filename.into(),
            chunk_ids,
            uploaded_at: Utc::now(),
        }
    }
}

/// A document returned by a similarity query, fresh per query, never persisted
/// back to the index. Score is normalized so 1.0 = identical, 0.0 = unrelated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub id: String,
    pub content: String,
    pub metadata: serde_json::Value,
    pub score: f32,
}

/// Role of a stored conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One message in a conversation. Appended only by the answer pipeline; an
/// assistant message is written once, with its full content and sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<RetrievedDocument>>,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            sources: None,
        }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<RetrievedDocument>) -> Self {
        Self {
            id: new_id(),
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            sources: Some(sources),
        }
    }
}

/// An ordered message log for one user session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub messages: Vec<ConversationMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Display title: the first user message, truncated to 50 characters.
    pub fn title(&self) -> String {
        let first_user = self
            .messages
            .iter()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.trim())
            .filter(|c| !c.is_empty());

        match first_user {
            Some(content) if content.chars().count() > 50 => {
                let truncated: String = content.chars().take(50).collect();
                format!("{}...", truncated)
            }
            Some(content) => content.to_string(),
            None => "New conversation".to_string(),
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Listing view of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}

/// Role of a message sent to the completion service.
///
/// Distinct from [`MessageRole`]: prompts carry a system instruction that is
/// never stored in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl From<MessageRole> for ChatRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => ChatRole::User,
            MessageRole::Assistant => ChatRole::Assistant,
        }
    }
}

/// One role-tagged turn of a completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Final result of a document ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReceipt {
    pub document_id: DocumentId,
    pub chunks: usize,
    pub filename: String,
}
