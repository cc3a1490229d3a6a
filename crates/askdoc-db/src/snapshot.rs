//! Durable mirror for the in-memory stores.

use crate::database::Database;
use crate::error::DbResult;
use askdoc_core::{Conversation, DocumentEntry};
use rusqlite::params;

/// Persistence collaborator for the document registry and conversation store.
///
/// `save_*` replaces the whole snapshot and is called after every mutation;
/// callers treat failures as best-effort (logged, not propagated). `load_*`
/// hydrates the stores at startup.
pub trait SnapshotStore: Send + Sync {
    fn load_documents(&self) -> DbResult<Vec<DocumentEntry>>;
    fn save_documents(&self, entries: &[DocumentEntry]) -> DbResult<()>;
    fn load_conversations(&self) -> DbResult<Vec<Conversation>>;
    fn save_conversations(&self, conversations: &[Conversation]) -> DbResult<()>;
}

impl SnapshotStore for Database {
    fn load_documents(&self) -> DbResult<Vec<DocumentEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT record FROM documents ORDER BY uploaded_at")?;

        let entries = stmt
            .query_map([], |row| {
                let record: String = row.get(0)?;
                Ok(record)
            })?
            .filter_map(|r| r.ok())
            .filter_map(|record| serde_json::from_str(&record).ok())
            .collect();

        Ok(entries)
    }

    fn save_documents(&self, entries: &[DocumentEntry]) -> DbResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM documents", [])?;
        for entry in entries {
            tx.execute(
                "INSERT INTO documents (document_id, record, uploaded_at) VALUES (?1, ?2, ?3)",
                params![
                    entry.document_id,
                    serde_json::to_string(entry)?,
                    entry.uploaded_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn load_conversations(&self) -> DbResult<Vec<Conversation>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT record FROM conversations ORDER BY updated_at")?;

        let conversations = stmt
            .query_map([], |row| {
                let record: String = row.get(0)?;
                Ok(record)
            })?
            .filter_map(|r| r.ok())
            .filter_map(|record| serde_json::from_str(&record).ok())
            .collect();

        Ok(conversations)
    }

    fn save_conversations(&self, conversations: &[Conversation]) -> DbResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM conversations", [])?;
        for conversation in conversations {
            tx.execute(
                "INSERT INTO conversations (conversation_id, record, updated_at) VALUES (?1, ?2, ?3)",
                params![
                    conversation.id,
                    serde_json::to_string(conversation)?,
                    conversation.updated_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askdoc_core::ConversationMessage;

    #[test]
    fn test_document_snapshot_roundtrip() {
        let db = Database::open_in_memory().unwrap();

        let entries = vec![
            DocumentEntry::new("d1", "a.txt", vec!["d1-chunk-0".to_string()]),
            DocumentEntry::new(
                "d2",
                "b.pdf",
                vec!["d2-chunk-0".to_string(), "d2-chunk-1".to_string()],
            ),
        ];

        db.save_documents(&entries).unwrap();
        let loaded = db.load_documents().unwrap();

        assert_eq!(loaded.len(), 2);
        let d2 = loaded.iter().find(|e| e.document_id == "d2").unwrap();
        assert_eq!(d2.filename, "b.pdf");
        assert_eq!(d2.chunk_ids.len(), 2);
    }

    #[test]
    fn test_save_documents_replaces_snapshot() {
        let db = Database::open_in_memory().unwrap();

        let first = vec![DocumentEntry::new("d1", "a.txt", vec![])];
        db.save_documents(&first).unwrap();

        let second = vec![DocumentEntry::new("d2", "b.txt", vec![])];
        db.save_documents(&second).unwrap();

        let loaded = db.load_documents().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].document_id, "d2");
    }

    #[test]
    fn test_conversation_snapshot_roundtrip() {
        let db = Database::open_in_memory().unwrap();

        let mut conversation = Conversation::new();
        conversation
            .messages
            .push(ConversationMessage::user("What is askdoc?"));
        conversation
            .messages
            .push(ConversationMessage::assistant("A document QA tool.", vec![]));

        db.save_conversations(std::slice::from_ref(&conversation))
            .unwrap();
        let loaded = db.load_conversations().unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, conversation.id);
        assert_eq!(loaded[0].messages.len(), 2);
        assert_eq!(loaded[0].messages[1].content, "A document QA tool.");
    }
}
