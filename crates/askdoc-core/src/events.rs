//! Wire-level event types for streamed responses.
//!
//! Both streams are NDJSON: one JSON object per line, UTF-8,
//! newline-terminated.

use crate::types::{IngestReceipt, RetrievedDocument};
use serde::{Deserialize, Serialize};

/// One event on a chat answer stream.
///
/// Ordering: if `ConversationId` is emitted it is always first; `Sources` is
/// always last on success; `Error` terminates the stream and nothing follows
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StreamEvent {
    #[serde(rename = "conversationId")]
    ConversationId(String),
    #[serde(rename = "content")]
    Content(String),
    #[serde(rename = "sources")]
    Sources(Vec<RetrievedDocument>),
    #[serde(rename = "error")]
    Error(String),
}

/// One event on an ingestion progress stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IngestEvent {
    Stage(IngestStage),
    Error { error: String },
}

/// Stages of an ingestion, in the order they are reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "lowercase")]
pub enum IngestStage {
    Parsing,
    Chunking,
    Indexing { total: usize },
    Done { result: IngestReceipt },
}

/// Serialize an event as a single newline-terminated NDJSON line.
pub fn ndjson_line<T: Serialize>(event: &T) -> serde_json::Result<String> {
    Ok(format!("{}\n", serde_json::to_string(event)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_event_wire_shapes() {
        let line = ndjson_line(&StreamEvent::ConversationId("c1".to_string())).unwrap();
        assert_eq!(line, "{\"conversationId\":\"c1\"}\n");

        let line = ndjson_line(&StreamEvent::Content("Hello ".to_string())).unwrap();
        assert_eq!(line, "{\"content\":\"Hello \"}\n");

        let line = ndjson_line(&StreamEvent::Error("boom".to_string())).unwrap();
        assert_eq!(line, "{\"error\":\"boom\"}\n");
    }

    #[test]
    fn test_sources_event_wire_shape() {
        let doc = RetrievedDocument {
            id: "d1-chunk-0".to_string(),
            content: "text".to_string(),
            metadata: serde_json::json!({"filename": "a.txt"}),
            score: 0.87,
        };
        let line = ndjson_line(&StreamEvent::Sources(vec![doc])).unwrap();
        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();

        assert_eq!(value["sources"][0]["id"], "d1-chunk-0");
        assert_eq!(value["sources"][0]["content"], "text");
        assert_eq!(value["sources"][0]["metadata"]["filename"], "a.txt");
        assert!((value["sources"][0]["score"].as_f64().unwrap() - 0.87).abs() < 1e-6);
    }

    #[test]
    fn test_ingest_stage_wire_shapes() {
        let line = ndjson_line(&IngestEvent::Stage(IngestStage::Parsing)).unwrap();
        assert_eq!(line, "{\"stage\":\"parsing\"}\n");

        let line = ndjson_line(&IngestEvent::Stage(IngestStage::Chunking)).unwrap();
        assert_eq!(line, "{\"stage\":\"chunking\"}\n");

        let line = ndjson_line(&IngestEvent::Stage(IngestStage::Indexing { total: 4 })).unwrap();
        assert_eq!(line, "{\"stage\":\"indexing\",\"total\":4}\n");

        let receipt = IngestReceipt {
            document_id: "d1".to_string(),
            chunks: 4,
            filename: "notes.txt".to_string(),
        };
        let line = ndjson_line(&IngestEvent::Stage(IngestStage::Done { result: receipt })).unwrap();
        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["stage"], "done");
        assert_eq!(value["result"]["documentId"], "d1");
        assert_eq!(value["result"]["chunks"], 4);
    }

    #[test]
    fn test_ingest_error_wire_shape() {
        let line = ndjson_line(&IngestEvent::Error {
            error: "unsupported file type: zip".to_string(),
        })
        .unwrap();
        assert_eq!(line, "{\"error\":\"unsupported file type: zip\"}\n");
    }

    #[test]
    fn test_stream_event_roundtrip() {
        let event = StreamEvent::Content("delta".to_string());
        let line = ndjson_line(&event).unwrap();
        let parsed: StreamEvent = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(parsed, event);
    }
}
