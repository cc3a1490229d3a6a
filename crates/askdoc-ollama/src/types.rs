//! Types for Ollama API requests and responses.

use askdoc_core::ChatMessage;
use serde::{Deserialize, Serialize};

/// Request body for /api/embeddings endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRequest {
    pub model: String,
    pub prompt: String,
}

/// Response from /api/embeddings endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingResponse {
    pub embedding: Vec<f32>,
}

/// Request body for /api/chat endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ChatOptions>,
}

impl ChatRequest {
    /// Create a new chat request.
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: false,
            options: None,
        }
    }

    /// Enable streaming mode.
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Set generation options.
    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Options for text generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_num_predict(mut self, num_predict: i32) -> Self {
        self.num_predict = Some(num_predict);
        self
    }
}

/// Message body inside chat responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: String,
}

/// Response from /api/chat endpoint (non-streaming).
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub message: ChatResponseMessage,
    #[serde(default)]
    pub done: bool,
}

/// Streaming response frame from /api/chat endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatStreamFrame {
    #[serde(default)]
    pub message: Option<ChatResponseMessage>,
    #[serde(default)]
    pub done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_builder() {
        let request = ChatRequest::new(
            "llama3.1:8b",
            vec![
                ChatMessage::system("You are a helpful assistant."),
                ChatMessage::user("Hello"),
            ],
        )
        .with_options(ChatOptions::new().with_temperature(0.2));

        assert_eq!(request.model, "llama3.1:8b");
        assert_eq!(request.messages.len(), 2);
        assert!(!request.stream);
        assert!(request.options.is_some());
    }

    #[test]
    fn test_chat_request_roles_serialize_lowercase() {
        let request = ChatRequest::new("m", vec![ChatMessage::system("s"), ChatMessage::user("u")]);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn test_stream_frame_parses_without_message() {
        let frame: ChatStreamFrame = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert!(frame.done);
        assert!(frame.message.is_none());
    }
}
