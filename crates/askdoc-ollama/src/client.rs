//! Ollama HTTP client.

use crate::types::*;
use askdoc_config::OllamaConfig;
use askdoc_core::{ChatMessage, ClientError, CompletionClient, CompletionStream, EmbeddingClient};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Client for Ollama's embedding and chat APIs.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    host: String,
    model: String,
    embedding_model: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Create a new client from configuration.
    pub fn from_config(config: &OllamaConfig) -> Result<Self, ClientError> {
        let timeout = Duration::from_secs(config.timeout_seconds);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            embedding_model: config.embedding_model.clone(),
            timeout,
        })
    }

    /// Check if the Ollama server is reachable.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.host);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else if e.is_connect() {
            ClientError::Connection(format!("cannot reach Ollama at {}", self.host))
        } else {
            ClientError::Connection(e.to_string())
        }
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, ClientError> {
        let url = format!("{}/api/embeddings", self.host);
        debug!(
            "Generating embedding with model {} for text length {}",
            self.embedding_model,
            text.len()
        );

        let request = EmbeddingRequest {
            model: self.embedding_model.clone(),
            prompt: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let response = self.check_status(response).await?;

        let embedding: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        Ok(embedding.embedding)
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, ClientError> {
        let url = format!("{}/api/chat", self.host);
        debug!("Generating with model {}", self.model);

        let request = ChatRequest::new(&self.model, messages.to_vec());

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let response = self.check_status(response).await?;

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        Ok(chat.message.content)
    }

    /// Stream a chat response. Each received frame's delta is forwarded on the
    /// returned channel; a transport fault mid-stream is forwarded as the
    /// final item. Dropping the receiver aborts the request.
    async fn chat_stream(&self, messages: &[ChatMessage]) -> Result<CompletionStream, ClientError> {
        let url = format!("{}/api/chat", self.host);
        debug!("Starting streaming generation with model {}", self.model);

        let request = ChatRequest::new(&self.model, messages.to_vec()).with_stream(true);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let response = self.check_status(response).await?;

        let (tx, rx) = mpsc::channel(32);
        let timeout = self.timeout;

        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            // Frames can be split across network chunks; buffer until newline.
            let mut buffer = String::new();

            while let Some(chunk_result) = stream.next().await {
                let bytes = match chunk_result {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let error = if e.is_timeout() {
                            ClientError::Timeout {
                                seconds: timeout.as_secs(),
                            }
                        } else {
                            ClientError::Connection(e.to_string())
                        };
                        let _ = tx.send(Err(error)).await;
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(newline) = buffer.find('\n') {
                    let line: String = buffer.drain(..=newline).collect();
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    match serde_json::from_str::<ChatStreamFrame>(line) {
                        Ok(frame) => {
                            if let Some(message) = frame.message {
                                if !message.content.is_empty()
                                    && tx.send(Ok(message.content)).await.is_err()
                                {
                                    return; // Receiver dropped
                                }
                            }
                            if frame.done {
                                return;
                            }
                        }
                        Err(e) => {
                            warn!("Failed to parse stream frame: {}", e);
                        }
                    }
                }
            }
        });

        Ok(rx)
    }
}

#[async_trait]
impl EmbeddingClient for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ClientError> {
        self.embed_text(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ClientError> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for text in texts {
            let embedding = self.embed_text(text).await?;
            embeddings.push(embedding);
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ClientError> {
        self.chat(messages).await
    }

    async fn complete_stream(
        &self,
        messages: &[ChatMessage],
    ) -> Result<CompletionStream, ClientError> {
        self.chat_stream(messages).await
    }
}
