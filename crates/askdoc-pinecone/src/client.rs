//! Vector index HTTP client.

use crate::types::*;
use askdoc_config::PineconeConfig;
use askdoc_core::{ClientError, IndexPoint, RetrievedDocument, VectorIndex};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Client for a Pinecone-style vector index.
///
/// Chunk text rides in the record metadata under `text` and is lifted back
/// out into [`RetrievedDocument::content`] on query.
#[derive(Clone)]
pub struct PineconeClient {
    client: Client,
    host: String,
    api_key: String,
    namespace: Option<String>,
    timeout: Duration,
}

impl PineconeClient {
    /// Create a new client from configuration.
    pub fn from_config(config: &PineconeConfig) -> Result<Self, ClientError> {
        let timeout = Duration::from_secs(config.timeout_seconds);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            namespace: config.namespace.clone(),
            timeout,
        })
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else if e.is_connect() {
            ClientError::Connection(format!("cannot reach vector index at {}", self.host))
        } else {
            ClientError::Connection(e.to_string())
        }
    }

    async fn post<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ClientError> {
        let url = format!("{}{}", self.host, path);

        let mut request = self.client.post(&url).json(body);
        if !self.api_key.is_empty() {
            request = request.header("Api-Key", &self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl VectorIndex for PineconeClient {
    async fn upsert(&self, points: &[IndexPoint]) -> Result<(), ClientError> {
        debug!("Upserting {} vectors", points.len());

        let vectors = points
            .iter()
            .map(|point| {
                let mut metadata = point.metadata.clone();
                if let Some(object) = metadata.as_object_mut() {
                    object.insert("text".to_string(), point.text.clone().into());
                } else {
                    metadata = serde_json::json!({ "text": point.text });
                }
                VectorRecord {
                    id: point.id.clone(),
                    values: point.vector.clone(),
                    metadata,
                }
            })
            .collect();

        let request = UpsertRequest {
            vectors,
            namespace: self.namespace.clone(),
        };

        self.post("/vectors/upsert", &request).await?;
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>, ClientError> {
        let request = QueryRequest {
            vector: vector.to_vec(),
            top_k,
            include_metadata: true,
            namespace: self.namespace.clone(),
        };

        let response = self.post("/query", &request).await?;
        let query: QueryResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        let documents = query
            .matches
            .into_iter()
            .map(|hit| {
                let mut metadata = hit.metadata.unwrap_or_else(|| serde_json::json!({}));
                let content = metadata
                    .as_object_mut()
                    .and_then(|object| object.remove("text"))
                    .and_then(|text| text.as_str().map(|s| s.to_string()))
                    .unwrap_or_default();

                RetrievedDocument {
                    id: hit.id,
                    content,
                    metadata,
                    // Cosine similarity can dip below zero; the contract is [0, 1].
                    score: hit.score.clamp(0.0, 1.0),
                }
            })
            .collect();

        Ok(documents)
    }

    async fn delete(&self, ids: &[String]) -> Result<(), ClientError> {
        debug!("Deleting {} vectors", ids.len());

        let request = DeleteRequest {
            ids: ids.to_vec(),
            namespace: self.namespace.clone(),
        };

        self.post("/vectors/delete", &request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = PineconeConfig::default();
        let client = PineconeClient::from_config(&config);
        assert!(client.is_ok());
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = PineconeConfig {
            host: "http://localhost:5080/".to_string(),
            ..PineconeConfig::default()
        };
        let client = PineconeClient::from_config(&config).unwrap();
        assert_eq!(client.host, "http://localhost:5080");
    }
}
