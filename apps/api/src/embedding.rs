//! Embedding service client.
//!
//! The embedding model runs behind an Ollama-compatible embeddings API; this
//! client is the only place the core touches it. Embedding is deterministic
//! and side-effect free, so no retry policy beyond the request timeout.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Clone)]
pub struct EmbeddingClient {
    client: Client,
    base_url: String,
    model: String,
    dimension: usize,
}

impl EmbeddingClient {
    pub fn new(
        base_url: String,
        model: String,
        dimension: usize,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()?,
            base_url,
            model,
            dimension,
        })
    }

    /// Vector dimension this client is configured for. The vector store
    /// creates collections with the same dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed a single text into a fixed-dimension vector.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let embedded: EmbedResponse = response.json().await?;
        if embedded.embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                got: embedded.embedding.len(),
            });
        }
        Ok(embedded.embedding)
    }

    /// Embed a batch of texts, preserving order.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        debug!("Embedded {} texts", vectors.len());
        Ok(vectors)
    }
}
