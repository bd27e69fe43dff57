//! Qdrant vector store client (REST).
//!
//! One logical collection per document: the resume lives in
//! `resume_chunks`, each job description in `job_<id>`. Collection-level
//! isolation makes cross-document leakage structurally impossible — there is
//! no metadata-filter-only sharing.
//!
//! Full-text reconstruction scrolls every chunk and reorders by
//! `chunk_index`, since scroll order is not guaranteed.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Collection holding the active resume.
pub const RESUME_COLLECTION: &str = "resume_chunks";
const JOB_COLLECTION_PREFIX: &str = "job_";
const SCROLL_BATCH: usize = 100;

/// Collection name for a job document.
pub fn job_collection(job_id: &str) -> String {
    format!("{JOB_COLLECTION_PREFIX}{job_id}")
}

#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Payload stored with every chunk vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub text: String,
    pub source: String,
    pub job_id: Option<String>,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

/// A search hit: chunk text plus similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub text: String,
    pub score: f32,
}

#[derive(Clone)]
pub struct VectorStore {
    client: Client,
    base_url: String,
    vector_dim: usize,
}

impl VectorStore {
    pub fn new(base_url: String, vector_dim: usize, timeout_secs: u64) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()?,
            base_url,
            vector_dim,
        })
    }

    pub async fn list_collections(&self) -> Result<Vec<String>, VectorStoreError> {
        let value = self
            .request(reqwest::Method::GET, "/collections", None)
            .await?;
        let collections = value["result"]["collections"]
            .as_array()
            .ok_or_else(|| VectorStoreError::Malformed("missing collections array".into()))?;
        Ok(collections
            .iter()
            .filter_map(|c| c["name"].as_str().map(String::from))
            .collect())
    }

    pub async fn collection_exists(&self, name: &str) -> Result<bool, VectorStoreError> {
        Ok(self.list_collections().await?.iter().any(|c| c == name))
    }

    /// All uploaded job ids, from collections named `job_<id>`.
    pub async fn list_job_ids(&self) -> Result<Vec<String>, VectorStoreError> {
        let mut ids: Vec<String> = self
            .list_collections()
            .await?
            .into_iter()
            .filter_map(|name| {
                name.strip_prefix(JOB_COLLECTION_PREFIX)
                    .map(str::to_string)
            })
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Create the collection if it does not exist (cosine distance).
    pub async fn ensure_collection(&self, name: &str) -> Result<(), VectorStoreError> {
        if self.collection_exists(name).await? {
            return Ok(());
        }
        debug!(collection = name, dim = self.vector_dim, "Creating collection");
        let body = json!({
            "vectors": { "size": self.vector_dim, "distance": "Cosine" }
        });
        self.request(
            reqwest::Method::PUT,
            &format!("/collections/{name}"),
            Some(body),
        )
        .await?;
        Ok(())
    }

    /// Upsert chunk vectors with their payloads. Point ids are random; chunk
    /// identity lives in the payload's `chunk_index`.
    pub async fn upsert_chunks(
        &self,
        collection: &str,
        points: Vec<(Vec<f32>, ChunkPayload)>,
    ) -> Result<(), VectorStoreError> {
        let points: Vec<Value> = points
            .into_iter()
            .map(|(vector, payload)| {
                json!({
                    "id": Uuid::new_v4().to_string(),
                    "vector": vector,
                    "payload": payload,
                })
            })
            .collect();
        let count = points.len();

        self.request(
            reqwest::Method::PUT,
            &format!("/collections/{collection}/points?wait=true"),
            Some(json!({ "points": points })),
        )
        .await?;
        debug!(collection, count, "Upserted chunks");
        Ok(())
    }

    /// Top-k similarity search over one collection.
    pub async fn search(
        &self,
        collection: &str,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredChunk>, VectorStoreError> {
        let body = json!({
            "vector": query_vector,
            "limit": k,
            "with_payload": true,
        });
        let value = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{collection}/points/search"),
                Some(body),
            )
            .await?;

        let hits = value["result"]
            .as_array()
            .ok_or_else(|| VectorStoreError::Malformed("missing search result".into()))?;
        Ok(hits
            .iter()
            .filter_map(|hit| {
                let text = hit["payload"]["text"].as_str()?.to_string();
                let score = hit["score"].as_f64().unwrap_or(0.0) as f32;
                Some(ScoredChunk { text, score })
            })
            .collect())
    }

    /// Reconstruct the full document text from a collection, ordered by
    /// `chunk_index`. Returns `None` if the collection is missing or empty.
    pub async fn full_text(&self, collection: &str) -> Result<Option<String>, VectorStoreError> {
        if !self.collection_exists(collection).await? {
            warn!(collection, "Collection does not exist");
            return Ok(None);
        }

        let mut chunks: Vec<(usize, String)> = Vec::new();
        let mut offset: Option<Value> = None;

        loop {
            let mut body = json!({
                "limit": SCROLL_BATCH,
                "with_payload": true,
            });
            if let Some(ref o) = offset {
                body["offset"] = o.clone();
            }
            let value = self
                .request(
                    reqwest::Method::POST,
                    &format!("/collections/{collection}/points/scroll"),
                    Some(body),
                )
                .await?;

            for point in value["result"]["points"].as_array().into_iter().flatten() {
                let payload = &point["payload"];
                let text = payload["text"].as_str().unwrap_or_default();
                let idx = payload["chunk_index"].as_u64().unwrap_or(0) as usize;
                if !text.is_empty() {
                    chunks.push((idx, text.to_string()));
                }
            }

            match value["result"].get("next_page_offset") {
                Some(next) if !next.is_null() => offset = Some(next.clone()),
                _ => break,
            }
        }

        if chunks.is_empty() {
            return Ok(None);
        }
        chunks.sort_by_key(|(idx, _)| *idx);
        let full: Vec<String> = chunks.into_iter().map(|(_, t)| t).collect();
        let full_text = full.join("\n\n");
        debug!(collection, chars = full_text.len(), "Reconstructed full text");
        Ok(Some(full_text))
    }

    /// First readable line of the document (the chunk with the lowest
    /// `chunk_index`) — used as a job title. Empty string if unavailable.
    pub async fn first_line(&self, collection: &str) -> Result<String, VectorStoreError> {
        if !self.collection_exists(collection).await? {
            return Ok(String::new());
        }
        let value = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{collection}/points/scroll"),
                Some(json!({ "limit": 20, "with_payload": true })),
            )
            .await?;

        let mut points: Vec<(u64, String)> = value["result"]["points"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|p| {
                let idx = p["payload"]["chunk_index"].as_u64().unwrap_or(0);
                let text = p["payload"]["text"].as_str()?.to_string();
                Some((idx, text))
            })
            .collect();
        points.sort_by_key(|(idx, _)| *idx);

        let Some((_, text)) = points.into_iter().next() else {
            return Ok(String::new());
        };
        Ok(extract_title_line(&text))
    }

    async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, VectorStoreError> {
        let url = format!("{}{path}", self.base_url);
        let mut req = self.client.request(method, &url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(VectorStoreError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

/// Collapse PDF whitespace artefacts and take the first sentence-ish line
/// longer than 5 chars, capped at 120 chars.
fn extract_title_line(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    for line in collapsed.split('.') {
        let line = line.trim();
        if line.len() > 5 {
            return line.chars().take(120).collect();
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_collection_naming() {
        assert_eq!(job_collection("abc123"), "job_abc123");
    }

    #[test]
    fn test_extract_title_line_collapses_whitespace() {
        let text = "Senior\n \nML  Engineer at Acme. Responsibilities include...";
        assert_eq!(extract_title_line(text), "Senior ML Engineer at Acme");
    }

    #[test]
    fn test_extract_title_line_skips_short_fragments() {
        assert_eq!(extract_title_line("v2. Platform Engineer role"), "Platform Engineer role");
    }

    #[test]
    fn test_extract_title_line_caps_length() {
        let long = "x".repeat(400);
        assert_eq!(extract_title_line(&long).chars().count(), 120);
    }

    #[test]
    fn test_extract_title_line_empty() {
        assert_eq!(extract_title_line(""), "");
        assert_eq!(extract_title_line(". . ."), "");
    }

    #[test]
    fn test_chunk_payload_roundtrips_as_json() {
        let payload = ChunkPayload {
            text: "chunk".into(),
            source: "resume".into(),
            job_id: None,
            chunk_index: 3,
            total_chunks: 7,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["chunk_index"], 3);
        assert!(value["job_id"].is_null());
    }

    // Integration tests below need a running Qdrant at localhost:6333.

    #[tokio::test]
    #[ignore = "requires Qdrant"]
    async fn test_ensure_upsert_and_full_text() {
        let store = VectorStore::new("http://localhost:6333".into(), 4, 30).unwrap();
        let collection = "career_agent_test";
        store.ensure_collection(collection).await.unwrap();

        let points = vec![
            (
                vec![0.1, 0.2, 0.3, 0.4],
                ChunkPayload {
                    text: "second part".into(),
                    source: "job".into(),
                    job_id: Some("t1".into()),
                    chunk_index: 1,
                    total_chunks: 2,
                },
            ),
            (
                vec![0.4, 0.3, 0.2, 0.1],
                ChunkPayload {
                    text: "first part".into(),
                    source: "job".into(),
                    job_id: Some("t1".into()),
                    chunk_index: 0,
                    total_chunks: 2,
                },
            ),
        ];
        store.upsert_chunks(collection, points).await.unwrap();

        let text = store.full_text(collection).await.unwrap().unwrap();
        assert_eq!(text, "first part\n\nsecond part");
    }

    #[tokio::test]
    #[ignore = "requires Qdrant"]
    async fn test_missing_collection_full_text_is_none() {
        let store = VectorStore::new("http://localhost:6333".into(), 4, 30).unwrap();
        assert!(store.full_text("does_not_exist").await.unwrap().is_none());
    }
}
