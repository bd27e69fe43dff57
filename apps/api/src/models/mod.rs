//! API wire types.

pub mod reports;

use serde::{Deserialize, Serialize};

use crate::agent::intent::Intent;

fn default_session_id() -> String {
    "default".to_string()
}

/// Document kind accepted by the ingestion endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSource {
    Resume,
    Job,
}

impl DocumentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentSource::Resume => "resume",
            DocumentSource::Job => "job",
        }
    }
}

/// POST /api/v1/ingest
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub text: String,
    pub collection_name: String,
    pub source: DocumentSource,
    #[serde(default)]
    pub job_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
    pub chunks: usize,
    pub collection: String,
}

/// POST /api/v1/chat
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default = "default_session_id")]
    pub session_id: String,
    #[serde(default)]
    pub job_id: Option<String>,
}

/// Which processing path produced the answer. Exposed so the dispatch
/// decision is observable end-to-end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutedVia {
    Metadata,
    DirectLlm,
    Agent,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub session_id: String,
    pub intent: Intent,
    pub routed_via: RoutedVia,
}

/// DELETE /api/v1/session/:session_id
#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    pub status: &'static str,
    pub session_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_defaults_session_id() {
        let req: ChatRequest = serde_json::from_str(r#"{"query": "hello"}"#).unwrap();
        assert_eq!(req.session_id, "default");
        assert!(req.job_id.is_none());
    }

    #[test]
    fn test_document_source_lowercase() {
        let src: DocumentSource = serde_json::from_str(r#""resume""#).unwrap();
        assert_eq!(src, DocumentSource::Resume);
        assert!(serde_json::from_str::<DocumentSource>(r#""pdf""#).is_err());
    }

    #[test]
    fn test_routed_via_snake_case() {
        assert_eq!(
            serde_json::to_string(&RoutedVia::DirectLlm).unwrap(),
            r#""direct_llm""#
        );
        assert_eq!(
            serde_json::to_string(&RoutedVia::Metadata).unwrap(),
            r#""metadata""#
        );
    }

    #[test]
    fn test_chat_response_shape() {
        let resp = ChatResponse {
            answer: "hi".into(),
            session_id: "s1".into(),
            intent: Intent::Conversational,
            routed_via: RoutedVia::Agent,
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["intent"], "conversational");
        assert_eq!(value["routed_via"], "agent");
        assert_eq!(value["session_id"], "s1");
    }
}
