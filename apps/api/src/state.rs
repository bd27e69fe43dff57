use std::sync::Arc;

use crate::agent::session::SessionStore;
use crate::agent::tools::ToolRegistry;
use crate::config::Config;
use crate::embedding::EmbeddingClient;
use crate::llm_client::LlmClient;
use crate::vector_store::VectorStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<LlmClient>,
    pub embedder: Arc<EmbeddingClient>,
    pub store: Arc<VectorStore>,
    pub sessions: Arc<SessionStore>,
    pub tools: Arc<ToolRegistry>,
    pub config: Config,
}
