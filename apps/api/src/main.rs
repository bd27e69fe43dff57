mod agent;
mod analysis;
mod chunking;
mod config;
mod embedding;
mod errors;
mod handlers;
mod llm_client;
mod models;
mod routes;
mod state;
mod vector_store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::agent::session::SessionStore;
use crate::agent::tools::{ToolContext, ToolRegistry};
use crate::config::Config;
use crate::embedding::EmbeddingClient;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::vector_store::VectorStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career Agent API v{}", env!("CARGO_PKG_VERSION"));

    let llm = Arc::new(LlmClient::new(
        config.ollama_base_url.clone(),
        config.llm_model.clone(),
        config.llm_timeout_secs,
    )?);
    info!("LLM client initialized (model: {})", llm.model());

    let embedder = Arc::new(EmbeddingClient::new(
        config.ollama_base_url.clone(),
        config.embedding_model.clone(),
        config.embedding_dim,
        config.llm_timeout_secs,
    )?);
    info!(
        "Embedding client initialized (model: {}, dim: {})",
        config.embedding_model, config.embedding_dim
    );

    let store = Arc::new(VectorStore::new(
        config.qdrant_url.clone(),
        config.embedding_dim,
        config.llm_timeout_secs,
    )?);
    info!("Vector store client initialized ({})", config.qdrant_url);

    let tools = Arc::new(ToolRegistry::new(ToolContext {
        store: store.clone(),
        embedder: embedder.clone(),
        llm: llm.clone(),
    }));
    let sessions = Arc::new(SessionStore::new(config.memory_token_limit));

    let state = AppState {
        llm,
        embedder,
        store,
        sessions,
        tools,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
