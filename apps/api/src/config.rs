use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every knob has a local-development default, so a bare `cargo run` works
/// against local Ollama and Qdrant.
#[derive(Debug, Clone)]
pub struct Config {
    pub ollama_base_url: String,
    pub llm_model: String,
    pub embedding_model: String,
    pub embedding_dim: usize,
    pub qdrant_url: String,
    pub port: u16,
    pub rust_log: String,
    pub llm_timeout_secs: u64,
    pub max_iterations: usize,
    pub memory_token_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            ollama_base_url: env_or("OLLAMA_BASE_URL", "http://localhost:11434"),
            llm_model: env_or("LLM_MODEL", "llama3.1:8b"),
            embedding_model: env_or("EMBEDDING_MODEL", "nomic-embed-text"),
            embedding_dim: env_or("EMBEDDING_DIM", "768")
                .parse::<usize>()
                .context("EMBEDDING_DIM must be a positive integer")?,
            qdrant_url: env_or("QDRANT_URL", "http://localhost:6333"),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            llm_timeout_secs: env_or("LLM_TIMEOUT_SECS", "180")
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a positive integer")?,
            max_iterations: env_or("AGENT_MAX_ITERATIONS", "10")
                .parse::<usize>()
                .context("AGENT_MAX_ITERATIONS must be a positive integer")?,
            memory_token_limit: env_or("MEMORY_TOKEN_LIMIT", "2048")
                .parse::<usize>()
                .context("MEMORY_TOKEN_LIMIT must be a positive integer")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
