//! HTTP handlers for ingestion, chat, and session teardown.

use axum::extract::{Path, State};
use axum::Json;
use tracing::info;

use crate::agent::router::dispatch;
use crate::chunking::{chunk_text, CHUNK_OVERLAP, CHUNK_SIZE};
use crate::errors::AppError;
use crate::models::{
    ChatRequest, ChatResponse, EndSessionResponse, IngestRequest, IngestResponse,
};
use crate::state::AppState;
use crate::vector_store::ChunkPayload;

/// POST /api/v1/ingest
///
/// Chunk, embed, and index one document into its own collection. Re-ingesting
/// the same collection appends; callers replace a document by deleting the
/// collection first.
pub async fn handle_ingest(
    State(state): State<AppState>,
    Json(req): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::Validation("text must not be empty".into()));
    }
    if req.collection_name.trim().is_empty() {
        return Err(AppError::Validation(
            "collection_name must not be empty".into(),
        ));
    }

    let chunks = chunk_text(&req.text, CHUNK_SIZE, CHUNK_OVERLAP);
    if chunks.is_empty() {
        return Err(AppError::Validation(
            "No text chunks produced from input".into(),
        ));
    }
    let total_chunks = chunks.len();

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = state
        .embedder
        .embed_batch(&texts)
        .await
        .map_err(|e| AppError::Embedding(e.to_string()))?;

    state
        .store
        .ensure_collection(&req.collection_name)
        .await
        .map_err(|e| AppError::VectorStore(e.to_string()))?;

    let points = vectors
        .into_iter()
        .zip(chunks)
        .map(|(vector, chunk)| {
            (
                vector,
                ChunkPayload {
                    text: chunk.text,
                    source: req.source.as_str().to_string(),
                    job_id: req.job_id.clone(),
                    chunk_index: chunk.ordinal,
                    total_chunks,
                },
            )
        })
        .collect();

    state
        .store
        .upsert_chunks(&req.collection_name, points)
        .await
        .map_err(|e| AppError::VectorStore(e.to_string()))?;

    info!(
        collection = %req.collection_name,
        chunks = total_chunks,
        source = req.source.as_str(),
        "Document ingested"
    );

    Ok(Json(IngestResponse {
        status: "ok",
        chunks: total_chunks,
        collection: req.collection_name,
    }))
}

/// POST /api/v1/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.query.trim().is_empty() {
        return Err(AppError::Validation("query must not be empty".into()));
    }

    let response = dispatch(&state, &req.query, &req.session_id, req.job_id.as_deref()).await?;
    Ok(Json(response))
}

/// DELETE /api/v1/session/:session_id
///
/// Idempotent: deleting an unknown session still returns ok.
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<EndSessionResponse>, AppError> {
    state.sessions.remove(&session_id).await;
    Ok(Json(EndSessionResponse {
        status: "ok",
        session_id,
    }))
}
