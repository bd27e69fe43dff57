pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/ingest", post(handlers::handle_ingest))
        .route("/api/v1/chat", post(handlers::handle_chat))
        .route(
            "/api/v1/session/:session_id",
            delete(handlers::handle_end_session),
        )
        .with_state(state)
}
