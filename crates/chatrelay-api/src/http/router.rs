//! Axum router configuration with middleware.

use axum::Router;
use axum::routing::{any, get};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Default path of the chat endpoint.
pub const DEFAULT_CHAT_PATH: &str = "/api/chat";

/// Build the router: the chat endpoint at `chat_path` plus `/health`.
///
/// The chat route accepts every method so non-POST requests get the JSON
/// 405 body rather than axum's empty one.
pub fn build_router(state: AppState, chat_path: &str) -> Router {
    Router::new()
        .route(chat_path, any(handlers::chat::handle_chat))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
