//! HTTP handlers

use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// Body of the liveness route
pub const LIVENESS_MESSAGE: &str =
    "Oracle Server is running. Send JSON-RPC requests to this endpoint.";

const BODY_PREVIEW_CHARS: usize = 500;

/// JSON-RPC endpoint
///
/// The body is read as JSON whatever the declared content type; some
/// toolchains post without one.
pub async fn handle_rpc(State(state): State<Arc<AppState>>, uri: Uri, body: Bytes) -> Response {
    tracing::debug!(
        "[POST] {} body: {}",
        uri.path(),
        String::from_utf8_lossy(&body)
            .chars()
            .take(BODY_PREVIEW_CHARS)
            .collect::<String>()
    );

    match state.rpc.receive_slice(&body) {
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Liveness check
pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "functions": state.registry.functions(),
        "methods": state.rpc.methods(),
    }))
}
