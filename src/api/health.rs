use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// Health check handler.
/// Returns a fixed OK payload with a short config summary.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "status": "ok",
        "backend": config.backend.command,
        "config": {
            "chunk_size": config.streaming.chunk_size,
            "log_level": config.features.log_level,
        }
    }))
}
