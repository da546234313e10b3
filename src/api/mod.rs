pub mod health;
pub mod messages;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the application router.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/messages", post(messages::messages_handler))
        .route("/health", get(health::health_handler))
        .with_state(state)
}
