use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

/// Canonical request-scoped error type.
///
/// The only failure that ever reaches a caller is a backend one; content
/// malformations (bad tool JSON, unknown block shapes, unknown roles) are
/// recovered where they occur and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Anthropic-shaped error envelope: `{"type":"error","error":{...}}`.
#[must_use]
pub fn api_error_payload(message: &str) -> Value {
    json!({
        "type": "error",
        "error": {
            "type": "api_error",
            "message": message,
        }
    })
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let ProxyError::Backend(message) = self;
        (
            http::StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(api_error_payload(&message)),
        )
            .into_response()
    }
}
