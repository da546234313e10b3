use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::stream;

use crate::backend::{resolve_model_flag, BackendResult};
use crate::error::{api_error_payload, ProxyError};
use crate::protocol::assemble::assemble_response;
use crate::protocol::extract::extract_content_blocks;
use crate::protocol::prompt::{build_system_prompt, compile_prompt};
use crate::protocol::stream::emulate_stream;
use crate::protocol::{MessagesRequest, StreamEvent};
use crate::state::AppState;

/// `POST /v1/messages` — translate the request into one backend
/// invocation and answer in the caller's chosen shape (JSON or SSE).
///
/// The pipeline is strictly sequential per request: normalize, compile,
/// invoke, extract, assemble, then optionally replay as events. The only
/// await point is the backend call.
pub async fn messages_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MessagesRequest>,
) -> Response {
    let prompt = compile_prompt(&request.messages);
    let system_prompt = build_system_prompt(request.system.as_ref(), request.tools.as_deref());
    let model_flag = resolve_model_flag(&request.model);

    tracing::info!(
        model = %request.model,
        flag = %model_flag,
        messages = request.messages.len(),
        tools = request.tools.as_ref().map_or(0, Vec::len),
        stream = request.wants_stream(),
        "dispatching request"
    );

    let start = Instant::now();
    let result = state
        .backend
        .invoke(&prompt, system_prompt.as_deref(), model_flag)
        .await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match &result {
        BackendResult::Reply { usage, .. } => tracing::info!(
            elapsed_ms,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "backend replied"
        ),
        BackendResult::Failure { message } => {
            tracing::warn!(elapsed_ms, error = %message, "backend failed");
        }
    }

    respond(&request, result, state.config.streaming.chunk_size)
}

/// Turn a backend outcome into the HTTP response.
///
/// Split out from the handler so the whole post-invocation path can be
/// exercised without spawning a backend process.
#[must_use]
pub fn respond(request: &MessagesRequest, result: BackendResult, chunk_size: usize) -> Response {
    let (text, usage) = match result {
        BackendResult::Failure { message } => {
            if request.wants_stream() {
                return error_event_response(&message);
            }
            return ProxyError::Backend(message).into_response();
        }
        BackendResult::Reply { text, usage } => (text, usage),
    };

    let blocks = extract_content_blocks(&text, request.has_tools());
    let response = assemble_response(request.model.clone(), blocks, usage);

    if request.wants_stream() {
        sse_response(emulate_stream(&response, chunk_size))
    } else {
        Json(response).into_response()
    }
}

fn sse_response(events: Vec<StreamEvent>) -> Response {
    let frames = stream::iter(
        events
            .into_iter()
            .map(|event| Event::default().event(event.name()).json_data(&event)),
    );
    Sse::new(frames).into_response()
}

/// A failing stream is a single `error` event, then end-of-stream.
fn error_event_response(message: &str) -> Response {
    let frame = Event::default()
        .event("error")
        .json_data(api_error_payload(message));
    Sse::new(stream::iter([frame])).into_response()
}
