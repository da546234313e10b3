use axum::body::to_bytes;
use axum::response::Response;
use serde_json::{json, Value};

use claude_bridge::api::messages::respond;
use claude_bridge::backend::BackendResult;
use claude_bridge::protocol::{MessagesRequest, Usage};

const CHUNK_SIZE: usize = 20;

fn request(body: Value) -> MessagesRequest {
    serde_json::from_value(body).expect("request parse")
}

fn reply(text: &str, input_tokens: u64, output_tokens: u64) -> BackendResult {
    BackendResult::Reply {
        text: text.to_string(),
        usage: Usage {
            input_tokens,
            output_tokens,
        },
    }
}

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("collect body");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_string(response).await).expect("json body")
}

/// One parsed SSE frame: (event name, data payload).
fn parse_sse_frames(body: &str) -> Vec<(String, Value)> {
    body.split("\n\n")
        .filter(|frame| !frame.trim().is_empty())
        .map(|frame| {
            let mut event = None;
            let mut data = None;
            for line in frame.lines() {
                if let Some(rest) = line.strip_prefix("event: ") {
                    event = Some(rest.to_string());
                } else if let Some(rest) = line.strip_prefix("data: ") {
                    data = Some(serde_json::from_str(rest).expect("frame json"));
                }
            }
            (event.expect("event field"), data.expect("data field"))
        })
        .collect()
}

// -- non-streaming ------------------------------------------------------

#[tokio::test]
async fn plain_request_round_trips_text_and_usage() {
    let req = request(json!({
        "model": "claude-sonnet-4-20250514",
        "messages": [{"role": "user", "content": "Hi"}],
        "stream": false
    }));
    let response = respond(&req, reply("Hello!", 5, 3), CHUNK_SIZE);
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    assert!(body["id"].as_str().unwrap().starts_with("msg_proxy_"));
    assert_eq!(body["type"], "message");
    assert_eq!(body["role"], "assistant");
    assert_eq!(body["model"], "claude-sonnet-4-20250514");
    assert_eq!(body["content"], json!([{"type": "text", "text": "Hello!"}]));
    assert_eq!(body["stop_reason"], "end_turn");
    assert!(body["stop_sequence"].is_null());
    assert_eq!(body["usage"]["input_tokens"], 5);
    assert_eq!(body["usage"]["output_tokens"], 3);
}

#[tokio::test]
async fn missing_model_falls_back_to_the_default_name() {
    let req = request(json!({
        "messages": [{"role": "user", "content": "Hi"}]
    }));
    let response = respond(&req, reply("ok", 1, 1), CHUNK_SIZE);
    let body = body_json(response).await;
    assert_eq!(body["model"], "claude-sonnet-4-20250514");
}

#[tokio::test]
async fn tool_reply_produces_tool_use_blocks_and_stop_reason() {
    let req = request(json!({
        "model": "claude-3-opus-latest",
        "messages": [{"role": "user", "content": "weather?"}],
        "tools": [{
            "name": "get_weather",
            "description": "Get weather",
            "input_schema": {"type": "object"}
        }]
    }));
    let backend_text = "Checking.\n```tool_use\n{\"name\": \"get_weather\", \"input\": {\"city\": \"SF\"}}\n```";
    let response = respond(&req, reply(backend_text, 10, 7), CHUNK_SIZE);
    let body = body_json(response).await;

    assert_eq!(body["stop_reason"], "tool_use");
    let content = body["content"].as_array().unwrap();
    assert_eq!(content.len(), 2);
    assert_eq!(content[0], json!({"type": "text", "text": "Checking."}));
    assert_eq!(content[1]["type"], "tool_use");
    assert_eq!(content[1]["name"], "get_weather");
    assert_eq!(content[1]["input"], json!({"city": "SF"}));
    assert!(content[1]["id"].as_str().unwrap().starts_with("toolu_"));
}

#[tokio::test]
async fn fence_without_tools_offered_stays_plain_text() {
    let req = request(json!({
        "messages": [{"role": "user", "content": "hi"}]
    }));
    let backend_text = "```tool_use\n{\"name\": \"x\"}\n```";
    let response = respond(&req, reply(backend_text, 1, 1), CHUNK_SIZE);
    let body = body_json(response).await;

    assert_eq!(body["stop_reason"], "end_turn");
    assert_eq!(
        body["content"],
        json!([{"type": "text", "text": backend_text}])
    );
}

#[tokio::test]
async fn backend_failure_maps_to_api_error_envelope() {
    let req = request(json!({
        "messages": [{"role": "user", "content": "Hi"}],
        "stream": false
    }));
    let response = respond(
        &req,
        BackendResult::Failure {
            message: "claude error: boom".to_string(),
        },
        CHUNK_SIZE,
    );
    assert_eq!(response.status(), 500);

    let body = body_json(response).await;
    assert_eq!(body["type"], "error");
    assert_eq!(body["error"]["type"], "api_error");
    assert!(body["error"]["message"].as_str().unwrap().contains("boom"));
}

// -- streaming ----------------------------------------------------------

#[tokio::test]
async fn streaming_reply_emits_the_full_event_sequence() {
    let req = request(json!({
        "model": "m",
        "messages": [{"role": "user", "content": "Hi"}],
        "stream": true
    }));
    let text = "A reply long enough to need several chunks of streaming.";
    let response = respond(&req, reply(text, 5, 3), CHUNK_SIZE);
    assert_eq!(response.status(), 200);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let frames = parse_sse_frames(&body_string(response).await);
    let names: Vec<&str> = frames.iter().map(|(name, _)| name.as_str()).collect();

    assert_eq!(names.first(), Some(&"message_start"));
    assert_eq!(names[1], "content_block_start");
    assert!(names[2..names.len() - 3]
        .iter()
        .all(|name| *name == "content_block_delta"));
    assert_eq!(names[names.len() - 3], "content_block_stop");
    assert_eq!(names[names.len() - 2], "message_delta");
    assert_eq!(names[names.len() - 1], "message_stop");

    // Frame payloads mirror their event names.
    for (name, data) in &frames {
        assert_eq!(data["type"].as_str(), Some(name.as_str()));
    }

    // Delta concatenation reconstructs the backend text.
    let rebuilt: String = frames
        .iter()
        .filter(|(name, _)| name == "content_block_delta")
        .map(|(_, data)| data["delta"]["text"].as_str().unwrap())
        .collect();
    assert_eq!(rebuilt, text);

    // message_start withholds output tokens; message_delta reports them.
    let (_, start) = &frames[0];
    assert_eq!(start["message"]["usage"]["input_tokens"], 5);
    assert_eq!(start["message"]["usage"]["output_tokens"], 0);
    let (_, delta) = &frames[frames.len() - 2];
    assert_eq!(delta["usage"]["output_tokens"], 3);
    assert_eq!(delta["delta"]["stop_reason"], "end_turn");
}

#[tokio::test]
async fn streaming_tool_input_is_one_unsplit_delta() {
    let req = request(json!({
        "messages": [{"role": "user", "content": "weather?"}],
        "tools": [{"name": "get_weather", "input_schema": {"type": "object"}}],
        "stream": true
    }));
    let backend_text =
        "```tool_use\n{\"name\": \"get_weather\", \"input\": {\"city\": \"San Francisco\"}}\n```";
    let response = respond(&req, reply(backend_text, 2, 2), 4);

    let frames = parse_sse_frames(&body_string(response).await);
    let tool_deltas: Vec<&Value> = frames
        .iter()
        .filter(|(name, data)| {
            name == "content_block_delta" && data["delta"]["type"] == "input_json_delta"
        })
        .map(|(_, data)| data)
        .collect();

    assert_eq!(tool_deltas.len(), 1);
    let partial: Value =
        serde_json::from_str(tool_deltas[0]["delta"]["partial_json"].as_str().unwrap()).unwrap();
    assert_eq!(partial, json!({"city": "San Francisco"}));

    let (_, delta) = &frames[frames.len() - 2];
    assert_eq!(delta["delta"]["stop_reason"], "tool_use");
}

#[tokio::test]
async fn streaming_backend_failure_is_a_single_error_frame() {
    let req = request(json!({
        "messages": [{"role": "user", "content": "Hi"}],
        "stream": true
    }));
    let response = respond(
        &req,
        BackendResult::Failure {
            message: "claude error: boom".to_string(),
        },
        CHUNK_SIZE,
    );

    let frames = parse_sse_frames(&body_string(response).await);
    assert_eq!(frames.len(), 1);
    let (name, data) = &frames[0];
    assert_eq!(name, "error");
    assert_eq!(data["type"], "error");
    assert_eq!(data["error"]["type"], "api_error");
    assert!(data["error"]["message"].as_str().unwrap().contains("boom"));
}
