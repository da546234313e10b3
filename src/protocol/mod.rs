pub mod assemble;
pub mod content;
pub mod extract;
pub mod prompt;
pub mod stream;

use serde::{Deserialize, Serialize};

/// Messages API request wire type.
///
/// `system` and message content stay raw JSON values here; both are
/// normalized exactly once at the prompt boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesRequest {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub system: Option<serde_json::Value>,
    #[serde(default)]
    pub messages: Vec<IncomingMessage>,
    #[serde(default)]
    pub tools: Option<Vec<ToolDefinition>>,
    /// Accepted for wire compatibility; the backend decides its own limit.
    #[serde(default)]
    pub max_tokens: Option<u64>,
    #[serde(default)]
    pub stream: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

impl MessagesRequest {
    /// Whether tool definitions were supplied. Gates tool-call extraction:
    /// a reply that merely contains the fence marker is never parsed as a
    /// tool call unless tools were offered.
    #[must_use]
    pub fn has_tools(&self) -> bool {
        self.tools.as_ref().is_some_and(|tools| !tools.is_empty())
    }

    #[must_use]
    pub fn wants_stream(&self) -> bool {
        self.stream.unwrap_or(false)
    }
}

/// One incoming message turn.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub role: String,
    #[serde(default)]
    pub content: serde_json::Value,
}

/// Tool definition supplied by the caller. Only ever rendered as text in
/// the system prompt; nothing in this process executes tools.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "empty_object")]
    pub input_schema: serde_json::Value,
}

pub(crate) fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// A content block in an assembled response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
}

/// Token usage counters reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

/// Terminal classification of why generation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
}

/// Messages API response wire type.
#[derive(Debug, Clone, Serialize)]
pub struct MessagesResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub role: String,
    pub content: Vec<ContentBlock>,
    pub model: String,
    pub stop_reason: StopReason,
    pub stop_sequence: Option<String>,
    pub usage: Usage,
}

/// SSE stream event wire type. The serialized `type` tag matches the SSE
/// event name.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    #[serde(rename = "message_start")]
    MessageStart { message: MessageStart },
    #[serde(rename = "content_block_start")]
    ContentBlockStart {
        index: usize,
        content_block: ContentBlock,
    },
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { index: usize, delta: Delta },
    #[serde(rename = "content_block_stop")]
    ContentBlockStop { index: usize },
    #[serde(rename = "message_delta")]
    MessageDelta {
        delta: MessageDelta,
        usage: DeltaUsage,
    },
    #[serde(rename = "message_stop")]
    MessageStop {},
}

impl StreamEvent {
    /// SSE event name for the `event:` field.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::MessageStart { .. } => "message_start",
            StreamEvent::ContentBlockStart { .. } => "content_block_start",
            StreamEvent::ContentBlockDelta { .. } => "content_block_delta",
            StreamEvent::ContentBlockStop { .. } => "content_block_stop",
            StreamEvent::MessageDelta { .. } => "message_delta",
            StreamEvent::MessageStop {} => "message_stop",
        }
    }
}

/// `message_start` payload: the response shell before any content.
#[derive(Debug, Clone, Serialize)]
pub struct MessageStart {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub role: String,
    pub content: Vec<ContentBlock>,
    pub model: String,
    pub stop_reason: Option<StopReason>,
    pub stop_sequence: Option<String>,
    pub usage: Usage,
}

/// Delta variants for `content_block_delta`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Delta {
    #[serde(rename = "text_delta")]
    TextDelta { text: String },
    #[serde(rename = "input_json_delta")]
    InputJsonDelta { partial_json: String },
}

/// `message_delta` body carrying the final stop reason.
#[derive(Debug, Clone, Serialize)]
pub struct MessageDelta {
    pub stop_reason: StopReason,
    pub stop_sequence: Option<String>,
}

/// Usage fragment reported at end of stream. Output tokens are only
/// attributable once the whole answer has been replayed.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DeltaUsage {
    pub output_tokens: u64,
}
