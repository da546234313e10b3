use super::{ContentBlock, MessagesResponse, StopReason, Usage};
use crate::util::fresh_id;

/// Derive the stop reason from assembled content: `tool_use` as soon as
/// any tool invocation is present, `end_turn` otherwise.
#[must_use]
pub fn derive_stop_reason(content: &[ContentBlock]) -> StopReason {
    if content
        .iter()
        .any(|block| matches!(block, ContentBlock::ToolUse { .. }))
    {
        StopReason::ToolUse
    } else {
        StopReason::EndTurn
    }
}

/// Assemble the final response message from extracted content blocks and
/// the backend's usage counters.
#[must_use]
pub fn assemble_response(model: String, content: Vec<ContentBlock>, usage: Usage) -> MessagesResponse {
    let stop_reason = derive_stop_reason(&content);
    MessagesResponse {
        id: fresh_id("msg_proxy_"),
        type_: "message".to_string(),
        role: "assistant".to_string(),
        content,
        model,
        stop_reason,
        stop_sequence: None,
        usage,
    }
}
