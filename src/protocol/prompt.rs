use serde_json::Value;

use super::content::normalize_content;
use super::{IncomingMessage, ToolDefinition};

const ROLE_USER: &str = "user";
const ROLE_ASSISTANT: &str = "assistant";

/// Instruction block appended to the system prompt when tools are
/// offered. The backend has no native tool channel; tool calls travel as
/// fenced JSON inside its plain-text reply.
const TOOL_PROTOCOL_HEADER: &str = "\n\n---\nYou have access to the following tools. To use a tool, respond with a JSON block like this:\n```tool_use\n{\"name\": \"tool_name\", \"input\": {...}}\n```\n\nAvailable tools:\n";

/// Compile the message list into the single text prompt the backend
/// receives.
///
/// A lone user message is passed through verbatim, with no role framing
/// the backend could over-interpret. Everything else renders as a
/// `Human:`/`Assistant:` transcript in input order; roles other than
/// user/assistant are skipped.
#[must_use]
pub fn compile_prompt(messages: &[IncomingMessage]) -> String {
    if let [only] = messages {
        if only.role == ROLE_USER {
            return normalize_content(Some(&only.content));
        }
    }

    let mut turns = Vec::with_capacity(messages.len());
    for message in messages {
        let label = match message.role.as_str() {
            ROLE_USER => "Human",
            ROLE_ASSISTANT => "Assistant",
            _ => continue,
        };
        turns.push(format!(
            "{label}: {}",
            normalize_content(Some(&message.content))
        ));
    }
    turns.join("\n\n")
}

/// Build the system prompt, folding tool definitions into the textual
/// tool-call protocol when present.
///
/// Returns `None` when the combined text is empty so callers omit the
/// system flag entirely instead of passing an empty string.
#[must_use]
pub fn build_system_prompt(
    system: Option<&Value>,
    tools: Option<&[ToolDefinition]>,
) -> Option<String> {
    let mut text = normalize_content(system);

    if let Some(tools) = tools.filter(|tools| !tools.is_empty()) {
        text.push_str(TOOL_PROTOCOL_HEADER);
        let bullets: Vec<String> = tools.iter().map(render_tool).collect();
        text.push_str(&bullets.join("\n"));
    }

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn render_tool(tool: &ToolDefinition) -> String {
    let description = tool.description.as_deref().unwrap_or("");
    let schema = serde_json::to_string_pretty(&tool.input_schema)
        .unwrap_or_else(|_| tool.input_schema.to_string());
    format!(
        "- **{}**: {description}\n  Input schema: {schema}",
        tool.name
    )
}
