use serde_json::Value;

/// Flatten a message `content` value (plain string or block array) into
/// plain text for the prompt transcript.
///
/// Total by construction: unknown or malformed blocks degrade to a
/// best-effort string form instead of erroring.
#[must_use]
pub fn normalize_content(content: Option<&Value>) -> String {
    let Some(content) = content else {
        return String::new();
    };
    match content {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(blocks) => {
            let parts: Vec<String> = blocks.iter().map(normalize_block).collect();
            parts.join("\n")
        }
        other => other.to_string(),
    }
}

fn normalize_block(block: &Value) -> String {
    let Some(block_type) = block.get("type").and_then(Value::as_str) else {
        return fallback_text(block);
    };
    match block_type {
        "text" => block
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        "tool_result" => {
            let result = block
                .get("content")
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()));
            format!("[Tool result: {}]", compact_json(&result))
        }
        "tool_use" => {
            let name = block.get("name").and_then(Value::as_str).unwrap_or("?");
            let input = block.get("input").cloned().unwrap_or_else(super::empty_object);
            format!("[Tool call: {name}({})]", compact_json(&input))
        }
        _ => fallback_text(block),
    }
}

fn fallback_text(block: &Value) -> String {
    match block {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn compact_json(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}
