use memchr::memmem;
use serde_json::Value;

use super::ContentBlock;
use crate::util::fresh_id;

const OPEN_FENCE: &str = "```tool_use";
const CLOSE_FENCE: &str = "```";

/// Split the backend's free-text reply into ordered content blocks.
///
/// When no tools were offered the reply passes through as a single text
/// block, so text that merely contains the fence marker is never
/// mis-parsed. Otherwise each fenced `tool_use` region is parsed as JSON;
/// a region that does not parse to an object is re-emitted as visible
/// fenced text rather than dropped.
#[must_use]
pub fn extract_content_blocks(text: &str, has_tools: bool) -> Vec<ContentBlock> {
    if !has_tools {
        return vec![ContentBlock::Text {
            text: text.to_string(),
        }];
    }

    let mut blocks = Vec::new();
    let mut remaining = text;

    while let Some(open) = memmem::find(remaining.as_bytes(), OPEN_FENCE.as_bytes()) {
        let before = remaining[..open].trim();
        if !before.is_empty() {
            blocks.push(ContentBlock::Text {
                text: before.to_string(),
            });
        }

        let after_open = &remaining[open + OPEN_FENCE.len()..];
        let (region, rest) = match memmem::find(after_open.as_bytes(), CLOSE_FENCE.as_bytes()) {
            Some(close) => (
                &after_open[..close],
                &after_open[close + CLOSE_FENCE.len()..],
            ),
            // Unclosed fence: the region runs to end of input.
            None => (after_open, ""),
        };
        blocks.push(parse_fenced_region(region.trim()));
        remaining = rest;
    }

    let trailing = remaining.trim();
    if !trailing.is_empty() {
        blocks.push(ContentBlock::Text {
            text: trailing.to_string(),
        });
    }

    // No fence and nothing but whitespace: keep the reply as-is, even empty.
    if blocks.is_empty() {
        blocks.push(ContentBlock::Text {
            text: text.to_string(),
        });
    }

    blocks
}

fn parse_fenced_region(payload: &str) -> ContentBlock {
    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(call)) => {
            let name = call
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            let input = call.get("input").cloned().unwrap_or_else(super::empty_object);
            ContentBlock::ToolUse {
                id: fresh_id("toolu_"),
                name,
                input,
            }
        }
        _ => ContentBlock::Text {
            text: format!("```tool_use\n{payload}\n```"),
        },
    }
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
