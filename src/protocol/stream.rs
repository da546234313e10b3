use super::{
    ContentBlock, Delta, DeltaUsage, MessageDelta, MessageStart, MessagesResponse, StreamEvent,
    Usage,
};

/// Replay an assembled response as the event sequence of the streaming
/// protocol.
///
/// Every content block already exists before this runs; the events only
/// present the finished answer incrementally. Text is split into
/// `chunk_size`-character deltas; tool-call input always travels as a
/// single delta.
#[must_use]
pub fn emulate_stream(response: &MessagesResponse, chunk_size: usize) -> Vec<StreamEvent> {
    let chunk_size = chunk_size.max(1);
    let mut events = Vec::new();

    events.push(StreamEvent::MessageStart {
        message: MessageStart {
            id: response.id.clone(),
            type_: "message".to_string(),
            role: "assistant".to_string(),
            content: Vec::new(),
            model: response.model.clone(),
            stop_reason: None,
            stop_sequence: None,
            usage: Usage {
                input_tokens: response.usage.input_tokens,
                output_tokens: 0,
            },
        },
    });

    for (index, block) in response.content.iter().enumerate() {
        match block {
            ContentBlock::Text { text } => {
                events.push(StreamEvent::ContentBlockStart {
                    index,
                    content_block: ContentBlock::Text {
                        text: String::new(),
                    },
                });
                for chunk in char_chunks(text, chunk_size) {
                    events.push(StreamEvent::ContentBlockDelta {
                        index,
                        delta: Delta::TextDelta {
                            text: chunk.to_string(),
                        },
                    });
                }
            }
            ContentBlock::ToolUse { id, name, input } => {
                events.push(StreamEvent::ContentBlockStart {
                    index,
                    content_block: ContentBlock::ToolUse {
                        id: id.clone(),
                        name: name.clone(),
                        input: super::empty_object(),
                    },
                });
                events.push(StreamEvent::ContentBlockDelta {
                    index,
                    delta: Delta::InputJsonDelta {
                        partial_json: serde_json::to_string(input)
                            .unwrap_or_else(|_| "{}".to_string()),
                    },
                });
            }
        }
        events.push(StreamEvent::ContentBlockStop { index });
    }

    events.push(StreamEvent::MessageDelta {
        delta: MessageDelta {
            stop_reason: response.stop_reason,
            stop_sequence: None,
        },
        usage: DeltaUsage {
            output_tokens: response.usage.output_tokens,
        },
    });
    events.push(StreamEvent::MessageStop {});

    events
}

/// Split text into chunks of at most `chunk_size` characters, never
/// breaking a code point.
fn char_chunks(text: &str, chunk_size: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let cut = rest
            .char_indices()
            .nth(chunk_size)
            .map_or(rest.len(), |(idx, _)| idx);
        let (head, tail) = rest.split_at(cut);
        chunks.push(head);
        rest = tail;
    }
    chunks
}
