use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    accumulator::Accumulator,
    error::{Result, SlickError},
    models::{
        request::Protocol,
        response::{ChatChunk, CompletionChunk, Fragment},
    },
};

/// Prefix of every event line in a server-sent stream.
pub const DATA_PREFIX: &str = "data: ";

/// Line that ends a chat stream.
pub const DONE_SENTINEL: &str = "data: [DONE]";

/// One field's share of a chat delta. `None` means the server sent `null`.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDelta {
    pub field: String,
    pub fragment: Option<String>,
}

/// A parsed event line.
#[derive(Clone, Debug, PartialEq)]
pub enum Delta {
    /// No further deltas follow for this generation.
    Terminal,
    /// Chat field fragments, in order, across every choice in the chunk.
    Fields(Vec<FieldDelta>),
    /// Completion text to append.
    Text(String),
}

/// Parses one non-blank line of a streamed response.
pub fn parse_line(line: &str, protocol: Protocol) -> Result<Delta> {
    match protocol {
        Protocol::Chat => parse_chat_line(line),
        Protocol::Completion => parse_completion_line(line),
    }
}

fn parse_chat_line(line: &str) -> Result<Delta> {
    if line == DONE_SENTINEL {
        return Ok(Delta::Terminal);
    }
    let data = line.strip_prefix(DATA_PREFIX).ok_or_else(|| {
        SlickError::MalformedResponse(format!("expected a '{DATA_PREFIX}' event, got '{line}'"))
    })?;
    let chunk = serde_json::from_str::<ChatChunk>(data)?;
    Ok(Delta::Fields(field_deltas(chunk)))
}

fn parse_completion_line(line: &str) -> Result<Delta> {
    let data = line.strip_prefix(DATA_PREFIX).unwrap_or(line);
    let chunk = serde_json::from_str::<CompletionChunk>(data)?;
    Ok(Delta::Text(chunk.content))
}

// Choices aren't told apart: every choice's delta lands in the same fields.
// Only string and null values merge; anything else (`tool_calls`,
// `annotations`, ...) is skipped.
fn field_deltas(chunk: ChatChunk) -> Vec<FieldDelta> {
    let mut deltas = vec![];
    for choice in chunk.choices {
        for (field, value) in choice.delta {
            let fragment = match value {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => {
                    debug!("skipping non-text delta field '{field}': {other}");
                    continue;
                }
            };
            deltas.push(FieldDelta { field, fragment });
        }
    }
    deltas
}

/// Parses a whole non-streaming response body into its single fragment.
///
/// The body may optionally be wrapped as one `data: ` event. Chat bodies
/// are read from `choices[].message` (or `delta`) and fall back to a flat
/// `{"content": ...}` document when there are no choices.
pub fn parse_body(body: &str, protocol: Protocol) -> Result<Fragment> {
    let document = body.trim();
    let document = document.strip_prefix(DATA_PREFIX).unwrap_or(document);
    match protocol {
        Protocol::Chat => {
            let value = serde_json::from_str::<Value>(document)?;
            let deltas = if value.get("choices").is_some() {
                field_deltas(ChatChunk::deserialize(value)?)
            } else {
                let chunk = CompletionChunk::deserialize(value)?;
                vec![FieldDelta {
                    field: "content".to_string(),
                    fragment: Some(chunk.content),
                }]
            };
            let mut accumulator = Accumulator::new();
            accumulator.apply(deltas);
            Ok(Fragment::Accumulated(accumulator.snapshot()))
        }
        Protocol::Completion => {
            let chunk = serde_json::from_str::<CompletionChunk>(document)?;
            Ok(Fragment::Text(chunk.content))
        }
    }
}
