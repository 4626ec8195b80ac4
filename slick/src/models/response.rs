use serde::Deserialize;
use serde_json::{Map, Value};

use crate::accumulator::AccumulatedResult;

/// One streamed chunk from the chat completions endpoint. A non-streaming
/// response has the same shape with `message` in place of `delta`.
#[derive(Debug, Deserialize)]
pub struct ChatChunk {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    #[serde(alias = "message")]
    pub delta: Map<String, Value>,
}

/// One chunk (or the whole body) from the completion endpoint.
#[derive(Debug, Deserialize)]
pub struct CompletionChunk {
    pub content: String,
}

/// Unit of output handed to callers of a generation.
#[derive(Clone, Debug, PartialEq)]
pub enum Fragment {
    /// Appended text from a completion stream.
    Text(String),
    /// Merged fields of a finished chat generation.
    Accumulated(AccumulatedResult),
}

impl Fragment {
    /// The generated text carried by this fragment, if any.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Accumulated(result) => result.content(),
        }
    }
}
