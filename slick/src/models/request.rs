use bon::Builder;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Stop sequence the server is asked to halt on when the caller doesn't
/// provide one.
pub const DEFAULT_STOP: &str = "<|end_of_text|>";

/// Wire protocol spoken with the generation server. Each protocol has its
/// own endpoint, request body, and response chunk shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Protocol {
    /// OpenAI-compatible chat completions with per-choice field deltas.
    #[default]
    Chat,
    /// llama.cpp's native completion endpoint with a flat `content` field.
    Completion,
}

impl Protocol {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Chat => "/chat/completions",
            Self::Completion => "/completion",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Chat => "chat",
            Self::Completion => "completion",
        };
        write!(f, "{repr}")
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "completion" | "raw-completion" => Ok(Self::Completion),
            other => Err(format!(
                "unknown protocol '{other}', expected 'chat' or 'completion'"
            )),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Stop {
    One(String),
    Many(Vec<String>),
}

impl Default for Stop {
    fn default() -> Self {
        Self::One(DEFAULT_STOP.to_string())
    }
}

impl From<Vec<String>> for Stop {
    fn from(mut stops: Vec<String>) -> Self {
        match stops.len() {
            0 => Self::default(),
            1 => Self::One(stops.remove(0)),
            _ => Self::Many(stops),
        }
    }
}

#[derive(Builder, Clone, Debug, PartialEq, Serialize)]
pub struct SamplingParams {
    #[builder(default = 0.2)]
    pub temperature: f32,
    #[builder(default = 40)]
    pub top_k: u32,
    #[builder(default = 0.9)]
    pub top_p: f32,
    #[builder(default)]
    pub stop: Stop,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Per-call knobs for a generation.
#[derive(Builder, Clone, Debug, PartialEq)]
pub struct GenerationOptions {
    #[builder(default = 500)]
    pub max_new_tokens: u32,
    #[builder(default)]
    pub sampling: SamplingParams,
    #[builder(default)]
    pub protocol: Protocol,
    #[builder(default = true)]
    pub stream: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
}

#[derive(Clone, Debug, Serialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

/// JSON body posted to the server. The shape depends on the protocol.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RequestBody<'a> {
    Chat {
        messages: Vec<Message>,
        #[serde(flatten)]
        sampling: &'a SamplingParams,
        max_tokens: u32,
        stream: bool,
    },
    Completion {
        prompt: &'a str,
        #[serde(flatten)]
        sampling: &'a SamplingParams,
        n_predict: u32,
        stream: bool,
    },
}

/// A single generation call, fixed at construction.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    prompt: String,
    options: GenerationOptions,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, options: GenerationOptions) -> Self {
        Self {
            prompt: prompt.into(),
            options,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn protocol(&self) -> Protocol {
        self.options.protocol
    }

    pub fn stream(&self) -> bool {
        self.options.stream
    }

    pub fn body(&self) -> RequestBody<'_> {
        let GenerationOptions {
            max_new_tokens,
            sampling,
            protocol,
            stream,
        } = &self.options;
        match protocol {
            Protocol::Chat => RequestBody::Chat {
                messages: vec![Message {
                    role: MessageRole::User,
                    content: self.prompt.clone(),
                }],
                sampling,
                max_tokens: *max_new_tokens,
                stream: *stream,
            },
            Protocol::Completion => RequestBody::Completion {
                prompt: &self.prompt,
                sampling,
                n_predict: *max_new_tokens,
                stream: *stream,
            },
        }
    }
}
