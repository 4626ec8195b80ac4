use thiserror::Error;

pub type Result<T> = std::result::Result<T, SlickError>;

#[derive(Debug, Error)]
pub enum SlickError {
    /// The server couldn't be reached or the body couldn't be read.
    #[error("transport error: {0}")]
    Transport(String),
    /// The server answered with a non-2xx status.
    #[error("server responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("invalid server url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl SlickError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResponse(_))
    }
}

impl From<reqwest::Error> for SlickError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for SlickError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

impl From<std::io::Error> for SlickError {
    fn from(err: std::io::Error) -> Self {
        // Invalid UTF-8 in a body line surfaces as `InvalidData`.
        match err.kind() {
            std::io::ErrorKind::InvalidData => Self::MalformedResponse(err.to_string()),
            _ => Self::Transport(err.to_string()),
        }
    }
}
