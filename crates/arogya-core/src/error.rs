use thiserror::Error;

/// Everything that can go wrong between the widget and the reply service.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The request never completed (connection refused, reset, DNS, ...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a status outside 2xx.
    #[error("server returned {status}{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Status { status: u16, detail: Option<String> },

    /// A 2xx response whose body had no usable `reply` field.
    #[error("could not decode reply: {0}")]
    Decode(String),

    /// The task running the request died before producing a reply
    #[error("request interrupted: {0}")]
    Interrupted(String),

    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl ChatError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ChatError::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
