use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    /// The relay answered with its `{error, message}` envelope.
    #[error("{message}")]
    Relay {
        status: StatusCode,
        error: String,
        message: String,
    },

    #[error("Failed to fetch alerts: {0}")]
    Status(StatusCode),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected relay payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid relay URL: {0}")]
    RelayUrl(String),
}

impl FetchError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Relay { status, .. } | FetchError::Status(status) => Some(*status),
            FetchError::Transport(e) => e.status(),
            FetchError::Decode(_) | FetchError::RelayUrl(_) => None,
        }
    }
}
