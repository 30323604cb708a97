// crates/client/src/error.rs
use thiserror::Error;

/// Errors raised by the student client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("realtime connection failed: {0}")]
    Realtime(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("invalid message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("focus monitor has shut down")]
    MonitorClosed,
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }
}
