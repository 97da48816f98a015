//! Error type surfaced by `Client::send_request`.
//!
//! # Design
//! Every failure is reported through one type. Request-side problems carry
//! the client-error code 400; transport failures carry the engine's own
//! numeric code and message unchanged. Nothing is retried here.

use crate::transport::TransportFailure;

/// Errors returned by the client.
#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    /// The request method is not one the client can map.
    #[error("Invalid request method: {0}")]
    InvalidMethod(String),

    /// The request body cannot be rewound or read for re-transmission.
    #[error("{0}")]
    InvalidBody(String),

    /// The transport engine failed before a response was received.
    #[error("{message}")]
    Transport { message: String, code: u32 },
}

impl HttpClientError {
    pub fn code(&self) -> u32 {
        match self {
            HttpClientError::InvalidMethod(_) | HttpClientError::InvalidBody(_) => 400,
            HttpClientError::Transport { code, .. } => *code,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<TransportFailure> for HttpClientError {
    fn from(failure: TransportFailure) -> Self {
        HttpClientError::Transport {
            message: failure.message,
            code: failure.code,
        }
    }
}
