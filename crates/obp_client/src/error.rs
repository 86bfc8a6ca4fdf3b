//! Error types for the OBP client.

use reqwest::StatusCode;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ObpError {
    /// The remote answered with a non-success status. The message is taken
    /// from the `message` field of the JSON error body when present,
    /// otherwise synthesised from the status line.
    #[error("{message}")]
    Api {
        /// HTTP status returned by the remote
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// The request never produced a usable response (connection, timeout,
    /// or a body that failed to decode).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote answered 2xx but the payload is missing required data.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ObpError {
    /// Create an invalid-response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// HTTP status of the remote rejection, if this error carries one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
