//! HTTP-facing error type for proxied OBP calls.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use obp_client::ObpError;

/// Failure of a remote OBP call, mapped to an HTTP response.
///
/// Handlers return `Result<_, ApiError>` and use `?` on client calls; the
/// remote's own failure status is relayed to the caller, while transport
/// problems and unusable bodies surface as 502.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The OBP API answered with a failure status; relayed as-is
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    /// The OBP API could not be reached or returned an unusable body
    #[error("{0}")]
    Gateway(String),
}

impl From<ObpError> for ApiError {
    fn from(err: ObpError) -> Self {
        match err {
            ObpError::Api { status, message } => ApiError::Upstream { status, message },
            ObpError::Transport(e) => ApiError::Gateway(format!("OBP API request failed: {}", e)),
            ObpError::InvalidResponse(msg) => {
                ApiError::Gateway(format!("OBP API returned an invalid response: {}", msg))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Upstream { status, message } => (status, message),
            ApiError::Gateway(message) => (StatusCode::BAD_GATEWAY, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
