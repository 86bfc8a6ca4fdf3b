//! Bearer-token extraction for the API routes.
//!
//! This server keeps no sessions; every `/api` request must carry the
//! caller's OBP access token on the `Authorization` header, and the token
//! is passed through to the OBP API unchanged.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

/// The caller's OBP access token, taken from `Authorization: Bearer {token}`.
///
/// Rejects with `401 {"error": "Not authenticated"}` when the header is
/// missing, not a bearer scheme, or carries an empty token.
pub struct AuthToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthToken
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
            .map(|token| AuthToken(token.to_string()))
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": "Not authenticated" })),
                )
                    .into_response()
            })
    }
}
