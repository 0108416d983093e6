use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Json, Response},
};
use sha2::{Digest, Sha256};

use crate::config::Config;

/// Caller presented the configured admin token.
/// Use this extractor on routes that trigger or inspect syncs.
///
/// Rejects with 401 when the bearer token is missing or wrong, and with 403
/// when the server has no admin token configured at all.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
    Arc<Config>: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<Config>::from_ref(state);

        let Some(expected) = config.admin_token.as_deref() else {
            return Err(reject(StatusCode::FORBIDDEN, "Admin access is disabled"));
        };

        match bearer_token(parts) {
            Some(token) if tokens_match(token, expected) => Ok(RequireAdmin),
            _ => Err(reject(StatusCode::UNAUTHORIZED, "Admin token required")),
        }
    }
}

/// Token from an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Compare tokens in time independent of where they differ. Hashing first
/// also hides the expected token's length.
fn tokens_match(given: &str, expected: &str) -> bool {
    let given = Sha256::digest(given.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    given
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
