//! Shared-secret authentication middleware
//!
//! Every route except `/health`, `/tg-webhook`, and CORS preflight requires
//! the `x-api-key` header to match the configured secret.

use crate::core::ServerState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::AppError;
use tracing::warn;

/// Comparison that does not short-circuit on the first mismatched byte
fn key_matches(provided: &str, expected: &str) -> bool {
    if provided.len() != expected.len() {
        return false;
    }
    provided
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

pub async fn require_api_key(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path();
    if path == "/health" || path == "/tg-webhook" {
        return Ok(next.run(req).await);
    }

    let provided = req
        .headers()
        .get("x-api-key")
        .and_then(|h| h.to_str().ok());

    match provided {
        Some(key) if key_matches(key, &state.config.api_key) => Ok(next.run(req).await),
        Some(_) => {
            warn!(path, "[Auth] Invalid api key");
            Err(AppError::invalid_api_key())
        }
        None => {
            warn!(path, "[Auth] Missing x-api-key header");
            Err(AppError::unauthorized())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_matches() {
        assert!(key_matches("secret", "secret"));
        assert!(!key_matches("secret", "secreT"));
        assert!(!key_matches("secre", "secret"));
        assert!(!key_matches("", "secret"));
        assert!(key_matches("", ""));
    }
}
