//! Bearer-token authentication middleware

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use super::AppState;

/// Extract the bearer token from the Authorization header
fn extract_bearer(req: &Request) -> Option<&str> {
    req.headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Reject any request whose bearer token differs from the configured one.
/// The server never starts without a token, so there is no open mode.
pub async fn require_token(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    match extract_bearer(&req) {
        Some(token) if !state.auth_token.is_empty() && token == state.auth_token => {
            Ok(next.run(req).await)
        }
        Some(_) => {
            tracing::warn!("invalid bearer token");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::debug!("no bearer token provided");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
