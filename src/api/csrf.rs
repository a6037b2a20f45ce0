//! Anti-CSRF header check for the state-changing chat routes

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use subtle::ConstantTimeEq;

use crate::api::error::ApiError;

pub const CSRF_HEADER: &str = "X-CSRF-Token";

#[derive(Clone)]
pub struct CsrfState {
    pub expected_token: String,
}

impl CsrfState {
    /// Constant-time comparison against the configured token
    fn matches(&self, token: &str) -> bool {
        bool::from(token.as_bytes().ct_eq(self.expected_token.as_bytes()))
    }
}

/// Rejects requests whose `X-CSRF-Token` header does not match the configured token
pub async fn csrf_middleware(
    State(state): State<CsrfState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let header = request.headers().get(CSRF_HEADER);
    match header.and_then(|h| h.to_str().ok()) {
        Some(token) if state.matches(token) => next.run(request).await,
        _ => {
            tracing::warn!("Rejected request with missing or invalid CSRF token");
            ApiError::unauthorized("Invalid CSRF token").into_response()
        }
    }
}
