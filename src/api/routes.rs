//! API route definitions

use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::csrf::csrf_middleware;
use super::csrf::CsrfState;
use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create RESTful API router
///
/// With a `csrf_token`, the chat endpoints require a matching `X-CSRF-Token` header.
pub fn api_routes(state: AppState, csrf_token: Option<String>) -> Router {
    let mut chat_routes = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/:id/chat", post(handlers::session_chat));

    if let Some(expected_token) = csrf_token {
        chat_routes = chat_routes.layer(middleware::from_fn_with_state(
            CsrfState { expected_token },
            csrf_middleware,
        ));
    }

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        .route("/sessions/:id", get(handlers::get_session))
        .merge(chat_routes)
        .with_state(state)
}
