//! HTTP server implementation

use std::sync::Arc;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::rag::RagService;
use crate::Result;

/// Assemble the full application router around an existing pipeline
pub fn build_router(rag_service: Arc<RagService>, config: &AppConfig, enable_cors: bool) -> Router {
    let state = AppState::new(rag_service, config);
    let api_router = routes::api_routes(state, config.server.csrf_token.clone());

    let mut app = Router::new()
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
pub async fn serve_api(config: &AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("🚀 Starting EventPulse API server...");

    let rag_service = Arc::new(RagService::new(config)?);
    let app = build_router(rag_service, config, enable_cors);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    if config.server.csrf_token.is_some() {
        info!("🔒 Chat endpoints require the X-CSRF-Token header");
    }
    info!("Available endpoints:");
    info!("  GET  /api/health              - Health check");
    info!("  POST /api/chat                - Talent recommendation");
    info!("  POST /api/sessions            - Create chat session");
    info!("  GET  /api/sessions/:id        - Session transcript");
    info!("  POST /api/sessions/:id/chat   - Chat within a session");

    axum::serve(listener, app).await?;

    Ok(())
}
