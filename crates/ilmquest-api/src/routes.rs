//! Router setup with all API routes and middleware.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use ilmquest_core::config::ServerConfig;
use ilmquest_core::IlmquestError;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server);
    let body_limit = state.config.server.max_body_bytes;

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/chat", post(handlers::chat))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS: the configured origin list, or any origin when the list is empty.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if server.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

/// Start the HTTP server on the configured address.
pub async fn start_server(state: AppState) -> Result<(), IlmquestError> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| IlmquestError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(addr = %addr, "API server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| IlmquestError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
