//! HTTP router construction.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::api;
use crate::state::AppState;

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);
    Router::new()
        .route("/", get(api::root))
        .route("/health", get(api::health))
        .route("/api/v1/heartbeat/{component_id}", post(api::receive_heartbeat))
        .route("/api/v1/status", get(api::all_statuses))
        .route("/api/v1/status/{component_id}", get(api::component_status))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            warn!(origin = %origin, "invalid CORS origin, allowing any origin");
            CorsLayer::permissive()
        }
    }
}
