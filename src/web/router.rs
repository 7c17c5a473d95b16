//! Router configuration for the HTTP surface.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{get_rss, health_check, AppState};

/// Create the main router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/rss", get(get_rss))
        .with_state(app_state)
        .merge(create_health_router())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}
