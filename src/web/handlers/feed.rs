//! Feed handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use super::AppState;
use crate::web::error::ApiError;

/// GET /rss - Run a feed cycle and return the rendered feed.
pub async fn get_rss(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let body = state.service.generate_feed().await?;
    Ok(([(header::CONTENT_TYPE, state.service.content_type())], body).into_response())
}

/// GET /health - Liveness check.
pub async fn health_check() -> &'static str {
    "OK"
}
