//! HTTP handlers.

mod feed;

use std::sync::Arc;

use crate::feed::FeedService;

pub use feed::{get_rss, health_check};

/// Shared application state.
pub struct AppState {
    pub service: Arc<FeedService>,
}

impl AppState {
    pub fn new(service: Arc<FeedService>) -> Self {
        Self { service }
    }
}
