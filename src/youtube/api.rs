//! High-level data API operations.

use std::sync::Arc;

use tracing::info;

use super::pagination::{fetch_all, PageRequest, PageSource};
use super::resolver::VideoInfoResolver;
use super::types::{SearchResultVideo, Subscription, VideoItem};
use crate::config::YoutubeConfig;
use crate::Result;

/// Data API calls used by a feed cycle.
pub struct YoutubeApi {
    source: Arc<dyn PageSource>,
    page_size: u32,
    resolver: VideoInfoResolver,
}

impl YoutubeApi {
    pub fn new(source: Arc<dyn PageSource>, page_size: u32, resolver: VideoInfoResolver) -> Self {
        Self {
            source,
            page_size,
            resolver,
        }
    }

    pub fn from_config(source: Arc<dyn PageSource>, config: &YoutubeConfig) -> Self {
        Self::new(
            source,
            config.page_size,
            VideoInfoResolver::from_config(config),
        )
    }

    /// Subscriptions of the authorized user, alphabetically.
    pub async fn subscriptions(&self) -> Result<Vec<Subscription>> {
        let request = PageRequest::new("subscriptions")
            .param("part", "snippet")
            .param("mine", "true")
            .param("order", "alphabetical")
            .param("maxResults", self.page_size);

        let subscriptions: Vec<Subscription> = fetch_all(self.source.as_ref(), request).await?;
        info!("Fetched {} subscriptions", subscriptions.len());
        Ok(subscriptions)
    }

    /// Videos of a channel via search, newest first.
    ///
    /// Search costs 100 quota units per page; the feed cycle itself relies on
    /// the public channel feed instead.
    pub async fn search_channel_videos(&self, channel_id: &str) -> Result<Vec<SearchResultVideo>> {
        let request = PageRequest::new("search")
            .param("part", "snippet")
            .param("channelId", channel_id)
            .param("type", "video")
            .param("order", "date")
            .param("maxResults", self.page_size);

        fetch_all(self.source.as_ref(), request).await
    }

    /// Full metadata for `ids`, fetched in batches.
    pub async fn video_info(&self, ids: &[String]) -> Result<Vec<VideoItem>> {
        self.resolver.resolve(self.source.as_ref(), ids).await
    }
}
