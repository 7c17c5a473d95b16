//! Feed cycle: detect, resolve, persist and render new videos.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use super::diff::DiffEngine;
use super::poller::ChannelFeed;
use super::render::FeedRenderer;
use super::window::RollingFeedWindow;
use crate::config::Config;
use crate::store::FeedStore;
use crate::youtube::{VideoItem, YoutubeApi};
use crate::Result;

/// Tunables of a feed cycle.
#[derive(Debug, Clone)]
pub struct CycleOptions {
    pub known_ids_limit: usize,
    pub window_capacity: usize,
    pub max_concurrent_fetches: usize,
    pub sync_subscriptions: bool,
}

impl CycleOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            known_ids_limit: config.feed.known_ids_limit,
            window_capacity: config.feed.window_capacity,
            max_concurrent_fetches: config.feed.max_concurrent_fetches,
            sync_subscriptions: config.youtube.sync_subscriptions,
        }
    }
}

impl Default for CycleOptions {
    fn default() -> Self {
        Self {
            known_ids_limit: 20,
            window_capacity: 40,
            max_concurrent_fetches: 16,
            sync_subscriptions: true,
        }
    }
}

/// Summary of one refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Subscriptions recorded for the first time.
    pub subscriptions_added: u64,
    /// Channels diffed.
    pub channels: usize,
    /// Channels whose feed could not be fetched.
    pub failed_channels: Vec<String>,
    /// Ids reported new by the diff.
    pub new_ids: usize,
    /// Videos resolved through the API.
    pub resolved: usize,
    /// Videos stored for the first time.
    pub inserted: u64,
    /// Ids appended to the window.
    pub appended: Vec<String>,
    /// Window length after the update.
    pub window_len: usize,
}

/// Runs feed cycles against injected collaborators.
///
/// Cycles are serialized, so the window load, append and persist steps never
/// interleave between concurrent requests.
pub struct FeedService {
    store: Arc<dyn FeedStore>,
    api: Arc<YoutubeApi>,
    diff: DiffEngine,
    renderer: Arc<dyn FeedRenderer>,
    options: CycleOptions,
    cycle: Mutex<()>,
}

impl FeedService {
    pub fn new(
        store: Arc<dyn FeedStore>,
        api: Arc<YoutubeApi>,
        feed: Arc<dyn ChannelFeed>,
        renderer: Arc<dyn FeedRenderer>,
        options: CycleOptions,
    ) -> Self {
        let diff = DiffEngine::new(
            feed,
            store.clone(),
            options.known_ids_limit,
            options.max_concurrent_fetches,
        );
        Self {
            store,
            api,
            diff,
            renderer,
            options,
            cycle: Mutex::new(()),
        }
    }

    /// MIME type of the rendered feed.
    pub fn content_type(&self) -> &'static str {
        self.renderer.content_type()
    }

    /// Run one refresh: sync, diff, resolve, store and update the window.
    pub async fn refresh(&self) -> Result<CycleReport> {
        let _guard = self.cycle.lock().await;
        self.refresh_locked().await
    }

    /// Render the persisted window.
    pub async fn render(&self) -> Result<Vec<u8>> {
        let _guard = self.cycle.lock().await;
        self.render_locked().await
    }

    /// Refresh, then render the updated window.
    pub async fn generate_feed(&self) -> Result<Vec<u8>> {
        let _guard = self.cycle.lock().await;
        self.refresh_locked().await?;
        self.render_locked().await
    }

    async fn refresh_locked(&self) -> Result<CycleReport> {
        let mut report = CycleReport::default();

        if self.options.sync_subscriptions {
            let remote = self.api.subscriptions().await?;
            report.subscriptions_added = self.store.upsert_subscriptions(&remote).await?;
        }

        let channels: Vec<String> = self
            .store
            .subscriptions()
            .await?
            .iter()
            .map(|s| s.channel_id().to_string())
            .collect();

        let outcome = self.diff.diff(&channels).await?;
        report.channels = outcome.channels;
        report.new_ids = outcome.new_ids.len();
        report.failed_channels = outcome
            .failures
            .iter()
            .map(|f| f.channel_id.clone())
            .collect();

        let mut videos = if outcome.new_ids.is_empty() {
            Vec::new()
        } else {
            self.api.video_info(&outcome.new_ids).await?
        };
        report.resolved = videos.len();
        report.inserted = self.store.insert_videos(&videos).await?;

        // Oldest first so the newest video ends up at the tail
        videos.sort_by(|a, b| {
            a.published_at()
                .cmp(&b.published_at())
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut window =
            RollingFeedWindow::load(self.store.as_ref(), self.options.window_capacity).await?;
        let before: Vec<String> = window.ids();
        window.append(videos.iter().map(|v| v.id.clone()));
        report.appended = videos
            .iter()
            .filter(|v| window.contains(&v.id) && !before.contains(&v.id))
            .map(|v| v.id.clone())
            .collect();
        window.persist(self.store.as_ref()).await?;
        report.window_len = window.len();

        info!(
            "Feed cycle: {} channel(s), {} failed, {} new id(s), {} resolved, {} stored, window {}/{}",
            report.channels,
            report.failed_channels.len(),
            report.new_ids,
            report.resolved,
            report.inserted,
            report.window_len,
            window.capacity()
        );
        Ok(report)
    }

    async fn render_locked(&self) -> Result<Vec<u8>> {
        let window =
            RollingFeedWindow::load(self.store.as_ref(), self.options.window_capacity).await?;
        let ids = window.ids();

        let mut by_id: HashMap<String, VideoItem> = self
            .store
            .videos_by_ids(&ids)
            .await?
            .into_iter()
            .map(|v| (v.id.clone(), v))
            .collect();

        let mut ordered = Vec::with_capacity(ids.len());
        for id in &ids {
            match by_id.remove(id) {
                Some(video) => ordered.push(video),
                None => warn!("Window id {} has no stored video, skipping", id),
            }
        }

        self.renderer.render(&ordered)
    }
}
