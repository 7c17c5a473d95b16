//! Persistent storage for subscriptions, videos and the feed window.
//!
//! The feed pipeline only talks to [`FeedStore`]; [`SqliteStore`] is the
//! implementation backed by the crate's SQLite database.

mod repository;
mod sqlite;

pub use repository::{FeedWindowRepository, SubscriptionRepository, VideoRepository};
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::youtube::{Subscription, VideoItem};
use crate::Result;

/// Document key of the singleton feed window.
pub const FEED_WINDOW_KEY: &str = "rss_field";

/// Storage operations needed by a feed cycle.
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// All recorded subscriptions, ordered by channel title.
    async fn subscriptions(&self) -> Result<Vec<Subscription>>;

    /// Record subscriptions whose channel is not yet known.
    ///
    /// Existing records are never overwritten. Returns the number inserted.
    async fn upsert_subscriptions(&self, subscriptions: &[Subscription]) -> Result<u64>;

    /// The `limit` most recently published video ids of a channel, newest first.
    async fn last_video_ids(&self, channel_id: &str, limit: usize) -> Result<Vec<String>>;

    /// Insert videos whose id is not yet stored. Returns the number inserted.
    async fn insert_videos(&self, videos: &[VideoItem]) -> Result<u64>;

    /// Stored videos for the given ids, in no particular order.
    ///
    /// Ids with no stored video are skipped.
    async fn videos_by_ids(&self, ids: &[String]) -> Result<Vec<VideoItem>>;

    /// The persisted feed window, oldest id first, or `None` if never saved.
    async fn load_window(&self) -> Result<Option<Vec<String>>>;

    /// Overwrite the persisted feed window.
    async fn save_window(&self, ids: &[String]) -> Result<()>;
}
