//! [`FeedStore`] backed by the SQLite database.

use async_trait::async_trait;
use tracing::debug;

use super::repository::{FeedWindowRepository, SubscriptionRepository, VideoRepository};
use super::{FeedStore, FEED_WINDOW_KEY};
use crate::db::Database;
use crate::youtube::{Subscription, VideoItem};
use crate::Result;

/// Feed store over a [`Database`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FeedStore for SqliteStore {
    async fn subscriptions(&self) -> Result<Vec<Subscription>> {
        SubscriptionRepository::new(self.db.pool()).list().await
    }

    async fn upsert_subscriptions(&self, subscriptions: &[Subscription]) -> Result<u64> {
        let repo = SubscriptionRepository::new(self.db.pool());
        let mut inserted = 0;
        for subscription in subscriptions {
            if repo.insert_if_absent(subscription).await? {
                inserted += 1;
            }
        }
        debug!(
            "Recorded {} new of {} subscriptions",
            inserted,
            subscriptions.len()
        );
        Ok(inserted)
    }

    async fn last_video_ids(&self, channel_id: &str, limit: usize) -> Result<Vec<String>> {
        VideoRepository::new(self.db.pool())
            .last_ids_by_channel(channel_id, limit)
            .await
    }

    async fn insert_videos(&self, videos: &[VideoItem]) -> Result<u64> {
        let repo = VideoRepository::new(self.db.pool());
        let mut inserted = 0;
        for video in videos {
            if repo.insert_if_absent(video).await? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn videos_by_ids(&self, ids: &[String]) -> Result<Vec<VideoItem>> {
        VideoRepository::new(self.db.pool()).get_by_ids(ids).await
    }

    async fn load_window(&self) -> Result<Option<Vec<String>>> {
        FeedWindowRepository::new(self.db.pool())
            .load(FEED_WINDOW_KEY)
            .await
    }

    async fn save_window(&self, ids: &[String]) -> Result<()> {
        FeedWindowRepository::new(self.db.pool())
            .save(FEED_WINDOW_KEY, ids)
            .await
    }
}
