//! SQLite repositories for tubefeed documents.

use chrono::SecondsFormat;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::QueryBuilder;

use crate::db::DbPool;
use crate::youtube::{Subscription, VideoItem};
use crate::{Result, TubefeedError};

/// Maximum ids bound into a single `IN (...)` query.
const MAX_IDS_PER_QUERY: usize = 500;

fn encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| TubefeedError::Validation(format!("failed to encode document: {e}")))
}

fn decode<T: DeserializeOwned>(table: &str, document: &str) -> Result<T> {
    serde_json::from_str(document)
        .map_err(|e| TubefeedError::Validation(format!("corrupt document in {table}: {e}")))
}

/// Repository for subscription records.
pub struct SubscriptionRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> SubscriptionRepository<'a> {
    /// Create a new SubscriptionRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a subscription unless its channel is already recorded.
    ///
    /// Returns true if a row was inserted.
    pub async fn insert_if_absent(&self, subscription: &Subscription) -> Result<bool> {
        let document = encode(subscription)?;
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (channel_id, subscription_id, title, document)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT(channel_id) DO NOTHING
            "#,
        )
        .bind(subscription.channel_id())
        .bind(&subscription.id)
        .bind(subscription.title())
        .bind(document)
        .execute(self.pool)
        .await
        .map_err(|e| TubefeedError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// List all subscriptions ordered by title.
    pub async fn list(&self) -> Result<Vec<Subscription>> {
        let documents = sqlx::query_scalar::<_, String>(
            r#"
            SELECT document FROM subscriptions
            ORDER BY title COLLATE NOCASE ASC, channel_id ASC
            "#,
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| TubefeedError::Database(e.to_string()))?;

        documents
            .iter()
            .map(|doc| decode("subscriptions", doc))
            .collect()
    }

    /// Count recorded subscriptions.
    #[cfg(test)]
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions")
            .fetch_one(self.pool)
            .await
            .map_err(|e| TubefeedError::Database(e.to_string()))?;
        Ok(count)
    }
}

/// Repository for video records.
pub struct VideoRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> VideoRepository<'a> {
    /// Create a new VideoRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a video unless its id is already stored.
    ///
    /// Returns true if a row was inserted.
    pub async fn insert_if_absent(&self, video: &VideoItem) -> Result<bool> {
        let document = encode(video)?;
        let published_at = video
            .published_at()
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        let result = sqlx::query(
            r#"
            INSERT INTO videos (id, channel_id, published_at, document)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&video.id)
        .bind(video.channel_id())
        .bind(published_at)
        .bind(document)
        .execute(self.pool)
        .await
        .map_err(|e| TubefeedError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Get a video by id.
    #[cfg(test)]
    pub async fn get(&self, id: &str) -> Result<Option<VideoItem>> {
        let document =
            sqlx::query_scalar::<_, String>("SELECT document FROM videos WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await
                .map_err(|e| TubefeedError::Database(e.to_string()))?;

        document.map(|doc| decode("videos", &doc)).transpose()
    }

    /// Ids of the most recently published videos of a channel, newest first.
    pub async fn last_ids_by_channel(&self, channel_id: &str, limit: usize) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT id FROM videos
            WHERE channel_id = $1
            ORDER BY published_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(channel_id)
        .bind(limit as i64)
        .fetch_all(self.pool)
        .await
        .map_err(|e| TubefeedError::Database(e.to_string()))?;

        Ok(ids)
    }

    /// Get the stored videos among `ids`.
    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<VideoItem>> {
        let mut videos = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
            let mut query: QueryBuilder<sqlx::Sqlite> =
                QueryBuilder::new("SELECT document FROM videos WHERE id IN (");
            let mut separated = query.separated(", ");
            for id in chunk {
                separated.push_bind(id);
            }
            separated.push_unseparated(")");

            let documents = query
                .build_query_scalar::<String>()
                .fetch_all(self.pool)
                .await
                .map_err(|e| TubefeedError::Database(e.to_string()))?;

            for doc in &documents {
                videos.push(decode("videos", doc)?);
            }
        }

        Ok(videos)
    }

    /// Count stored videos.
    #[cfg(test)]
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos")
            .fetch_one(self.pool)
            .await
            .map_err(|e| TubefeedError::Database(e.to_string()))?;
        Ok(count)
    }
}

/// Repository for the persisted feed window.
pub struct FeedWindowRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FeedWindowRepository<'a> {
    /// Create a new FeedWindowRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Load the id sequence stored under `key`.
    pub async fn load(&self, key: &str) -> Result<Option<Vec<String>>> {
        let stored =
            sqlx::query_scalar::<_, String>("SELECT video_ids FROM feed_window WHERE id = $1")
                .bind(key)
                .fetch_optional(self.pool)
                .await
                .map_err(|e| TubefeedError::Database(e.to_string()))?;

        stored.map(|ids| decode("feed_window", &ids)).transpose()
    }

    /// Store the id sequence under `key`, replacing any previous value.
    pub async fn save(&self, key: &str, ids: &[String]) -> Result<()> {
        let encoded = encode(&ids)?;
        sqlx::query(
            r#"
            INSERT INTO feed_window (id, video_ids)
            VALUES ($1, $2)
            ON CONFLICT(id) DO UPDATE SET
                video_ids = excluded.video_ids,
                updated_at = datetime('now')
            "#,
        )
        .bind(key)
        .bind(encoded)
        .execute(self.pool)
        .await
        .map_err(|e| TubefeedError::Database(e.to_string()))?;

        Ok(())
    }
}
