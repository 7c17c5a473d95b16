//! Database schema and migrations for tubefeed.
//!
//! Migrations are applied in order; `schema_version` records which ones ran.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: subscriptions, videos and the feed window
    r#"
-- One row per subscribed channel; never overwritten once recorded
CREATE TABLE subscriptions (
    channel_id      TEXT PRIMARY KEY,
    subscription_id TEXT NOT NULL,
    title           TEXT NOT NULL,
    document        TEXT NOT NULL,           -- validated JSON
    created_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Full video metadata, keyed by video id
CREATE TABLE videos (
    id              TEXT PRIMARY KEY,
    channel_id      TEXT NOT NULL,
    published_at    TEXT NOT NULL,           -- RFC 3339, UTC, second precision
    document        TEXT NOT NULL,           -- validated JSON
    created_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_videos_channel_published ON videos(channel_id, published_at DESC);

-- Singleton rolling window of emitted video ids
CREATE TABLE feed_window (
    id              TEXT PRIMARY KEY,
    video_ids       TEXT NOT NULL,           -- JSON array, oldest first
    updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
];
