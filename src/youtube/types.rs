//! Typed response schemas for the video data API.
//!
//! Every structure rejects fields it does not know about, so upstream shape
//! changes surface as validation errors instead of silently dropped data.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A resource type returned by a paginated list call.
pub trait ApiResource: DeserializeOwned + Send {
    /// Accepted `kind` tags of the list envelope.
    const LIST_KINDS: &'static [&'static str];

    /// Identity used to deduplicate items across pages.
    fn key(&self) -> &str;
}

/// Paging totals reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct PageInfo {
    pub results_per_page: u32,
    pub total_results: u32,
}

/// One page of a list response.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Page<T> {
    pub kind: String,
    pub etag: String,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub prev_page_token: Option<String>,
    #[serde(default)]
    pub region_code: Option<String>,
    pub page_info: PageInfo,
    pub items: Vec<T>,
}

/// Thumbnail image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Thumbnail set keyed by resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thumbnails {
    pub default: Thumbnail,
    pub medium: Thumbnail,
    pub high: Thumbnail,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxres: Option<Thumbnail>,
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionKind {
    #[serde(rename = "youtube#subscription")]
    Subscription,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelKind {
    #[serde(rename = "youtube#channel")]
    Channel,
}

/// The channel a subscription points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SubscriptionResource {
    pub kind: ChannelKind,
    pub channel_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SubscriptionSnippet {
    pub published_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub resource_id: SubscriptionResource,
    /// Channel of the subscriber, not the subscribed channel.
    pub channel_id: String,
    pub thumbnails: Thumbnails,
}

/// A channel subscription of the authorized user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Subscription {
    pub kind: SubscriptionKind,
    pub etag: String,
    pub id: String,
    pub snippet: SubscriptionSnippet,
}

impl Subscription {
    /// Id of the subscribed channel.
    pub fn channel_id(&self) -> &str {
        &self.snippet.resource_id.channel_id
    }

    pub fn title(&self) -> &str {
        &self.snippet.title
    }
}

impl ApiResource for Subscription {
    const LIST_KINDS: &'static [&'static str] = &[
        "youtube#SubscriptionListResponse",
        "youtube#subscriptionListResponse",
    ];

    fn key(&self) -> &str {
        self.channel_id()
    }
}

// ---------------------------------------------------------------------------
// Search results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchResultKind {
    #[serde(rename = "youtube#searchResult")]
    SearchResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    #[serde(rename = "youtube#video")]
    Video,
    #[serde(rename = "youtube#channel")]
    Channel,
    #[serde(rename = "youtube#playlist")]
    Playlist,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SearchResultId {
    pub kind: ResourceKind,
    pub video_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SearchResultSnippet {
    pub published_at: DateTime<Utc>,
    pub publish_time: DateTime<Utc>,
    pub channel_id: String,
    pub channel_title: String,
    pub title: String,
    pub description: String,
    pub thumbnails: Thumbnails,
    pub live_broadcast_content: String,
}

/// Video summary from a channel search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchResultVideo {
    pub kind: SearchResultKind,
    pub etag: String,
    pub id: SearchResultId,
    pub snippet: SearchResultSnippet,
}

impl SearchResultVideo {
    pub fn video_id(&self) -> &str {
        &self.id.video_id
    }
}

impl ApiResource for SearchResultVideo {
    const LIST_KINDS: &'static [&'static str] = &["youtube#searchListResponse"];

    fn key(&self) -> &str {
        self.video_id()
    }
}

// ---------------------------------------------------------------------------
// Videos
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoKind {
    #[serde(rename = "youtube#video")]
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Localized {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct VideoSnippet {
    pub published_at: DateTime<Utc>,
    pub channel_id: String,
    pub title: String,
    pub description: String,
    pub thumbnails: Thumbnails,
    pub channel_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub category_id: String,
    pub live_broadcast_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
    pub localized: Localized,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_audio_language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionRestriction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<Vec<String>>,
}

fn default_duration() -> String {
    "PT0H0M0S".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ContentDetails {
    /// ISO 8601 duration; absent for upcoming broadcasts.
    #[serde(default = "default_duration")]
    pub duration: String,
    pub dimension: String,
    pub definition: String,
    pub caption: String,
    pub licensed_content: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_restriction: Option<RegionRestriction>,
    /// Rating system name to rating; reason lists are arrays.
    pub content_rating: BTreeMap<String, serde_json::Value>,
    pub projection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_custom_thumbnail: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct VideoStatistics {
    pub view_count: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<String>,
    pub favorite_count: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct VideoPlayer {
    pub embed_html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct VideoStatus {
    pub upload_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub privacy_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_at: Option<DateTime<Utc>>,
    pub license: String,
    pub embeddable: bool,
    pub public_stats_viewable: bool,
    pub made_for_kids: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_declared_made_for_kids: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains_synthetic_media: Option<bool>,
}

/// Full video metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct VideoItem {
    pub kind: VideoKind,
    pub etag: String,
    pub id: String,
    pub snippet: VideoSnippet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_details: Option<ContentDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<VideoStatistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<VideoPlayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VideoStatus>,
}

impl VideoItem {
    pub fn channel_id(&self) -> &str {
        &self.snippet.channel_id
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.snippet.published_at
    }
}

impl ApiResource for VideoItem {
    const LIST_KINDS: &'static [&'static str] = &["youtube#videoListResponse"];

    fn key(&self) -> &str {
        &self.id
    }
}
