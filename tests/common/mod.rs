//! Test helpers for integration tests.
//!
//! Provides a stub upstream that serves channel feeds and the data API, plus
//! helpers to wire a feed service against it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use tubefeed::config::Config;
use tubefeed::feed::{AtomRenderer, ChannelFeedPoller, CycleOptions, FeedService};
use tubefeed::store::SqliteStore;
use tubefeed::youtube::{YoutubeApi, YoutubeClient};
use tubefeed::Database;

/// API key the stub accepts.
pub const API_KEY: &str = "test-key";

#[derive(Clone)]
enum FeedReply {
    Ids(Vec<String>),
    Status(u16),
}

#[derive(Default)]
struct Upstream {
    feeds: HashMap<String, FeedReply>,
    subscriptions: Vec<String>,
    /// Video id to (channel id, publish time).
    videos: HashMap<String, (String, String)>,
    quota_exhausted: bool,
    corrupt_videos: bool,
    feed_requests: Vec<String>,
    video_requests: Vec<String>,
}

type Shared = Arc<Mutex<Upstream>>;

/// Stub upstream bound to a random local port.
pub struct StubServer {
    pub addr: SocketAddr,
    state: Shared,
}

impl StubServer {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(Upstream::default()));
        let app = Router::new()
            .route("/feeds/videos.xml", get(channel_feed))
            .route("/youtube/v3/subscriptions", get(subscriptions))
            .route("/youtube/v3/videos", get(videos))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Serve `ids` (most recent first) as the feed of `channel_id`.
    pub fn set_feed(&self, channel_id: &str, ids: &[&str]) {
        let ids = ids.iter().map(|s| s.to_string()).collect();
        self.state
            .lock()
            .unwrap()
            .feeds
            .insert(channel_id.to_string(), FeedReply::Ids(ids));
    }

    /// Answer the feed of `channel_id` with `status`.
    pub fn fail_feed(&self, channel_id: &str, status: u16) {
        self.state
            .lock()
            .unwrap()
            .feeds
            .insert(channel_id.to_string(), FeedReply::Status(status));
    }

    pub fn subscribe(&self, channel_id: &str) {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .push(channel_id.to_string());
    }

    pub fn add_video(&self, id: &str, channel_id: &str, published_at: &str) {
        self.state.lock().unwrap().videos.insert(
            id.to_string(),
            (channel_id.to_string(), published_at.to_string()),
        );
    }

    /// Make every `videos` call fail with a quota error.
    pub fn exhaust_quota(&self) {
        self.state.lock().unwrap().quota_exhausted = true;
    }

    /// Make every `videos` call answer with a mislabeled list.
    pub fn corrupt_videos(&self) {
        self.state.lock().unwrap().corrupt_videos = true;
    }

    /// Channels whose feed was requested, in arrival order.
    pub fn feed_requests(&self) -> Vec<String> {
        self.state.lock().unwrap().feed_requests.clone()
    }

    /// `id` parameters of every `videos` call.
    pub fn video_requests(&self) -> Vec<String> {
        self.state.lock().unwrap().video_requests.clone()
    }

    /// Configuration pointing both upstreams at this stub.
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.youtube.api_base_url = format!("http://{}/youtube/v3", self.addr);
        config.youtube.api_key = API_KEY.to_string();
        config.youtube.timeout_secs = 5;
        config.feed.channel_feed_url =
            format!("http://{}/feeds/videos.xml?channel_id={{channel_id}}", self.addr);
        config.feed.fetch_attempts = 2;
        config.feed.retry_delay_ms = 10;
        config.feed.timeout_secs = 5;
        config
    }
}

/// Wire a feed service the way the binary does.
pub fn build_service(config: &Config, db: Database) -> (Arc<SqliteStore>, Arc<FeedService>) {
    let store = Arc::new(SqliteStore::new(db));
    let client = Arc::new(YoutubeClient::new(&config.youtube).unwrap());
    let api = Arc::new(YoutubeApi::from_config(client, &config.youtube));
    let poller = Arc::new(ChannelFeedPoller::new(&config.feed).unwrap());
    let renderer = Arc::new(AtomRenderer::new(&config.output));

    let service = Arc::new(FeedService::new(
        store.clone(),
        api,
        poller,
        renderer,
        CycleOptions::from_config(config),
    ));
    (store, service)
}

/// Video ids of a rendered feed, in document order.
pub fn rendered_ids(document: &[u8]) -> Vec<String> {
    tubefeed::feed::parse_video_ids(document).unwrap()
}

async fn channel_feed(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let channel_id = query.get("channel_id").cloned().unwrap_or_default();
    let reply = {
        let mut upstream = state.lock().unwrap();
        upstream.feed_requests.push(channel_id.clone());
        upstream.feeds.get(&channel_id).cloned()
    };

    match reply {
        Some(FeedReply::Ids(ids)) => (
            [(header::CONTENT_TYPE, "text/xml; charset=UTF-8")],
            feed_xml(&channel_id, &ids),
        )
            .into_response(),
        Some(FeedReply::Status(status)) => StatusCode::from_u16(status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn subscriptions(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Some(rejected) = check_key(&query) {
        return rejected;
    }
    let channels = state.lock().unwrap().subscriptions.clone();
    let items: Vec<Value> = channels.iter().map(|c| subscription_json(c)).collect();
    let count = items.len();
    Json(json!({
        "kind": "youtube#SubscriptionListResponse",
        "etag": "subs",
        "pageInfo": {"resultsPerPage": 50, "totalResults": count},
        "items": items
    }))
    .into_response()
}

async fn videos(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Some(rejected) = check_key(&query) {
        return rejected;
    }
    let ids = query.get("id").cloned().unwrap_or_default();
    let upstream = {
        let mut upstream = state.lock().unwrap();
        upstream.video_requests.push(ids.clone());
        (
            upstream.quota_exhausted,
            upstream.corrupt_videos,
            upstream.videos.clone(),
        )
    };
    let (quota_exhausted, corrupt, known) = upstream;

    if quota_exhausted {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": {
                    "code": 403,
                    "message": "The request cannot be completed because you have exceeded your quota.",
                    "errors": [{"domain": "youtube.quota", "reason": "quotaExceeded"}]
                }
            })),
        )
            .into_response();
    }

    let items: Vec<Value> = ids
        .split(',')
        .filter_map(|id| {
            known
                .get(id)
                .map(|(channel, published)| video_json(id, channel, published))
        })
        .collect();
    let count = items.len();
    let kind = if corrupt {
        "youtube#searchListResponse"
    } else {
        "youtube#videoListResponse"
    };
    Json(json!({
        "kind": kind,
        "etag": "videos",
        "pageInfo": {"resultsPerPage": count, "totalResults": count},
        "items": items
    }))
    .into_response()
}

fn check_key(query: &HashMap<String, String>) -> Option<Response> {
    if query.get("key").map(String::as_str) == Some(API_KEY) {
        return None;
    }
    Some(
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid.",
                    "errors": [{"domain": "global", "reason": "badRequest"}]
                }
            })),
        )
            .into_response(),
    )
}

fn feed_xml(channel_id: &str, ids: &[String]) -> String {
    let entries: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"
  <entry>
    <id>yt:video:{id}</id>
    <yt:videoId>{id}</yt:videoId>
    <yt:channelId>{channel_id}</yt:channelId>
    <title>Video {id}</title>
    <link rel="alternate" href="https://www.youtube.com/watch?v={id}"/>
    <published>2024-03-01T10:00:00+00:00</published>
    <updated>2024-03-01T10:00:00+00:00</updated>
  </entry>"#
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns:media="http://search.yahoo.com/mrss/" xmlns="http://www.w3.org/2005/Atom">
  <id>yt:channel:{channel_id}</id>
  <title>Channel {channel_id}</title>{entries}
</feed>"#
    )
}

fn subscription_json(channel_id: &str) -> Value {
    json!({
        "kind": "youtube#subscription",
        "etag": format!("etag-{channel_id}"),
        "id": format!("sub-{channel_id}"),
        "snippet": {
            "publishedAt": "2023-05-01T08:30:00Z",
            "title": format!("Channel {channel_id}"),
            "description": "",
            "resourceId": {"kind": "youtube#channel", "channelId": channel_id},
            "channelId": "UCsubscriber",
            "thumbnails": {
                "default": {"url": "https://yt3.ggpht.com/default.jpg"},
                "medium": {"url": "https://yt3.ggpht.com/medium.jpg"},
                "high": {"url": "https://yt3.ggpht.com/high.jpg"}
            }
        }
    })
}

fn video_json(id: &str, channel_id: &str, published_at: &str) -> Value {
    json!({
        "kind": "youtube#video",
        "etag": format!("etag-{id}"),
        "id": id,
        "snippet": {
            "publishedAt": published_at,
            "channelId": channel_id,
            "title": format!("Video {id}"),
            "description": format!("Description of {id}"),
            "thumbnails": {
                "default": {"url": format!("https://i.ytimg.com/vi/{id}/default.jpg"), "width": 120, "height": 90},
                "medium": {"url": format!("https://i.ytimg.com/vi/{id}/mqdefault.jpg"), "width": 320, "height": 180},
                "high": {"url": format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg"), "width": 480, "height": 360}
            },
            "channelTitle": format!("Channel {channel_id}"),
            "categoryId": "22",
            "liveBroadcastContent": "none",
            "localized": {
                "title": format!("Video {id}"),
                "description": format!("Description of {id}")
            }
        },
        "contentDetails": {
            "duration": "PT4M13S",
            "dimension": "2d",
            "definition": "hd",
            "caption": "false",
            "licensedContent": true,
            "contentRating": {},
            "projection": "rectangular"
        },
        "player": {
            "embedHtml": format!("<iframe src=\"//www.youtube.com/embed/{id}\"></iframe>")
        }
    })
}
