//! Test doubles and sample documents.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::error::RequestError;
use crate::feed::ChannelFeed;
use crate::youtube::{PageRequest, PageSource, Subscription, VideoItem};
use crate::{Result, TubefeedError};

/// A `videos` item with every part the default configuration requests.
pub fn video_json(id: &str, channel_id: &str, published_at: &str) -> Value {
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
            "tags": ["sample"],
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
            "embedHtml": format!("<iframe width=\"480\" height=\"270\" src=\"//www.youtube.com/embed/{id}\"></iframe>")
        }
    })
}

pub fn video_item(id: &str, channel_id: &str, published_at: &str) -> VideoItem {
    serde_json::from_value(video_json(id, channel_id, published_at)).unwrap()
}

/// A `subscriptions` item pointing at `channel_id`.
pub fn subscription_json(channel_id: &str, title: &str) -> Value {
    json!({
        "kind": "youtube#subscription",
        "etag": format!("etag-{channel_id}"),
        "id": format!("sub-{channel_id}"),
        "snippet": {
            "publishedAt": "2023-05-01T08:30:00.123Z",
            "title": title,
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

pub fn subscription(channel_id: &str, title: &str) -> Subscription {
    serde_json::from_value(subscription_json(channel_id, title)).unwrap()
}

/// A public channel feed listing `video_ids`, most recent first.
pub fn channel_feed_xml(channel_id: &str, video_ids: &[&str]) -> String {
    let entries: String = video_ids
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
  <link rel="self" href="http://www.youtube.com/feeds/videos.xml?channel_id={channel_id}"/>
  <id>yt:channel:{channel_id}</id>
  <yt:channelId>{channel_id}</yt:channelId>
  <title>Channel {channel_id}</title>
  <published>2020-01-01T00:00:00+00:00</published>{entries}
</feed>"#
    )
}

type Responder = Box<dyn Fn(&PageRequest) -> Result<Value> + Send + Sync>;

/// [`PageSource`] answering from a closure and recording every request.
pub struct MockPageSource {
    responder: Responder,
    requests: Mutex<Vec<PageRequest>>,
}

impl MockPageSource {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&PageRequest) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer successive requests with `pages`, in order.
    pub fn scripted(pages: Vec<Result<Value>>) -> Self {
        let pages = Mutex::new(VecDeque::from(pages));
        Self::new(move |_| {
            pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TubefeedError::Api("no more scripted pages".to_string())))
        })
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for MockPageSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(request)
    }
}

/// Fake data API.
///
/// `subscriptions` lists `subscribed`; `videos` echoes the requested ids as
/// videos of `channel_id`, dating the first id newest and each following one
/// an hour earlier.
pub fn api_responder(
    channel_id: &'static str,
    subscribed: &'static [&'static str],
) -> MockPageSource {
    let newest: DateTime<Utc> = "2024-03-01T12:00:00Z".parse().unwrap();

    MockPageSource::new(move |request| match request.resource.as_str() {
        "subscriptions" => {
            let items: Vec<Value> = subscribed
                .iter()
                .map(|c| subscription_json(c, &format!("Channel {c}")))
                .collect();
            let count = items.len();
            Ok(json!({
                "kind": "youtube#SubscriptionListResponse",
                "etag": "subs",
                "pageInfo": {"resultsPerPage": 50, "totalResults": count},
                "items": items
            }))
        }
        "videos" => {
            let items: Vec<Value> = request
                .param_value("id")
                .unwrap_or_default()
                .split(',')
                .filter(|id| !id.is_empty())
                .enumerate()
                .map(|(i, id)| {
                    let published = (newest - Duration::hours(i as i64))
                        .to_rfc3339_opts(SecondsFormat::Secs, true);
                    video_json(id, channel_id, &published)
                })
                .collect();
            let count = items.len();
            Ok(json!({
                "kind": "youtube#videoListResponse",
                "etag": "videos",
                "pageInfo": {"resultsPerPage": count, "totalResults": count},
                "items": items
            }))
        }
        other => Err(TubefeedError::Api(format!("unexpected resource {other}"))),
    })
}

type ErrorFactory = Box<dyn Fn() -> TubefeedError + Send + Sync>;

enum FeedScript {
    Ids(Vec<String>, std::time::Duration),
    Fail(ErrorFactory),
}

/// [`ChannelFeed`] with canned answers per channel.
///
/// Unknown channels answer with HTTP 404.
#[derive(Default)]
pub struct MockChannelFeed {
    scripts: HashMap<String, FeedScript>,
    calls: Mutex<Vec<String>>,
    finished: Mutex<Vec<String>>,
}

impl MockChannelFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids(self, channel_id: &str, ids: &[&str]) -> Self {
        self.with_delayed_ids(channel_id, ids, std::time::Duration::ZERO)
    }

    /// Answer `channel_id` with `ids` after sleeping for `delay`.
    pub fn with_delayed_ids(
        mut self,
        channel_id: &str,
        ids: &[&str],
        delay: std::time::Duration,
    ) -> Self {
        self.scripts.insert(
            channel_id.to_string(),
            FeedScript::Ids(ids.iter().map(|s| s.to_string()).collect(), delay),
        );
        self
    }

    pub fn with_error<F>(mut self, channel_id: &str, error: F) -> Self
    where
        F: Fn() -> TubefeedError + Send + Sync + 'static,
    {
        self.scripts
            .insert(channel_id.to_string(), FeedScript::Fail(Box::new(error)));
        self
    }

    /// Fail `channel_id` the way an unreachable host does.
    pub fn with_connection_error(self, channel_id: &str) -> Self {
        let url = format!("http://feeds.test/videos.xml?channel_id={channel_id}");
        self.with_error(channel_id, move || {
            RequestError::Connection {
                url: url.clone(),
                attempts: 3,
                source: "connection refused".into(),
            }
            .into()
        })
    }

    /// Channels polled so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Channels whose fetch has completed, in completion order.
    pub fn finished(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelFeed for MockChannelFeed {
    async fn fetch_video_ids(&self, channel_id: &str) -> Result<Vec<String>> {
        self.calls.lock().unwrap().push(channel_id.to_string());
        let result = match self.scripts.get(channel_id) {
            Some(FeedScript::Ids(ids, delay)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                Ok(ids.clone())
            }
            Some(FeedScript::Fail(error)) => Err(error()),
            None => Err(RequestError::Status {
                url: format!("http://feeds.test/videos.xml?channel_id={channel_id}"),
                status: 404,
                source: "not found".into(),
            }
            .into()),
        };
        self.finished.lock().unwrap().push(channel_id.to_string());
        result
    }
}
