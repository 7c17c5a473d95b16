//! Per-channel public feed polling.
//!
//! Each channel publishes a small Atom feed of its latest uploads. The poller
//! only extracts the video ids from it.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use feed_rs::parser;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::{FeedConfig, CHANNEL_ID_PLACEHOLDER};
use crate::error::RequestError;
use crate::{Result, TubefeedError};

/// Prefix of Atom entry ids in channel feeds.
pub const VIDEO_ID_PREFIX: &str = "yt:video:";

/// Maximum feed size in bytes (5MB).
const MAX_FEED_SIZE: u64 = 5 * 1024 * 1024;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// User agent string for feed fetching.
const USER_AGENT: &str = concat!("tubefeed/", env!("CARGO_PKG_VERSION"), " (feed poller)");

/// Source of the video ids currently listed in a channel's feed.
#[async_trait]
pub trait ChannelFeed: Send + Sync {
    /// Video ids in feed order, most recent first, without duplicates.
    ///
    /// Transport and feed-format failures are reported as
    /// [`TubefeedError::Request`].
    async fn fetch_video_ids(&self, channel_id: &str) -> Result<Vec<String>>;
}

/// Extract video ids from a channel feed document.
pub fn parse_video_ids(body: &[u8]) -> std::result::Result<Vec<String>, parser::ParseFeedError> {
    let feed = parser::parse(body)?;

    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(feed.entries.len());
    for entry in feed.entries {
        match entry.id.strip_prefix(VIDEO_ID_PREFIX) {
            Some(id) if !id.is_empty() => {
                if seen.insert(id.to_string()) {
                    ids.push(id.to_string());
                }
            }
            _ => debug!("Skipping feed entry without a video id: {}", entry.id),
        }
    }
    Ok(ids)
}

/// [`ChannelFeed`] that polls the public feed endpoint over HTTP.
pub struct ChannelFeedPoller {
    client: Client,
    url_template: String,
    attempts: u32,
    retry_delay: Duration,
}

impl ChannelFeedPoller {
    /// Create a poller from configuration.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TubefeedError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url_template: config.channel_feed_url.clone(),
            attempts: config.fetch_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// Feed URL of a channel.
    pub fn feed_url(&self, channel_id: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(channel_id.as_bytes()).collect();
        self.url_template.replace(CHANNEL_ID_PLACEHOLDER, &encoded)
    }

    /// GET `url`, retrying connection failures and timeouts.
    async fn get_with_retry(&self, url: &str) -> std::result::Result<Vec<u8>, RequestError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let error = match self.get_once(url).await {
                Ok(body) => return Ok(body),
                Err(GetError::Fatal(e)) => return Err(e),
                Err(GetError::Transient(e)) => e,
            };

            if attempt >= self.attempts {
                return Err(RequestError::Connection {
                    url: url.to_string(),
                    attempts: attempt,
                    source: Box::new(error),
                });
            }

            debug!(
                "Attempt {}/{} for {} failed: {}",
                attempt, self.attempts, url, error
            );
            tokio::time::sleep(self.retry_delay).await;
        }
    }

    async fn get_once(&self, url: &str) -> std::result::Result<Vec<u8>, GetError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if let Err(e) = response.error_for_status_ref() {
            return Err(GetError::Fatal(RequestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                source: Box::new(e),
            }));
        }

        if let Some(length) = response.content_length() {
            if length > MAX_FEED_SIZE {
                return Err(GetError::Fatal(too_large(url, length)));
            }
        }

        let body = response.bytes().await.map_err(|e| classify(url, e))?;
        if body.len() as u64 > MAX_FEED_SIZE {
            return Err(GetError::Fatal(too_large(url, body.len() as u64)));
        }
        Ok(body.to_vec())
    }
}

/// Outcome of a single failed attempt.
enum GetError {
    /// Worth another attempt.
    Transient(reqwest::Error),
    Fatal(RequestError),
}

fn classify(url: &str, error: reqwest::Error) -> GetError {
    if error.is_connect() || error.is_timeout() {
        GetError::Transient(error)
    } else {
        GetError::Fatal(RequestError::Connection {
            url: url.to_string(),
            attempts: 1,
            source: Box::new(error),
        })
    }
}

fn too_large(url: &str, size: u64) -> RequestError {
    RequestError::Malformed {
        url: url.to_string(),
        source: format!("feed too large: {} bytes (max {} bytes)", size, MAX_FEED_SIZE).into(),
    }
}

#[async_trait]
impl ChannelFeed for ChannelFeedPoller {
    async fn fetch_video_ids(&self, channel_id: &str) -> Result<Vec<String>> {
        let url = self.feed_url(channel_id);
        let body = self.get_with_retry(&url).await?;

        let ids = parse_video_ids(&body).map_err(|e| {
            warn!("Unparseable feed for channel {}: {}", channel_id, e);
            RequestError::Malformed {
                url: url.clone(),
                source: Box::new(e),
            }
        })?;

        debug!("Channel {} lists {} video(s)", channel_id, ids.len());
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::channel_feed_xml;

    fn config(url: &str) -> FeedConfig {
        FeedConfig {
            channel_feed_url: url.to_string(),
            fetch_attempts: 2,
            retry_delay_ms: 10,
            connect_timeout_secs: 2,
            timeout_secs: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_video_ids() {
        let xml = channel_feed_xml("UC1", &["a1", "b2", "c3"]);
        let ids = parse_video_ids(xml.as_bytes()).unwrap();
        assert_eq!(ids, vec!["a1", "b2", "c3"]);
    }

    #[test]
    fn test_parse_video_ids_dedups_in_order() {
        let xml = channel_feed_xml("UC1", &["a1", "b2", "a1"]);
        let ids = parse_video_ids(xml.as_bytes()).unwrap();
        assert_eq!(ids, vec!["a1", "b2"]);
    }

    #[test]
    fn test_parse_video_ids_empty_feed() {
        let xml = channel_feed_xml("UC1", &[]);
        assert!(parse_video_ids(xml.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_parse_video_ids_skips_foreign_entries() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <id>urn:test</id>
  <title>Mixed</title>
  <updated>2024-03-01T00:00:00Z</updated>
  <entry>
    <id>urn:uuid:1234</id>
    <title>Not a video</title>
    <updated>2024-03-01T00:00:00Z</updated>
  </entry>
  <entry>
    <id>yt:video:zz9</id>
    <title>Video</title>
    <updated>2024-03-01T00:00:00Z</updated>
  </entry>
</feed>"#;
        assert_eq!(parse_video_ids(xml.as_bytes()).unwrap(), vec!["zz9"]);
    }

    #[test]
    fn test_parse_invalid_feed() {
        assert!(parse_video_ids(b"<html><body>nope</body></html>").is_err());
        assert!(parse_video_ids(b"not xml at all").is_err());
    }

    #[test]
    fn test_feed_url() {
        let poller =
            ChannelFeedPoller::new(&config("https://feeds.test/videos.xml?channel_id={channel_id}"))
                .unwrap();
        assert_eq!(
            poller.feed_url("UC-abc_1"),
            "https://feeds.test/videos.xml?channel_id=UC-abc_1"
        );
        assert_eq!(
            poller.feed_url("a b&c"),
            "https://feeds.test/videos.xml?channel_id=a+b%26c"
        );
    }

    #[tokio::test]
    async fn test_connection_refused_exhausts_retries() {
        // Grab a free port and release it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let poller = ChannelFeedPoller::new(&config(&format!(
            "http://127.0.0.1:{port}/feed?channel_id={{channel_id}}"
        )))
        .unwrap();

        let err = poller.fetch_video_ids("UC1").await.unwrap_err();
        match err {
            TubefeedError::Request(RequestError::Connection { attempts, url, .. }) => {
                assert_eq!(attempts, 2);
                assert!(url.ends_with("channel_id=UC1"));
            }
            other => panic!("expected connection error, got {other:?}"),
        }
    }
}
