//! Configuration module for tubefeed.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, TubefeedError};

/// Video parts the typed schema understands.
pub const SUPPORTED_VIDEO_PARTS: &[&str] = &[
    "id",
    "snippet",
    "contentDetails",
    "player",
    "statistics",
    "status",
];

/// Placeholder substituted with the channel id in the feed URL template.
pub const CHANNEL_ID_PLACEHOLDER: &str = "{channel_id}";

/// Largest page or batch the remote API accepts.
pub const MAX_API_PAGE_SIZE: u32 = 50;

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/tubefeed.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty means console only.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/tubefeed.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Remote paginated API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct YoutubeConfig {
    /// Base URL of the data API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// API key, sent as the `key` query parameter.
    #[serde(default)]
    pub api_key: String,
    /// OAuth access token, sent as a bearer token.
    #[serde(default)]
    pub access_token: String,
    /// Results per page for list calls (1..=50).
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Video ids per `videos` request (1..=50).
    #[serde(default = "default_video_batch_size")]
    pub video_batch_size: usize,
    /// Parts requested for each video.
    #[serde(default = "default_video_parts")]
    pub video_parts: Vec<String>,
    /// Refresh the subscription list from the API on every cycle.
    #[serde(default = "default_sync_subscriptions")]
    pub sync_subscriptions: bool,
    /// Abort the cycle when fewer videos resolve than were requested.
    #[serde(default)]
    pub fail_on_count_mismatch: bool,
    /// Total request timeout in seconds.
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_page_size() -> u32 {
    MAX_API_PAGE_SIZE
}

fn default_video_batch_size() -> usize {
    MAX_API_PAGE_SIZE as usize
}

fn default_video_parts() -> Vec<String> {
    vec![
        "contentDetails".to_string(),
        "snippet".to_string(),
        "player".to_string(),
    ]
}

fn default_sync_subscriptions() -> bool {
    true
}

fn default_api_timeout() -> u64 {
    30
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_key: String::new(),
            access_token: String::new(),
            page_size: default_page_size(),
            video_batch_size: default_video_batch_size(),
            video_parts: default_video_parts(),
            sync_subscriptions: default_sync_subscriptions(),
            fail_on_count_mismatch: false,
            timeout_secs: default_api_timeout(),
        }
    }
}

/// Channel polling and feed window configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// URL template of the per-channel public feed.
    #[serde(default = "default_channel_feed_url")]
    pub channel_feed_url: String,
    /// Attempts per channel for connection failures.
    #[serde(default = "default_fetch_attempts")]
    pub fetch_attempts: u32,
    /// Delay between attempts in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_feed_timeout")]
    pub timeout_secs: u64,
    /// Number of most recent stored ids treated as known per channel.
    #[serde(default = "default_known_ids_limit")]
    pub known_ids_limit: usize,
    /// Capacity of the rolling feed window.
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,
    /// Maximum channel feeds fetched at once.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    /// Background refresh interval in seconds (0 = disabled).
    #[serde(default)]
    pub refresh_interval_secs: u64,
}

fn default_channel_feed_url() -> String {
    "https://www.youtube.com/feeds/videos.xml?channel_id={channel_id}".to_string()
}

fn default_fetch_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    500
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_feed_timeout() -> u64 {
    30
}

fn default_known_ids_limit() -> usize {
    20
}

fn default_window_capacity() -> usize {
    40
}

fn default_max_concurrent_fetches() -> usize {
    16
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            channel_feed_url: default_channel_feed_url(),
            fetch_attempts: default_fetch_attempts(),
            retry_delay_ms: default_retry_delay(),
            connect_timeout_secs: default_connect_timeout(),
            timeout_secs: default_feed_timeout(),
            known_ids_limit: default_known_ids_limit(),
            window_capacity: default_window_capacity(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            refresh_interval_secs: 0,
        }
    }
}

/// Header fields of the rendered feed.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_title")]
    pub title: String,
    #[serde(default = "default_output_author")]
    pub author: String,
    #[serde(default = "default_output_link")]
    pub self_link: String,
    #[serde(default = "default_output_link")]
    pub alternate_link: String,
}

fn default_output_title() -> String {
    "Subscriptions".to_string()
}

fn default_output_author() -> String {
    "tubefeed".to_string()
}

fn default_output_link() -> String {
    "http://localhost:8080/rss".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            title: default_output_title(),
            author: default_output_author(),
            self_link: default_output_link(),
            alternate_link: default_output_link(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Remote API configuration.
    #[serde(default)]
    pub youtube: YoutubeConfig,
    /// Channel polling configuration.
    #[serde(default)]
    pub feed: FeedConfig,
    /// Rendered feed header.
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(TubefeedError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| TubefeedError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `TUBEFEED_API_KEY`: API key for the data API
    /// - `TUBEFEED_ACCESS_TOKEN`: OAuth access token for the data API
    /// - `TUBEFEED_PORT`: HTTP port
    /// - `TUBEFEED_LOG_LEVEL`: log level
    /// - `TUBEFEED_DATABASE`: database path
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(api_key) = non_empty("TUBEFEED_API_KEY") {
            self.youtube.api_key = api_key;
        }
        if let Some(token) = non_empty("TUBEFEED_ACCESS_TOKEN") {
            self.youtube.access_token = token;
        }
        if let Some(port) = non_empty("TUBEFEED_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(level) = non_empty("TUBEFEED_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(path) = non_empty("TUBEFEED_DATABASE") {
            self.database.path = path;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let yt = &self.youtube;
        if yt.api_key.is_empty() && yt.access_token.is_empty() {
            return Err(TubefeedError::Config(
                "no API credentials: set youtube.api_key or youtube.access_token \
                 (or TUBEFEED_API_KEY / TUBEFEED_ACCESS_TOKEN)"
                    .to_string(),
            ));
        }
        if yt.sync_subscriptions && yt.access_token.is_empty() {
            return Err(TubefeedError::Config(
                "youtube.sync_subscriptions requires youtube.access_token".to_string(),
            ));
        }
        if !(1..=MAX_API_PAGE_SIZE).contains(&yt.page_size) {
            return Err(TubefeedError::Config(format!(
                "youtube.page_size must be between 1 and {MAX_API_PAGE_SIZE}"
            )));
        }
        if !(1..=MAX_API_PAGE_SIZE as usize).contains(&yt.video_batch_size) {
            return Err(TubefeedError::Config(format!(
                "youtube.video_batch_size must be between 1 and {MAX_API_PAGE_SIZE}"
            )));
        }
        if yt.video_parts.is_empty() {
            return Err(TubefeedError::Config(
                "youtube.video_parts must not be empty".to_string(),
            ));
        }
        if let Some(part) = yt
            .video_parts
            .iter()
            .find(|p| !SUPPORTED_VIDEO_PARTS.contains(&p.as_str()))
        {
            return Err(TubefeedError::Config(format!(
                "unsupported video part: {part}"
            )));
        }
        if !yt.video_parts.iter().any(|p| p == "snippet") {
            return Err(TubefeedError::Config(
                "youtube.video_parts must include snippet".to_string(),
            ));
        }

        let feed = &self.feed;
        if !feed.channel_feed_url.contains(CHANNEL_ID_PLACEHOLDER) {
            return Err(TubefeedError::Config(format!(
                "feed.channel_feed_url must contain {CHANNEL_ID_PLACEHOLDER}"
            )));
        }
        if feed.fetch_attempts == 0 {
            return Err(TubefeedError::Config(
                "feed.fetch_attempts must be at least 1".to_string(),
            ));
        }
        if feed.known_ids_limit == 0 {
            return Err(TubefeedError::Config(
                "feed.known_ids_limit must be at least 1".to_string(),
            ));
        }
        if feed.window_capacity == 0 {
            return Err(TubefeedError::Config(
                "feed.window_capacity must be at least 1".to_string(),
            ));
        }
        if feed.max_concurrent_fetches == 0 {
            return Err(TubefeedError::Config(
                "feed.max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
