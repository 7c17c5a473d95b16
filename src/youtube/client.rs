//! HTTP client for the video data API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::pagination::{PageRequest, PageSource};
use crate::config::YoutubeConfig;
use crate::{Result, TubefeedError};

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// User agent string for API calls.
const USER_AGENT: &str = concat!("tubefeed/", env!("CARGO_PKG_VERSION"));

/// Error reasons that mean the quota or rate limit is exhausted.
const QUOTA_REASONS: &[&str] = &[
    "quotaExceeded",
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "dailyLimitExceeded",
];

/// Google API error envelope.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: String,
}

/// Classify a non-success API response.
pub(crate) fn classify_error(resource: &str, status: u16, body: &str) -> TubefeedError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();

    let (message, reasons) = match envelope {
        Some(env) => (
            env.error.message,
            env.error
                .errors
                .into_iter()
                .map(|d| d.reason)
                .collect::<Vec<_>>(),
        ),
        None => (body.chars().take(200).collect(), Vec::new()),
    };

    if reasons.iter().any(|r| QUOTA_REASONS.contains(&r.as_str())) {
        return TubefeedError::Quota(format!("{resource}: {message}"));
    }

    let reason = if reasons.is_empty() {
        String::new()
    } else {
        format!(" ({})", reasons.join(", "))
    };
    TubefeedError::Api(format!("{resource}: HTTP {status}{reason}: {message}"))
}

/// [`PageSource`] over HTTPS.
pub struct YoutubeClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    access_token: Option<String>,
}

impl YoutubeClient {
    /// Create a client from configuration.
    pub fn new(config: &YoutubeConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TubefeedError::Api(format!("failed to create HTTP client: {}", e)))?;

        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: non_empty(&config.api_key),
            access_token: non_empty(&config.access_token),
        })
    }

    /// Build the full URL for a page request.
    pub fn endpoint(&self, request: &PageRequest) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, request.resource))
            .map_err(|e| TubefeedError::Config(format!("invalid API URL: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            for (key, value) in &request.params {
                query.append_pair(key, value);
            }
            if let Some(token) = &request.page_token {
                query.append_pair("pageToken", token);
            }
            if let Some(key) = &self.api_key {
                query.append_pair("key", key);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl PageSource for YoutubeClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<serde_json::Value> {
        let url = self.endpoint(request)?;
        debug!(
            "GET {} (page token: {:?})",
            request.resource, request.page_token
        );

        let mut builder = self.client.get(url);
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            TubefeedError::Api(format!("{}: request failed: {}", request.resource, e))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            TubefeedError::Api(format!("{}: failed to read response: {}", request.resource, e))
        })?;

        if !status.is_success() {
            return Err(classify_error(&request.resource, status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            TubefeedError::Validation(format!("{}: response is not JSON: {}", request.resource, e))
        })
    }
}
