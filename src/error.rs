//! Error types for tubefeed.

use thiserror::Error;

/// Boxed underlying cause carried by [`RequestError`].
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure while fetching a single channel's public feed.
///
/// This is the only error class the diff engine absorbs per channel.
#[derive(Error, Debug)]
pub enum RequestError {
    /// The feed endpoint answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        url: String,
        status: u16,
        #[source]
        source: Cause,
    },

    /// Connection or timeout failure after the retry budget ran out.
    #[error("connection to {url} failed after {attempts} attempt(s)")]
    Connection {
        url: String,
        attempts: u32,
        #[source]
        source: Cause,
    },

    /// The endpoint answered but the body is not a parseable feed.
    #[error("malformed feed from {url}")]
    Malformed {
        url: String,
        #[source]
        source: Cause,
    },
}

/// Common error type for tubefeed.
#[derive(Error, Debug)]
pub enum TubefeedError {
    /// Database error.
    ///
    /// Errors from sqlx are converted automatically.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Data did not match the expected schema.
    #[error("validation error: {0}")]
    Validation(String),

    /// Channel feed request failed.
    #[error("request error: {0}")]
    Request(#[from] RequestError),

    /// Remote API call failed.
    #[error("API error: {0}")]
    Api(String),

    /// Remote API quota exhausted.
    #[error("API quota exceeded: {0}")]
    Quota(String),

    /// Resolved video count differs from the requested count.
    #[error("resolved {resolved} of {requested} requested videos")]
    CountMismatch { requested: usize, resolved: usize },

    /// Feed rendering error.
    #[error("render error: {0}")]
    Render(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for TubefeedError {
    fn from(e: sqlx::Error) -> Self {
        TubefeedError::Database(e.to_string())
    }
}

/// Result type alias for tubefeed operations.
pub type Result<T> = std::result::Result<T, TubefeedError>;
