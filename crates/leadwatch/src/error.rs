//! Error types for leadwatch.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while fetching a source listing.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Listing endpoint answered with a non-success status
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// Listing body was not the expected JSON shape
    #[error("failed to decode listing: {0}")]
    Decode(#[from] serde_json::Error),

    /// Fetch did not complete within the per-source timeout
    #[error("timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),
}

/// Errors that can occur while persisting the seen set.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors that can occur when delivering leads to a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote end rejected the delivery
    #[error("delivery rejected with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Sink is not configured
    #[error("Sink not configured: {0}")]
    NotConfigured(String),

    /// Local output could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Email could not be built or sent
    #[error("email delivery failed: {0}")]
    Email(String),
}

/// Invalid configuration detected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No sources left after normalization
    #[error("no sources configured")]
    NoSources,

    /// No keyword group with at least one usable keyword
    #[error("no usable keyword groups configured")]
    NoKeywords,

    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file was not valid JSON for the expected shape
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A base URL did not parse
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}
