//! Source listings.
//!
//! A source is one monitored listing identified by name (a subreddit).
//! [`PostSource`] is the seam the scanner fetches through; [`RedditListing`]
//! is the public-JSON implementation.

mod reddit;
mod types;

pub use reddit::{RedditListing, DEFAULT_BASE_URL, DEFAULT_LIMIT, DEFAULT_USER_AGENT};
pub use types::{Lead, PostRecord};

use async_trait::async_trait;
use url::Url;

use crate::error::FetchError;

/// Base that post permalinks are resolved against when building leads.
pub const DEFAULT_LINK_BASE: &str = "https://reddit.com";

/// Anything that can list the current posts of a named source.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch the current posts of `source`, newest first.
    async fn fetch(&self, source: &str) -> Result<Vec<PostRecord>, FetchError>;
}

/// Resolve a permalink to an absolute URL.
///
/// Absolute permalinks are returned unchanged. Relative ones are appended to
/// the full base, so a base with a path prefix (a mirror or proxy mount) keeps
/// that prefix.
pub fn resolve_permalink(base: &Url, permalink: &str) -> String {
    if Url::parse(permalink).is_ok() {
        return permalink.to_string();
    }
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        permalink.trim_start_matches('/')
    )
}
