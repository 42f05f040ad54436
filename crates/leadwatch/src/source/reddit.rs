//! Reddit public listing client.
//!
//! Reads `/r/{name}/new.json` without authentication. Read-only: nothing here
//! writes to Reddit.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::types::PostRecord;
use super::PostSource;
use crate::error::FetchError;

/// Default listing host.
pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com";

/// Default user agent sent with every listing request.
pub const DEFAULT_USER_AGENT: &str = "read-only-helper-bot/1.0";

/// Default number of posts requested per listing.
pub const DEFAULT_LIMIT: u32 = 20;

/// Listing envelope: `{"data": {"children": [{"data": {...}}]}}`.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: RawPost,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: Option<String>,
    #[serde(default)]
    permalink: String,
}

impl From<RawPost> for PostRecord {
    fn from(raw: RawPost) -> Self {
        PostRecord::new(
            raw.id,
            raw.title,
            raw.selftext.unwrap_or_default(),
            raw.permalink,
        )
    }
}

/// Fetches the newest posts of a subreddit from the public JSON listing.
pub struct RedditListing {
    client: Client,
    base_url: String,
    limit: u32,
}

impl RedditListing {
    /// Create a client against `base_url` requesting `limit` posts per listing.
    pub fn new(base_url: impl Into<String>, limit: u32) -> Result<Self, FetchError> {
        Self::with_user_agent(base_url, limit, DEFAULT_USER_AGENT)
    }

    /// Create a client with a custom user agent.
    pub fn with_user_agent(
        base_url: impl Into<String>,
        limit: u32,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            limit,
        })
    }

    /// URL of the "new" listing for a subreddit.
    #[must_use]
    pub fn listing_url(&self, source: &str) -> String {
        format!("{}/r/{}/new.json", self.base_url, source)
    }
}

#[async_trait]
impl PostSource for RedditListing {
    async fn fetch(&self, source: &str) -> Result<Vec<PostRecord>, FetchError> {
        let url = self.listing_url(source);
        tracing::debug!(%url, limit = self.limit, "Fetching listing");

        let response = self
            .client
            .get(&url)
            .query(&[("limit", self.limit)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let listing: Listing = serde_json::from_str(&body)?;

        let posts: Vec<PostRecord> = listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.into())
            .collect();

        tracing::debug!(source, count = posts.len(), "Fetched listing");
        Ok(posts)
    }
}
