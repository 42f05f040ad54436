//! Post and lead data types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A post as returned by a source listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Unique post ID.
    pub id: String,
    /// Post title.
    pub title: String,
    /// Post body (self text); empty for link posts.
    #[serde(default)]
    pub body: String,
    /// Site-relative (or absolute) link to the post.
    pub permalink: String,
}

impl PostRecord {
    /// Create a new post record.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        permalink: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            permalink: permalink.into(),
        }
    }

    /// Title and body joined with a space, the text keyword rules run against.
    #[must_use]
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}

/// A post judged relevant, ready to be reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    /// Source the post was found in.
    pub source: String,
    /// Post title.
    pub title: String,
    /// Absolute URL of the post.
    pub url: String,
}

impl fmt::Display for Lead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[r/{}] {} - {}", self.source, self.title, self.url)
    }
}
