//! Keyword-group matching.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Decides whether a post's text makes it a lead.
///
/// Implementations must be pure: the same text always gives the same answer.
pub trait LeadMatcher: Send + Sync {
    /// Check if `text` (title and body joined) is a lead.
    fn matches(&self, text: &str) -> bool;
}

impl<F> LeadMatcher for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn matches(&self, text: &str) -> bool {
        self(text)
    }
}

/// A named list of keywords. Any keyword occurring as a substring matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGroup {
    /// Group name, used in logs.
    pub name: String,
    /// Keywords; compared case-insensitively.
    pub keywords: Vec<String>,
}

impl KeywordGroup {
    /// Create a new keyword group.
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    /// Lowercase and trim keywords, dropping blank ones.
    fn normalized(self) -> Self {
        let keywords = self
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            name: self.name,
            keywords,
        }
    }

    /// `lowered` must already be lowercase.
    fn matches_lowered(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

/// The built-in groups: pickleball coaching and local housing questions.
#[must_use]
pub fn default_groups() -> Vec<KeywordGroup> {
    vec![
        KeywordGroup::new("pickleball", ["pickleball", "court", "lessons", "paddle"]),
        KeywordGroup::new(
            "housing",
            ["moving to", "buying", "rent in", "neighborhood", "property"],
        ),
    ]
}

/// OR across groups, OR within a group, case-insensitive substring match.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    groups: Vec<KeywordGroup>,
}

impl KeywordMatcher {
    /// Build a matcher. Groups left empty after normalization are dropped;
    /// at least one must remain.
    pub fn new(groups: Vec<KeywordGroup>) -> Result<Self, ConfigError> {
        let groups: Vec<KeywordGroup> = groups
            .into_iter()
            .map(KeywordGroup::normalized)
            .filter(|g| !g.keywords.is_empty())
            .collect();

        if groups.is_empty() {
            return Err(ConfigError::NoKeywords);
        }

        Ok(Self { groups })
    }

    #[must_use]
    pub fn groups(&self) -> &[KeywordGroup] {
        &self.groups
    }

    /// Name of the first group with a keyword in `text`.
    #[must_use]
    pub fn matched_group(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.groups
            .iter()
            .find(|g| g.matches_lowered(&lowered))
            .map(|g| g.name.as_str())
    }
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self {
            groups: default_groups()
                .into_iter()
                .map(KeywordGroup::normalized)
                .collect(),
        }
    }
}

impl LeadMatcher for KeywordMatcher {
    fn matches(&self, text: &str) -> bool {
        let group = self.matched_group(text);
        if let Some(name) = group {
            tracing::trace!(group = name, "Keyword group matched");
        }
        group.is_some()
    }
}
