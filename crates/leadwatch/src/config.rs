//! Watch configuration: which sources to poll and which keywords make a lead.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::{default_groups, KeywordGroup, KeywordMatcher};
use crate::error::ConfigError;

/// Subreddits watched when no config file overrides them.
pub const DEFAULT_SOURCES: &[&str] = &[
    "irvine",
    "orangecounty",
    "sandiego",
    "temecula",
    "RealEstate",
    "RealEstateInvesting",
    "pickleball",
];

fn default_sources() -> Vec<String> {
    DEFAULT_SOURCES.iter().map(ToString::to_string).collect()
}

/// Sources and keyword groups, optionally loaded from a JSON file.
///
/// ```json
/// {
///   "sources": ["irvine", "r/pickleball"],
///   "keyword_groups": [{"name": "housing", "keywords": ["moving to", "rent in"]}]
/// }
/// ```
///
/// Either key may be omitted to keep the built-in default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
    #[serde(default = "default_groups")]
    pub keyword_groups: Vec<KeywordGroup>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            keyword_groups: default_groups(),
        }
    }
}

impl WatchConfig {
    /// Load from `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => Self::default(),
        };

        config.normalized()
    }

    /// Trim source names, strip an `r/` prefix, drop blanks and repeats.
    fn normalized(self) -> Result<Self, ConfigError> {
        let mut sources: Vec<String> = Vec::with_capacity(self.sources.len());
        for raw in &self.sources {
            let trimmed = raw.trim();
            let name = trimmed
                .strip_prefix("/r/")
                .or_else(|| trimmed.strip_prefix("r/"))
                .unwrap_or(trimmed)
                .trim_matches('/');
            if !name.is_empty() && !sources.iter().any(|s| s.eq_ignore_ascii_case(name)) {
                sources.push(name.to_string());
            }
        }

        if sources.is_empty() {
            return Err(ConfigError::NoSources);
        }

        Ok(Self {
            sources,
            keyword_groups: self.keyword_groups,
        })
    }

    /// Build the keyword matcher for these groups.
    pub fn matcher(&self) -> Result<KeywordMatcher, ConfigError> {
        KeywordMatcher::new(self.keyword_groups.clone())
    }
}
