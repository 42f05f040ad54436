//! Lead scanner - fetch, filter against the seen set, classify, mark seen.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use futures::future::join_all;
use url::Url;

use crate::analysis::LeadMatcher;
use crate::error::FetchError;
use crate::source::{resolve_permalink, Lead, PostRecord, PostSource};
use crate::storage::SeenSet;

/// Default per-source fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// A source whose fetch failed during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    /// Source name.
    pub source: String,
    /// Error description.
    pub reason: String,
}

/// Result of a single scan.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// New leads, in source order then listing order.
    pub leads: Vec<Lead>,
    /// The input seen set plus every post evaluated in this scan.
    pub seen: SeenSet,
    /// Sources that contributed nothing because their fetch failed.
    pub failures: Vec<SourceFailure>,
    /// Posts fetched across all sources.
    pub fetched: usize,
    /// Posts evaluated (not previously seen).
    pub evaluated: usize,
}

/// Scans sources for leads.
///
/// The seen set is passed in and handed back; the scanner holds no state
/// between scans.
#[derive(Debug, Clone)]
pub struct LeadScanner {
    link_base: Url,
    fetch_timeout: Duration,
}

impl LeadScanner {
    /// Create a scanner resolving lead URLs against `link_base`.
    #[must_use]
    pub fn new(link_base: Url, fetch_timeout: Duration) -> Self {
        Self {
            link_base,
            fetch_timeout,
        }
    }

    /// Scan every source once.
    ///
    /// Fetches run concurrently; results are merged one source at a time in
    /// the order of `sources`. A failed or timed-out fetch contributes no
    /// posts and does not stop the scan.
    pub async fn scan(
        &self,
        sources: &[String],
        seen: SeenSet,
        fetcher: &dyn PostSource,
        matcher: &dyn LeadMatcher,
    ) -> ScanOutcome {
        let fetches = sources
            .iter()
            .map(|source| self.fetch_source(fetcher, source));
        let results = join_all(fetches).await;

        let mut outcome = ScanOutcome {
            seen,
            ..ScanOutcome::default()
        };

        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(posts) => self.merge(source, posts, matcher, &mut outcome),
                Err(e) => {
                    tracing::warn!(source = %source, error = %e, "Failed to fetch source");
                    outcome.failures.push(SourceFailure {
                        source: source.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            sources = sources.len(),
            failed = outcome.failures.len(),
            fetched = outcome.fetched,
            evaluated = outcome.evaluated,
            leads = outcome.leads.len(),
            "Scan complete"
        );

        outcome
    }

    async fn fetch_source(
        &self,
        fetcher: &dyn PostSource,
        source: &str,
    ) -> Result<Vec<PostRecord>, FetchError> {
        match tokio::time::timeout(self.fetch_timeout, fetcher.fetch(source)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.fetch_timeout)),
        }
    }

    /// Evaluate one source's posts against the working seen set.
    fn merge(
        &self,
        source: &str,
        posts: Vec<PostRecord>,
        matcher: &dyn LeadMatcher,
        outcome: &mut ScanOutcome,
    ) {
        outcome.fetched += posts.len();
        let mut new_posts = 0usize;

        for post in posts {
            if outcome.seen.contains(&post.id) {
                continue;
            }

            if evaluate(matcher, &post) {
                tracing::info!(source, id = %post.id, title = %post.title, "New lead");
                outcome.leads.push(Lead {
                    source: source.to_string(),
                    url: resolve_permalink(&self.link_base, &post.permalink),
                    title: post.title,
                });
            }

            outcome.seen.insert(post.id);
            new_posts += 1;
        }

        outcome.evaluated += new_posts;
        tracing::debug!(source, new_posts, "Merged source");
    }
}

/// Run the matcher on one post; a panicking matcher counts as no match.
fn evaluate(matcher: &dyn LeadMatcher, post: &PostRecord) -> bool {
    let text = post.text();
    catch_unwind(AssertUnwindSafe(|| matcher.matches(&text))).unwrap_or_else(|_| {
        tracing::warn!(id = %post.id, "Matcher panicked, treating post as no match");
        false
    })
}
