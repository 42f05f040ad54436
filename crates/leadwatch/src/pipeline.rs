//! Single-run pipeline: load seen set, scan, save seen set, report.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::analysis::LeadMatcher;
use crate::error::ConfigError;
use crate::report::LeadSink;
use crate::scanner::{LeadScanner, SourceFailure, DEFAULT_FETCH_TIMEOUT};
use crate::source::{Lead, PostSource, DEFAULT_LINK_BASE};
use crate::storage::SeenStore;

/// Configuration for one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Sources to scan, in order.
    pub sources: Vec<String>,
    /// Seen-set file path.
    pub state_path: PathBuf,
    /// Base that permalinks are resolved against.
    pub link_base: Url,
    /// Per-source fetch timeout.
    pub fetch_timeout: Duration,
}

impl PipelineConfig {
    /// Create a config with the default link base and timeout.
    pub fn new(sources: Vec<String>, state_path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            sources,
            state_path: state_path.into(),
            link_base: parse_url(DEFAULT_LINK_BASE)?,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        })
    }
}

/// Parse a base URL, mapping the error into [`ConfigError`].
pub fn parse_url(url: &str) -> Result<Url, ConfigError> {
    Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Result of a single run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Posts fetched across all sources.
    pub fetched: usize,
    /// Posts evaluated for the first time.
    pub evaluated: usize,
    /// Leads found.
    pub leads: Vec<Lead>,
    /// Sources that could not be fetched.
    pub failed_sources: Vec<SourceFailure>,
    /// Seen IDs before the run.
    pub seen_before: usize,
    /// Seen IDs after the run.
    pub seen_after: usize,
    /// Sinks that failed to deliver, with the error.
    pub sink_errors: Vec<String>,
}

/// Wires the collaborators of one run together.
pub struct Pipeline {
    config: PipelineConfig,
    fetcher: Arc<dyn PostSource>,
    matcher: Arc<dyn LeadMatcher>,
    sinks: Vec<Arc<dyn LeadSink>>,
}

impl Pipeline {
    /// Create a new pipeline with no sinks.
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        fetcher: Arc<dyn PostSource>,
        matcher: Arc<dyn LeadMatcher>,
    ) -> Self {
        Self {
            config,
            fetcher,
            matcher,
            sinks: Vec::new(),
        }
    }

    /// Add a sink that receives the leads after the seen set is saved.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn LeadSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Run once.
    ///
    /// Fails only when the seen set cannot be saved; in that case no sink is
    /// invoked, since the next run would report the same leads again.
    pub async fn run(&self) -> Result<RunSummary> {
        let store = SeenStore::new(&self.config.state_path);
        let seen = store.load();
        let seen_before = seen.len();

        tracing::info!(
            sources = self.config.sources.len(),
            seen = seen_before,
            state = %store.path().display(),
            "Starting scan"
        );

        let scanner = LeadScanner::new(self.config.link_base.clone(), self.config.fetch_timeout);
        let outcome = scanner
            .scan(
                &self.config.sources,
                seen,
                self.fetcher.as_ref(),
                self.matcher.as_ref(),
            )
            .await;

        store
            .save(&outcome.seen)
            .with_context(|| format!("Failed to save seen set to {}", store.path().display()))?;

        let mut summary = RunSummary {
            fetched: outcome.fetched,
            evaluated: outcome.evaluated,
            seen_before,
            seen_after: outcome.seen.len(),
            failed_sources: outcome.failures,
            leads: outcome.leads,
            sink_errors: Vec::new(),
        };

        for sink in &self.sinks {
            if let Err(e) = sink.deliver(&summary.leads).await {
                tracing::error!(sink = sink.name(), error = %e, "Failed to deliver leads");
                summary.sink_errors.push(format!("{}: {e}", sink.name()));
            }
        }

        tracing::info!(
            fetched = summary.fetched,
            evaluated = summary.evaluated,
            leads = summary.leads.len(),
            failed_sources = summary.failed_sources.len(),
            seen = summary.seen_after,
            "Run complete"
        );

        Ok(summary)
    }
}
