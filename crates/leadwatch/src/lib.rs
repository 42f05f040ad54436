//! Read-only subreddit lead watcher.
//!
//! This crate provides:
//! - Public Reddit listing fetching (no auth, no write actions)
//! - Keyword-group matching over post title and body
//! - A persisted seen set so repeated runs never report a post twice
//! - Console, Slack webhook, and email lead sinks

pub mod analysis;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod scanner;
pub mod source;
pub mod storage;

// Re-export main types
pub use analysis::{KeywordGroup, KeywordMatcher, LeadMatcher};
pub use config::WatchConfig;
pub use error::{ConfigError, FetchError, SinkError, StoreError};
pub use pipeline::{Pipeline, PipelineConfig, RunSummary};
pub use report::{ConsoleSink, EmailSink, LeadSink, SlackSink};
pub use scanner::{LeadScanner, ScanOutcome, SourceFailure};
pub use source::{Lead, PostRecord, PostSource, RedditListing};
pub use storage::{SeenSet, SeenStore};
