//! End-to-end runs against a stubbed source and a temp state file.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use leadwatch::analysis::KeywordMatcher;
use leadwatch::error::{FetchError, SinkError};
use leadwatch::pipeline::{Pipeline, PipelineConfig};
use leadwatch::report::{ConsoleSink, LeadSink};
use leadwatch::source::{Lead, PostRecord, PostSource};
use leadwatch::storage::SeenStore;

struct StubSource(HashMap<String, Vec<PostRecord>>);

#[async_trait]
impl PostSource for StubSource {
    async fn fetch(&self, source: &str) -> Result<Vec<PostRecord>, FetchError> {
        self.0
            .get(source)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                url: format!("https://www.reddit.com/r/{source}/new.json"),
            })
    }
}

/// Records every delivery.
#[derive(Default)]
struct RecordingSink {
    deliveries: Mutex<Vec<Vec<Lead>>>,
}

#[async_trait]
impl LeadSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn deliver(&self, leads: &[Lead]) -> Result<(), SinkError> {
        self.deliveries.lock().unwrap().push(leads.to_vec());
        Ok(())
    }
}

struct BrokenSink;

#[async_trait]
impl LeadSink for BrokenSink {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn deliver(&self, _leads: &[Lead]) -> Result<(), SinkError> {
        Err(SinkError::NotConfigured("nowhere to send".to_string()))
    }
}

/// Console output whose reader has gone away (`leadwatch scan | head -1`).
struct ClosedPipeSink;

struct ClosedPipe;

impl std::io::Write for ClosedPipe {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::ErrorKind::BrokenPipe.into())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl LeadSink for ClosedPipeSink {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn deliver(&self, leads: &[Lead]) -> Result<(), SinkError> {
        ConsoleSink::write_to(&mut ClosedPipe, leads)
    }
}

fn stub() -> Arc<StubSource> {
    Arc::new(StubSource(HashMap::from([(
        "irvine".to_string(),
        vec![
            PostRecord::new("p1", "Buying a house in Irvine", "", "/r/irvine/p1"),
            PostRecord::new("p2", "Best pizza place", "", "/r/irvine/p2"),
        ],
    )])))
}

fn config(dir: &TempDir, sources: &[&str]) -> PipelineConfig {
    PipelineConfig::new(
        sources.iter().map(ToString::to_string).collect(),
        dir.path().join("seen.json"),
    )
    .unwrap()
}

#[tokio::test]
async fn test_rerun_reports_nothing_new() {
    let dir = TempDir::new().unwrap();
    let sink = Arc::new(RecordingSink::default());
    let pipeline = Pipeline::new(
        config(&dir, &["irvine"]),
        stub(),
        Arc::new(KeywordMatcher::default()),
    )
    .with_sink(sink.clone());

    let first = pipeline.run().await.unwrap();
    assert_eq!(first.leads.len(), 1);
    assert_eq!(first.seen_before, 0);
    assert_eq!(first.seen_after, 2);

    let second = pipeline.run().await.unwrap();
    assert!(second.leads.is_empty());
    assert_eq!(second.seen_before, 2);
    assert_eq!(second.seen_after, 2);

    let deliveries = sink.deliveries.lock().unwrap();
    assert_eq!(deliveries.len(), 2);
    assert_eq!(deliveries[0][0].url, "https://reddit.com/r/irvine/p1");
    assert!(deliveries[1].is_empty());
}

#[tokio::test]
async fn test_corrupt_state_file_treated_as_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("seen.json"), "definitely not json").unwrap();

    let pipeline = Pipeline::new(
        config(&dir, &["irvine"]),
        stub(),
        Arc::new(KeywordMatcher::default()),
    );
    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.seen_before, 0);
    assert_eq!(summary.leads.len(), 1);

    let saved = SeenStore::new(dir.path().join("seen.json")).load();
    assert!(saved.contains("p1") && saved.contains("p2"));
}

#[tokio::test]
async fn test_failed_source_still_saves_and_reports_others() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(
        config(&dir, &["missing", "irvine"]),
        stub(),
        Arc::new(KeywordMatcher::default()),
    );

    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.failed_sources.len(), 1);
    assert_eq!(summary.failed_sources[0].source, "missing");
    assert_eq!(summary.leads.len(), 1);
    assert_eq!(SeenStore::new(dir.path().join("seen.json")).load().len(), 2);
}

#[tokio::test]
async fn test_save_failure_fails_run_without_reporting() {
    let dir = TempDir::new().unwrap();
    // The state path is a directory, so the final rename cannot succeed.
    let state_dir = dir.path().join("seen.json");
    std::fs::create_dir(&state_dir).unwrap();

    let sink = Arc::new(RecordingSink::default());
    let pipeline = Pipeline::new(
        config(&dir, &["irvine"]),
        stub(),
        Arc::new(KeywordMatcher::default()),
    )
    .with_sink(sink.clone());

    let err = pipeline.run().await.unwrap_err();
    assert!(err.to_string().contains("Failed to save seen set"));
    assert!(sink.deliveries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_sink_failure_does_not_fail_run() {
    let dir = TempDir::new().unwrap();
    let recording = Arc::new(RecordingSink::default());
    let pipeline = Pipeline::new(
        config(&dir, &["irvine"]),
        stub(),
        Arc::new(KeywordMatcher::default()),
    )
    .with_sink(Arc::new(BrokenSink))
    .with_sink(recording.clone());

    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.sink_errors.len(), 1);
    assert!(summary.sink_errors[0].starts_with("broken:"));
    assert_eq!(recording.deliveries.lock().unwrap().len(), 1);
    assert_eq!(SeenStore::new(dir.path().join("seen.json")).load().len(), 2);
}

#[tokio::test]
async fn test_closed_stdout_is_recorded_as_sink_error() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(
        config(&dir, &["irvine"]),
        stub(),
        Arc::new(KeywordMatcher::default()),
    )
    .with_sink(Arc::new(ClosedPipeSink));

    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.leads.len(), 1);
    assert_eq!(summary.sink_errors.len(), 1);
    assert!(summary.sink_errors[0].starts_with("console: I/O error"));
    assert_eq!(SeenStore::new(dir.path().join("seen.json")).load().len(), 2);
}
