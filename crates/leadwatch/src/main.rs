//! leadwatch CLI - read-only subreddit lead watcher.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use leadwatch::config::WatchConfig;
use leadwatch::pipeline::{parse_url, Pipeline, PipelineConfig};
use leadwatch::report::{ConsoleSink, EmailSink, SlackSink};
use leadwatch::source::{RedditListing, DEFAULT_BASE_URL, DEFAULT_LIMIT, DEFAULT_LINK_BASE};
use leadwatch::storage::SeenStore;

/// leadwatch - poll public subreddit listings and report new keyword matches.
#[derive(Parser)]
#[command(name = "leadwatch")]
#[command(about = "Read-only subreddit lead watcher")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a single scan (for cron use)
    Scan {
        /// Seen-set file path
        #[arg(long, env = "LEADWATCH_STATE", default_value = "seen.json")]
        state: PathBuf,

        /// JSON config file with sources and keyword groups
        #[arg(long, env = "LEADWATCH_CONFIG")]
        config: Option<PathBuf>,

        /// Listing host
        #[arg(long, env = "LEADWATCH_BASE_URL", default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// Base URL that lead permalinks are appended to (path prefix kept)
        #[arg(long, env = "LEADWATCH_LINK_BASE", default_value = DEFAULT_LINK_BASE)]
        link_base: String,

        /// Posts requested per listing
        #[arg(long, env = "LEADWATCH_LIMIT", default_value_t = DEFAULT_LIMIT)]
        limit: u32,

        /// Per-source fetch timeout in seconds
        #[arg(long, env = "LEADWATCH_TIMEOUT_SECS", default_value_t = 20)]
        timeout_secs: u64,

        /// Also post leads to SLACK_WEBHOOK_URL
        #[arg(long)]
        slack: bool,

        /// Also email leads (SMTP_USERNAME / SMTP_PASSWORD)
        #[arg(long)]
        email: bool,

        /// Do not print leads to stdout
        #[arg(long)]
        quiet: bool,
    },

    /// Show how many posts have been seen
    Seen {
        /// Seen-set file path
        #[arg(long, env = "LEADWATCH_STATE", default_value = "seen.json")]
        state: PathBuf,
    },

    /// Check whether some text would be reported as a lead
    Check {
        /// Text to test (title and body)
        text: String,

        /// JSON config file with sources and keyword groups
        #[arg(long, env = "LEADWATCH_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("leadwatch=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("leadwatch=info,warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Scan {
            state,
            config,
            base_url,
            link_base,
            limit,
            timeout_secs,
            slack,
            email,
            quiet,
        } => {
            run_scan(ScanArgs {
                state,
                config,
                base_url,
                link_base,
                limit,
                timeout: Duration::from_secs(timeout_secs),
                slack,
                email,
                quiet,
            })
            .await
        }
        Commands::Seen { state } => run_seen(state),
        Commands::Check { text, config } => run_check(&text, config),
    }
}

struct ScanArgs {
    state: PathBuf,
    config: Option<PathBuf>,
    base_url: String,
    link_base: String,
    limit: u32,
    timeout: Duration,
    slack: bool,
    email: bool,
    quiet: bool,
}

async fn run_scan(args: ScanArgs) -> Result<()> {
    let watch = WatchConfig::load(args.config.as_deref())?;
    let matcher = watch.matcher()?;

    tracing::info!(
        state = %args.state.display(),
        sources = ?watch.sources,
        base_url = %args.base_url,
        limit = args.limit,
        "Starting leadwatch scan"
    );

    let config = PipelineConfig {
        sources: watch.sources,
        state_path: args.state,
        link_base: parse_url(&args.link_base)?,
        fetch_timeout: args.timeout,
    };

    let fetcher = RedditListing::new(args.base_url, args.limit)
        .context("Failed to build HTTP client")?;

    let mut pipeline = Pipeline::new(config, Arc::new(fetcher), Arc::new(matcher));
    if !args.quiet {
        pipeline = pipeline.with_sink(Arc::new(ConsoleSink::new()));
    }
    if args.slack {
        pipeline = pipeline.with_sink(Arc::new(SlackSink::from_env()?));
    }
    if args.email {
        pipeline = pipeline.with_sink(Arc::new(EmailSink::from_env()?));
    }

    let summary = pipeline.run().await?;

    eprintln!(
        "\nScanned {} posts, {} new, {} lead(s); {} IDs seen",
        summary.fetched,
        summary.evaluated,
        summary.leads.len(),
        summary.seen_after
    );
    for failure in &summary.failed_sources {
        eprintln!(
            "  {} r/{}: {}",
            "skipped".yellow(),
            failure.source,
            failure.reason
        );
    }
    for err in &summary.sink_errors {
        eprintln!("  {} {err}", "delivery failed".red());
    }

    Ok(())
}

fn run_seen(state: PathBuf) -> Result<()> {
    let store = SeenStore::new(state);
    let seen = store.load();
    writeln!(
        std::io::stdout().lock(),
        "{} IDs seen in {}",
        seen.len(),
        store.path().display()
    )?;
    Ok(())
}

fn run_check(text: &str, config: Option<PathBuf>) -> Result<()> {
    let watch = WatchConfig::load(config.as_deref())?;
    let matcher = watch.matcher()?;

    let mut out = std::io::stdout().lock();
    match matcher.matched_group(text) {
        Some(group) => writeln!(out, "{} (group: {group})", "match".green().bold())?,
        None => writeln!(out, "{}", "no match".dimmed())?,
    }
    Ok(())
}
