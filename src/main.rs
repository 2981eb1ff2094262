use anyhow::{Context, Result};
use feed_consumer::config::{Config, LoggingConfig};
use feed_consumer::feed::hal::HalPageParser;
use feed_consumer::feed::http::HttpFeedEndpoint;
use feed_consumer::store::FileTracker;
use feed_consumer::{DiscoveryError, EntryDiscovery, RunSummary};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

fn init_logging(config: &LoggingConfig) -> Result<()> {
    match &config.file {
        Some(path) => {
            let log_file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(config.filter.as_str())
                .with_writer(log_file)
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(config.filter.as_str())
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

/// One discovery run, bounded by `deadline` when set.
async fn run_once(discovery: &EntryDiscovery, deadline: Option<Duration>) -> Result<RunSummary> {
    let run = discovery.discover_and_track();
    let outcome = match deadline {
        Some(limit) => tokio::time::timeout(limit, run)
            .await
            .map_err(|_| anyhow::anyhow!("discovery run exceeded {:?}", limit))?,
        None => run.await,
    };

    match outcome {
        Ok(summary) => Ok(summary),
        Err(e) => {
            match &e {
                DiscoveryError::Track { tracked, .. } => {
                    tracing::warn!(tracked, "tracking stopped partway, oldest entries kept")
                }
                _ => tracing::warn!("scan failed, tracking state unchanged"),
            }
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = Config::load_env_file()?;

    let config_path = Config::path();
    let config = Config::load(&config_path)?;
    init_logging(&config.logging)?;
    tracing::debug!(env_file, config = %config_path.display(), "configuration loaded");

    let once = std::env::args().any(|arg| arg == "--once");

    let endpoint = HttpFeedEndpoint::new(&config.feed)?;
    let tracker = FileTracker::open(&config.tracking.path).await?;

    tracing::info!(
        endpoint = %endpoint.endpoint(),
        tracking = %tracker.path().display(),
        already_tracked = tracker.count().await,
        limit = ?config.feed.earliest_entry_limit.map(|l| l.at()),
        "feed consumer starting"
    );

    let discovery = EntryDiscovery::new(
        Arc::new(endpoint),
        Arc::new(HalPageParser),
        Arc::new(tracker),
        config.feed.earliest_entry_limit,
    );
    let deadline = config.poll.run_timeout_s.map(Duration::from_secs);

    if once {
        let summary = run_once(&discovery, deadline).await?;
        println!(
            "  {} new entries tracked ({} pages read)",
            summary.tracked, summary.pages_read
        );
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(config.poll.interval_s.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // A failed run is retried on the next tick from the current tracking state.
                if let Err(e) = run_once(&discovery, deadline).await {
                    tracing::error!("discovery run failed: {:#}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracing::debug!("shutting down");
    Ok(())
}
