use crate::feed::hal::parse_timestamp;
use crate::feed::types::EarliestEntryLimit;
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

const ENV_FILE: &str = ".env";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub feed: FeedConfig,
    #[serde(default)]
    pub poll: PollConfig,
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub endpoint: String,
    /// Entries published at or before this are ignored. Feed format or RFC 3339.
    #[serde(default, deserialize_with = "deserialize_limit")]
    pub earliest_entry_limit: Option<EarliestEntryLimit>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_request_timeout() -> u64 { 10_000 }
fn default_user_agent() -> String { format!("feed-consumer/{}", env!("CARGO_PKG_VERSION")) }

#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval")]
    pub interval_s: u64,
    /// Overall deadline for a single run.
    pub run_timeout_s: Option<u64>,
}

fn default_poll_interval() -> u64 { 60 }

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_s: default_poll_interval(),
            run_timeout_s: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TrackingConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log to this file instead of stderr.
    pub file: Option<PathBuf>,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "feed_consumer=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            filter: default_log_filter(),
        }
    }
}

fn deserialize_limit<'de, D>(deserializer: D) -> std::result::Result<Option<EarliestEntryLimit>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| {
        parse_timestamp(&s)
            .map(EarliestEntryLimit::new)
            .map_err(|e| serde::de::Error::custom(format!("earliest_entry_limit: {:#}", e)))
    })
    .transpose()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse config TOML, then apply environment overrides.
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        if let Ok(endpoint) = std::env::var("FEED_ENDPOINT") {
            let endpoint = sanitize_value(&endpoint);
            if !endpoint.is_empty() {
                config.feed.endpoint = endpoint;
            }
        }
        Ok(config)
    }

    /// Config file path: `FEED_CONSUMER_CONFIG`, else `config.toml`.
    pub fn path() -> PathBuf {
        std::env::var("FEED_CONSUMER_CONFIG")
            .map(|p| PathBuf::from(sanitize_value(&p)))
            .unwrap_or_else(|_| PathBuf::from("config.toml"))
    }

    /// Load `.env` from the working directory. Real env vars take precedence.
    /// Returns whether a file was found.
    pub fn load_env_file() -> Result<bool> {
        Self::load_env_from(Path::new(ENV_FILE))
    }

    pub fn load_env_from(path: &Path) -> Result<bool> {
        match dotenvy::from_path(path) {
            Ok(()) => Ok(true),
            Err(e) if e.not_found() => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to load env file: {}", path.display())),
        }
    }
}

/// Strip carriage returns, BOM, and other invisible chars from an env value.
fn sanitize_value(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}
