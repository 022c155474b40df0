//! Runtime settings assembled from CLI flags, the environment, and an
//! optional YAML config file.
//!
//! # Config file
//!
//! ```yaml
//! keywords:
//!   - 芯片
//!   - 新能源
//! interval_secs: 7200
//! timeout_secs: 30
//! feed_url: https://news.google.com/rss/search
//! user_agent: news-brief-agent/1.0
//! ```
//!
//! Every field is optional. Flags win over the file, the file wins over the
//! built-in defaults.

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::keywords::resolve_keywords;
use crate::sources::google_news::{DEFAULT_FEED_URL, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Two hours between cycles.
pub const DEFAULT_INTERVAL_SECS: u64 = 2 * 60 * 60;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Contents of the optional `config.yaml`.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub keywords: Vec<String>,
    pub interval_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub feed_url: Option<String>,
    pub user_agent: Option<String>,
}

impl FileConfig {
    pub fn from_yaml(path: &str, yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|source| ConfigError::Yaml {
            path: path.to_string(),
            source,
        })
    }
}

/// Fully resolved settings for one process.
#[derive(Debug, Clone)]
pub struct Settings {
    pub keywords: Vec<String>,
    pub interval: Duration,
    pub timeout: Duration,
    pub feed_url: Url,
    pub user_agent: String,
    pub once: bool,
    pub json: bool,
}

impl Settings {
    /// Read the config file named by `--config` (if any) and resolve.
    #[instrument(level = "info", skip_all, fields(config = ?cli.config))]
    pub async fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => {
                let yaml = fs::read_to_string(path)
                    .await
                    .map_err(|source| ConfigError::Read {
                        path: path.clone(),
                        source,
                    })?;
                info!(%path, "Loaded config file");
                FileConfig::from_yaml(path, &yaml)?
            }
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    /// Merge CLI flags over file values over defaults, then validate.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let keywords = resolve_keywords(
            &cli.keywords,
            cli.hot_keywords.as_deref(),
            &file.keywords,
            cli.require_keywords,
        )?;

        let interval_secs = cli
            .interval_secs
            .or(file.interval_secs)
            .unwrap_or(DEFAULT_INTERVAL_SECS);
        if interval_secs == 0 {
            return Err(ConfigError::InvalidInterval);
        }

        let timeout_secs = cli
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        let raw_url = cli
            .feed_url
            .clone()
            .or(file.feed_url)
            .unwrap_or_else(|| DEFAULT_FEED_URL.to_string());
        let feed_url = parse_feed_url(&raw_url)?;

        Ok(Self {
            keywords,
            interval: Duration::from_secs(interval_secs),
            timeout: Duration::from_secs(timeout_secs),
            feed_url,
            user_agent: file.user_agent.unwrap_or_else(|| USER_AGENT.to_string()),
            once: cli.once,
            json: cli.json,
        })
    }
}

fn parse_feed_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidFeedUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme `{other}`"))),
    }
    if url.query().is_some() {
        return Err(invalid("query parameters are added per keyword".to_string()));
    }
    if url.fragment().is_some() {
        return Err(invalid("a fragment would swallow the search query".to_string()));
    }
    Ok(url)
}
