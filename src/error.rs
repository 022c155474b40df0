//! Error types for keyword resolution, feed fetching, and briefing cycles.
//!
//! The `Display` output of [`FetchError`] is user-facing: it is embedded
//! verbatim in the briefing as the inline failure line for a keyword, so the
//! messages are written in the same locale as the rest of the report.

use std::time::Duration;
use thiserror::Error;

/// A failure while fetching or parsing the feed for a single keyword.
///
/// Fetch errors never escape a cycle. The composer captures them per keyword
/// and renders them into the report.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("请求“{keyword}”新闻失败：{source}")]
    Request {
        keyword: String,
        #[source]
        source: reqwest::Error,
    },

    /// The feed endpoint answered with a non-2xx status.
    #[error("获取“{keyword}”新闻失败，状态码：{status}")]
    Status { keyword: String, status: u16 },

    /// The request did not complete before the per-request deadline.
    #[error("获取“{keyword}”新闻超时（{secs}秒）", secs = .timeout.as_secs())]
    Timeout { keyword: String, timeout: Duration },

    /// The response body was not a well-formed feed document.
    #[error("解析“{keyword}”新闻失败：{message}")]
    Parse { keyword: String, message: String },
}

impl FetchError {
    /// The keyword whose fetch failed.
    pub fn keyword(&self) -> &str {
        match self {
            FetchError::Request { keyword, .. }
            | FetchError::Status { keyword, .. }
            | FetchError::Timeout { keyword, .. }
            | FetchError::Parse { keyword, .. } => keyword,
        }
    }
}

/// Invalid or missing configuration. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no keywords given; pass them as arguments or set HOT_KEYWORDS (comma separated)")]
    NoKeywords,

    #[error("interval must be greater than zero seconds")]
    InvalidInterval,

    #[error("timeout must be greater than zero seconds")]
    InvalidTimeout,

    #[error("invalid feed url `{url}`: {reason}")]
    InvalidFeedUrl { url: String, reason: String },

    #[error("failed to read config file `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file `{path}`: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A fault outside per-keyword isolation. The cycle is abandoned, the
/// scheduler keeps ticking.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("cannot run a briefing cycle without keywords")]
    EmptyKeywords,

    #[error("failed to write briefing: {0}")]
    Output(#[from] std::io::Error),

    #[error("failed to serialize briefing: {0}")]
    Serialize(#[from] serde_json::Error),
}
