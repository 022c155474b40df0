//! Command-line interface definitions for News Brief.
//!
//! Keywords are positional. Everything else can be given as a flag, and the
//! keyword fallback can also come from the `HOT_KEYWORDS` environment
//! variable or the optional YAML config file.

use clap::Parser;

/// Command-line arguments for the News Brief application.
///
/// # Examples
///
/// ```sh
/// # Brief on two keywords every two hours
/// news_brief 芯片 新能源
///
/// # Comma separated, via the environment
/// HOT_KEYWORDS="芯片,新能源" news_brief
///
/// # One cycle as JSON, then exit
/// news_brief --once --json 芯片
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Keywords to brief on; each argument may itself be comma separated
    pub keywords: Vec<String>,

    /// Comma separated keywords used when none are given as arguments
    #[arg(long, env = "HOT_KEYWORDS")]
    pub hot_keywords: Option<String>,

    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Seconds between briefing cycles [default: 7200]
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Per-request deadline in seconds [default: 30]
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Feed search endpoint [default: https://news.google.com/rss/search]
    #[arg(long)]
    pub feed_url: Option<String>,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Print each briefing as a JSON document
    #[arg(long)]
    pub json: bool,

    /// Exit with an error instead of using the default keywords
    #[arg(long)]
    pub require_keywords: bool,
}
