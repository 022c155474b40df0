//! Google News search feed.
//!
//! Each keyword is sent to the RSS search endpoint with fixed Simplified
//! Chinese locale parameters:
//!
//! ```text
//! https://news.google.com/rss/search?q=<keyword>&hl=zh-CN&gl=CN&ceid=CN:zh-Hans
//! ```
//!
//! The response is deserialized into a typed `rss → channel → item*` shape.
//! A missing channel or item list yields no items; a single `<item>` is a
//! one-element list.

use super::{FeedSource, MAX_ITEMS};
use crate::error::FetchError;
use crate::models::FeedItem;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Default search endpoint.
pub const DEFAULT_FEED_URL: &str = "https://news.google.com/rss/search";

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = "news-brief-agent/1.0";

const LOCALE_PARAMS: &str = "hl=zh-CN&gl=CN&ceid=CN:zh-Hans";

#[derive(Debug, Deserialize)]
struct Rss {
    #[serde(default)]
    channel: Channel,
}

#[derive(Debug, Default, Deserialize)]
struct Channel {
    #[serde(default, rename = "item")]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// HTTP client for the Google News RSS search endpoint.
#[derive(Debug, Clone)]
pub struct GoogleNewsSource {
    client: Client,
    feed_url: Url,
    timeout: Duration,
}

impl GoogleNewsSource {
    /// Build a source with a per-request deadline of `timeout`.
    pub fn new(feed_url: Url, timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            feed_url,
            timeout,
        })
    }

    /// Full search URL for `keyword`.
    pub fn search_url(&self, keyword: &str) -> String {
        format!(
            "{}?q={}&{}",
            self.feed_url,
            urlencoding::encode(keyword),
            LOCALE_PARAMS
        )
    }

    fn request_error(&self, keyword: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                keyword: keyword.to_string(),
                timeout: self.timeout,
            }
        } else {
            FetchError::Request {
                keyword: keyword.to_string(),
                source: e,
            }
        }
    }
}

impl FeedSource for GoogleNewsSource {
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, keyword: &str) -> Result<Vec<FeedItem>, FetchError> {
        let t0 = Instant::now();
        let url = self.search_url(keyword);
        debug!(%url, "Requesting feed");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.request_error(keyword, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Feed endpoint returned non-success status");
            return Err(FetchError::Status {
                keyword: keyword.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.request_error(keyword, e))?;

        let items = parse_feed(keyword, &body)?;
        info!(
            count = items.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched feed"
        );
        Ok(items)
    }
}

/// Parse an RSS document into at most [`MAX_ITEMS`] feed items, in order.
pub fn parse_feed(keyword: &str, xml: &str) -> Result<Vec<FeedItem>, FetchError> {
    let rss: Rss = quick_xml::de::from_str(xml).map_err(|e| {
        warn!(
            error = %e,
            body_preview = %truncate_for_log(xml, 200),
            "Feed body is not a valid RSS document"
        );
        FetchError::Parse {
            keyword: keyword.to_string(),
            message: e.to_string(),
        }
    })?;

    Ok(rss
        .channel
        .items
        .into_iter()
        .take(MAX_ITEMS)
        .map(|it| FeedItem::from_parts(it.title, it.link, it.pub_date))
        .collect())
}
