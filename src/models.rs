//! Data models for feed items and the per-cycle briefing.
//!
//! - [`FeedItem`]: one parsed news entry
//! - [`KeywordResult`]: the captured outcome of fetching one keyword
//! - [`Briefing`]: the ordered report produced by one cycle
//!
//! None of these outlive a single cycle.

use serde::Serialize;

/// Title used when a feed entry has no usable title.
pub const UNTITLED: &str = "未命名";

/// A single news entry extracted from a keyword's feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    /// Headline, or [`UNTITLED`] when the entry had none.
    pub title: String,
    /// Article URL, empty when absent.
    pub link: String,
    /// Publication date exactly as the feed reported it, empty when absent.
    pub published_at: String,
}

impl FeedItem {
    /// Build an item from optional feed fields, substituting defaults for
    /// anything missing or blank.
    pub fn from_parts(
        title: Option<String>,
        link: Option<String>,
        published_at: Option<String>,
    ) -> Self {
        Self {
            title: non_blank(title).unwrap_or_else(|| UNTITLED.to_string()),
            link: non_blank(link).unwrap_or_default(),
            published_at: non_blank(published_at).unwrap_or_default(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Outcome of fetching a single keyword.
///
/// Failures are captured as text so that one keyword's error can be rendered
/// inline without aborting its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum KeywordResult {
    Ok { items: Vec<FeedItem> },
    Error { error: String },
}

/// One keyword's slot in the briefing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub keyword: String,
    #[serde(flatten)]
    pub result: KeywordResult,
}

/// The report for one cycle: a timestamp and one section per keyword, in
/// the same order the keywords were given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Briefing {
    /// Local wall-clock time the cycle started, already formatted.
    pub generated_at: String,
    pub sections: Vec<Section>,
}

impl Briefing {
    /// Number of sections whose fetch failed.
    pub fn failed_count(&self) -> usize {
        self.sections
            .iter()
            .filter(|s| matches!(s.result, KeywordResult::Error { .. }))
            .count()
    }
}
