//! Concurrent fan-out over keywords and assembly of one [`Briefing`].
//!
//! All keyword fetches for a cycle start together and the composer waits for
//! every one of them to settle. A failing keyword becomes an error section;
//! it never cancels or reorders its siblings.

use crate::error::CycleError;
use crate::models::{Briefing, KeywordResult, Section};
use crate::sources::{FeedSource, MAX_ITEMS};
use futures::future::join_all;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Fetch one keyword and capture the outcome instead of propagating it.
async fn fetch_section<F: FeedSource>(source: &F, keyword: &str) -> Section {
    let result = match source.fetch(keyword).await {
        Ok(mut items) => {
            items.truncate(MAX_ITEMS);
            KeywordResult::Ok { items }
        }
        Err(e) => {
            warn!(keyword = e.keyword(), error = %e, "Keyword fetch failed");
            KeywordResult::Error {
                error: e.to_string(),
            }
        }
    };
    Section {
        keyword: keyword.to_string(),
        result,
    }
}

/// Build the briefing for `keywords`, stamped with `generated_at`.
///
/// Sections come back in the same order as `keywords` regardless of which
/// fetch finishes first.
#[instrument(level = "info", skip(source, keywords), fields(keywords = keywords.len()))]
pub async fn compose<F: FeedSource>(
    source: &F,
    keywords: &[String],
    generated_at: String,
) -> Result<Briefing, CycleError> {
    if keywords.is_empty() {
        return Err(CycleError::EmptyKeywords);
    }

    let t0 = Instant::now();
    let sections = join_all(keywords.iter().map(|k| fetch_section(source, k))).await;
    let briefing = Briefing {
        generated_at,
        sections,
    };

    info!(
        sections = briefing.sections.len(),
        failed = briefing.failed_count(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Composed briefing"
    );
    Ok(briefing)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::FeedItem;
    use crate::outputs::text::render_briefing;
    use std::collections::HashMap;
    use std::time::Duration;

    /// In-memory source with canned responses and optional per-keyword delay.
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub items: HashMap<String, Vec<FeedItem>>,
        pub failures: HashMap<String, u16>,
        pub delays: HashMap<String, Duration>,
    }

    impl FakeSource {
        pub fn with_items(mut self, keyword: &str, items: Vec<FeedItem>) -> Self {
            self.items.insert(keyword.to_string(), items);
            self
        }

        pub fn with_failure(mut self, keyword: &str, status: u16) -> Self {
            self.failures.insert(keyword.to_string(), status);
            self
        }

        pub fn with_delay(mut self, keyword: &str, delay: Duration) -> Self {
            self.delays.insert(keyword.to_string(), delay);
            self
        }
    }

    impl FeedSource for FakeSource {
        async fn fetch(&self, keyword: &str) -> Result<Vec<FeedItem>, FetchError> {
            if let Some(delay) = self.delays.get(keyword) {
                tokio::time::sleep(*delay).await;
            }
            if let Some(status) = self.failures.get(keyword) {
                return Err(FetchError::Status {
                    keyword: keyword.to_string(),
                    status: *status,
                });
            }
            Ok(self.items.get(keyword).cloned().unwrap_or_default())
        }
    }

    pub(crate) fn item(title: &str, link: &str, date: &str) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            link: link.to_string(),
            published_at: date.to_string(),
        }
    }

    fn keywords(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_section_per_keyword_in_input_order() {
        // the first keyword finishes last
        let source = FakeSource::default()
            .with_delay("slow", Duration::from_millis(50))
            .with_items("slow", vec![item("S", "s", "")])
            .with_items("fast", vec![item("F", "f", "")]);

        let briefing = compose(&source, &keywords(&["slow", "fast", "none"]), "t".to_string())
            .await
            .unwrap();

        let order: Vec<&str> = briefing.sections.iter().map(|s| s.keyword.as_str()).collect();
        assert_eq!(order, ["slow", "fast", "none"]);
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let source = FakeSource::default()
            .with_items("a", vec![item("A", "u1", "d1")])
            .with_failure("b", 503)
            .with_items("c", vec![]);

        let briefing = compose(&source, &keywords(&["a", "b", "c"]), "2026/10/16 08:00:00".to_string())
            .await
            .unwrap();
        assert_eq!(briefing.failed_count(), 1);

        let text = render_briefing(&briefing);
        assert_eq!(
            text,
            "=== 热词新闻简报 (2026/10/16 08:00:00) ===\n\
             - a：\n  1. A（d1）\n     u1\n\
             - b：获取失败 (获取“b”新闻失败，状态码：503)\n\
             - c：暂无相关新闻。"
        );
    }

    #[tokio::test]
    async fn test_oversized_results_are_capped() {
        let many: Vec<FeedItem> = (0..9).map(|i| item(&format!("T{i}"), "", "")).collect();
        let source = FakeSource::default().with_items("k", many);

        let briefing = compose(&source, &keywords(&["k"]), "t".to_string()).await.unwrap();
        match &briefing.sections[0].result {
            KeywordResult::Ok { items } => {
                let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
                assert_eq!(titles, ["T0", "T1", "T2", "T3", "T4"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetches_run_concurrently() {
        tokio::time::pause();
        let source = FakeSource::default()
            .with_delay("a", Duration::from_secs(10))
            .with_delay("b", Duration::from_secs(10));

        let start = tokio::time::Instant::now();
        compose(&source, &keywords(&["a", "b"]), "t".to_string()).await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(20));
    }

    #[tokio::test]
    async fn test_empty_keywords_is_cycle_error() {
        let source = FakeSource::default();
        let err = compose(&source, &[], "t".to_string()).await.unwrap_err();
        assert!(matches!(err, CycleError::EmptyKeywords));
    }
}
