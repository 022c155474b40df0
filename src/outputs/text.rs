//! Plain-text briefing format.
//!
//! One header line with the generation timestamp, then one section per
//! keyword in input order:
//!
//! - no items: `- <keyword>：暂无相关新闻。`
//! - items: `- <keyword>：` followed by `  i. <title>（<date>）` and an
//!   indented link line per item
//! - failure: `- <keyword>：获取失败 (<message>)`

use crate::models::{Briefing, FeedItem, KeywordResult, Section};
use itertools::Itertools;

/// Render a keyword that fetched successfully.
pub fn format_items(keyword: &str, items: &[FeedItem]) -> String {
    if items.is_empty() {
        return format!("- {keyword}：暂无相关新闻。");
    }

    let lines = items.iter().enumerate().map(|(i, item)| {
        let date = if item.published_at.is_empty() {
            String::new()
        } else {
            format!("（{}）", item.published_at)
        };
        format!("  {}. {}{}\n     {}", i + 1, item.title, date, item.link)
            .trim_end()
            .to_string()
    });

    std::iter::once(format!("- {keyword}："))
        .chain(lines)
        .join("\n")
}

/// Render a keyword whose fetch failed.
pub fn format_failure(keyword: &str, message: &str) -> String {
    format!("- {keyword}：获取失败 ({message})")
}

pub fn format_section(section: &Section) -> String {
    match &section.result {
        KeywordResult::Ok { items } => format_items(&section.keyword, items),
        KeywordResult::Error { error } => format_failure(&section.keyword, error),
    }
}

pub fn format_header(generated_at: &str) -> String {
    format!("=== 热词新闻简报 ({generated_at}) ===")
}

/// Header and sections, newline joined.
pub fn render_briefing(briefing: &Briefing) -> String {
    std::iter::once(format_header(&briefing.generated_at))
        .chain(briefing.sections.iter().map(format_section))
        .join("\n")
}
