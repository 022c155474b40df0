//! Briefing renderers.
//!
//! - [`text`]: the human-readable report printed by default
//! - [`json`]: one JSON document per cycle, selected with `--json`
//!
//! ```text
//! === 热词新闻简报 (2026/10/16 08:00:00) ===
//! - 芯片：
//!   1. 某公司发布新一代芯片（Fri, 16 Oct 2026 07:12:00 GMT）
//!      https://news.google.com/rss/articles/...
//! - 新能源：暂无相关新闻。
//! - 光伏：获取失败 (获取“光伏”新闻失败，状态码：503)
//! ```

pub mod json;
pub mod text;

use crate::models::Briefing;

/// Output format for emitted briefings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

/// Render a briefing in the chosen format, without a trailing newline.
pub fn render(briefing: &Briefing, format: Format) -> Result<String, serde_json::Error> {
    match format {
        Format::Text => Ok(text::render_briefing(briefing)),
        Format::Json => json::render_briefing(briefing),
    }
}
