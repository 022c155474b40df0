//! JSON briefing format.
//!
//! ```json
//! {
//!   "generated_at": "2026/10/16 08:00:00",
//!   "sections": [
//!     { "keyword": "芯片", "status": "ok", "items": [{ "title": "...", "link": "...", "published_at": "..." }] },
//!     { "keyword": "光伏", "status": "error", "error": "获取“光伏”新闻失败，状态码：503" }
//!   ]
//! }
//! ```

use crate::models::Briefing;

/// Serialize a briefing as a single-line JSON document.
pub fn render_briefing(briefing: &Briefing) -> Result<String, serde_json::Error> {
    serde_json::to_string(briefing)
}
