//! Small helpers for timestamps and log formatting.

use chrono::{DateTime, Local};

/// Format a local wall-clock time the way the briefing header shows it,
/// e.g. `2026/10/16 08:05:09` (24-hour clock, no zero padding on month/day).
pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format("%Y/%-m/%-d %H:%M:%S").to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes, on a character boundary,
/// with `"…(+N bytes)"` appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}
