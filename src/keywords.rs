//! Keyword resolution.
//!
//! Keywords come from the first non-empty source in this order:
//! positional arguments, the `HOT_KEYWORDS` value, the config file, and
//! finally [`DEFAULT_KEYWORDS`]. Every entry is split on commas, trimmed, and
//! dropped when empty. Order is preserved and duplicates are kept.

use crate::error::ConfigError;
use tracing::{info, warn};

/// Used when no keywords were supplied anywhere.
pub const DEFAULT_KEYWORDS: &[&str] = &["中国房地产最新情况"];

/// Split raw entries on commas into trimmed, non-empty keywords.
pub fn split_keywords<S: AsRef<str>>(entries: &[S]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|entry| entry.as_ref().split(','))
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve the keyword list for this process.
///
/// With `require` set, an empty result is a [`ConfigError::NoKeywords`]
/// instead of falling back to [`DEFAULT_KEYWORDS`].
pub fn resolve_keywords(
    args: &[String],
    env_value: Option<&str>,
    file_keywords: &[String],
    require: bool,
) -> Result<Vec<String>, ConfigError> {
    let from_args = split_keywords(args);
    if !from_args.is_empty() {
        info!(count = from_args.len(), "Using keywords from arguments");
        return Ok(from_args);
    }

    let from_env = split_keywords(&[env_value.unwrap_or_default()]);
    if !from_env.is_empty() {
        info!(count = from_env.len(), "Using keywords from HOT_KEYWORDS");
        return Ok(from_env);
    }

    let from_file = split_keywords(file_keywords);
    if !from_file.is_empty() {
        info!(count = from_file.len(), "Using keywords from config file");
        return Ok(from_file);
    }

    if require {
        return Err(ConfigError::NoKeywords);
    }

    warn!(defaults = ?DEFAULT_KEYWORDS, "No keywords supplied; using built-in defaults");
    Ok(DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect())
}
