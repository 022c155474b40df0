//! Feed sources that turn a keyword into a bounded list of news items.
//!
//! Every source implements [`FeedSource`]. The composer only depends on the
//! trait, so tests drive it with in-memory sources and production wires in
//! [`google_news::GoogleNewsSource`].
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | Google News search | [`google_news`] | RSS 2.0 over HTTPS |

pub mod google_news;

use crate::error::FetchError;
use crate::models::FeedItem;

/// Upper bound on the number of items kept per keyword.
pub const MAX_ITEMS: usize = 5;

/// Something that can look up recent news for a keyword.
///
/// Implementations return at most [`MAX_ITEMS`] items, in feed order. A
/// failure is reported as a [`FetchError`] and never retried.
pub trait FeedSource {
    async fn fetch(&self, keyword: &str) -> Result<Vec<FeedItem>, FetchError>;
}
