//! Keyword filtering and highlighting.
//!
//! - [`keywords`] - Parsing the comma-separated keyword field and the match mode
//! - [`matcher`] - Whole-word, case-insensitive matching and the inclusion rule
//! - [`highlight`] - Emphasis of keyword occurrences in rendered text
//!
//! [`fetch_filtered`] ties the pieces to a [`FeedSource`]: fetch once, then
//! keep the entries that pass under the chosen [`MatchMode`].

mod highlight;
mod keywords;
mod matcher;

pub use highlight::{
    highlight, highlight_escaped, highlight_spans, highlight_with, HighlightSpan, DEFAULT_HIGHLIGHT_COLOR,
};
pub use keywords::{KeywordSet, MatchMode};
pub use matcher::{KeywordMatcher, KeywordMatchers, WholeWordMatches};

use crate::feed::{FeedEntry, FeedSource, FetchError};

/// Keep the entries of `entries` that satisfy `keywords` under `mode`.
///
/// An entry passes a keyword when the keyword occurs as a whole word in its
/// title or its summary. Order is preserved. With an empty keyword set the
/// input comes back unchanged.
pub fn filter_feed(entries: &[FeedEntry], keywords: &KeywordSet, mode: MatchMode) -> Vec<FeedEntry> {
    KeywordMatchers::new(keywords).filter(entries, mode)
}

/// Result of one fetch-and-filter pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredFeed {
    /// Number of entries in the fetched feed before filtering.
    pub fetched: usize,
    pub entries: Vec<FeedEntry>,
}

/// Fetch `url` from `source` and filter the result.
pub async fn fetch_filtered<S: FeedSource>(
    source: &S,
    url: &str,
    keywords: &KeywordSet,
    mode: MatchMode,
) -> Result<FilteredFeed, FetchError> {
    let entries = source.fetch(url).await?;
    let filtered = filter_feed(&entries, keywords, mode);
    tracing::info!(
        feed = %url,
        fetched = entries.len(),
        matched = filtered.len(),
        mode = %mode,
        "Feed filtered"
    );
    Ok(FilteredFeed {
        fetched: entries.len(),
        entries: filtered,
    })
}
