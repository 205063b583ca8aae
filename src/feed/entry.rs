use chrono::{DateTime, Utc};
use serde::Serialize;

/// One item from a feed, as handed to the filter and the renderers.
///
/// Entries are produced by [`parse_feed`](super::parse_feed) and never
/// mutated afterwards; filtering selects a subsequence of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
    pub title: String,
    pub summary: String,
    pub link: String,
    /// Author names in feed order. Empty when the feed carries none.
    pub authors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
}

impl FeedEntry {
    pub fn new(title: impl Into<String>, summary: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            link: link.into(),
            authors: Vec::new(),
            published: None,
        }
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Authors joined for a single display line, or `None` if there are none.
    pub fn author_line(&self) -> Option<String> {
        if self.authors.is_empty() {
            None
        } else {
            Some(self.authors.join(", "))
        }
    }
}
