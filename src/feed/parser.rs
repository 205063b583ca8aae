use anyhow::Result;
use feed_rs::parser;

use super::FeedEntry;
use crate::util::strip_control_chars;

/// Entries recovered from a feed document.
#[derive(Debug, Default)]
pub struct ParseResult {
    pub entries: Vec<FeedEntry>,
    /// Items dropped because they carried no link.
    pub skipped: usize,
}

/// Parse an RSS or Atom document into [`FeedEntry`] values, keeping feed order.
pub fn parse_feed(bytes: &[u8]) -> Result<ParseResult> {
    let feed = parser::parse(bytes)?;

    let mut skipped = 0;
    let entries: Vec<FeedEntry> = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let Some(link) = entry.links.first().map(|l| l.href.trim().to_string()) else {
                skipped += 1;
                return None;
            };
            if link.is_empty() {
                skipped += 1;
                return None;
            }

            let title = entry
                .title
                .map(|t| t.content)
                .unwrap_or_else(|| "Untitled".to_string());
            let summary = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .unwrap_or_default();
            let authors = split_authors(entry.authors.into_iter().map(|p| p.name));
            let published = entry.published.or(entry.updated);

            Some(FeedEntry {
                title: strip_control_chars(title.trim()).into_owned(),
                summary: strip_control_chars(summary.trim()).into_owned(),
                link,
                authors,
                published,
            })
        })
        .collect();

    Ok(ParseResult { entries, skipped })
}

/// arXiv packs every author into a single comma-separated `dc:creator`.
/// Split those, keep separate `<author>` elements as they are.
fn split_authors(names: impl Iterator<Item = String>) -> Vec<String> {
    names
        .flat_map(|name| {
            name.split(',')
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect::<Vec<_>>()
        })
        .collect()
}
