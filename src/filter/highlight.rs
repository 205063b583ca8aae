use std::fmt::Write as _;
use std::ops::Range;

use super::{KeywordMatchers, KeywordSet};
use crate::util::html_tag_len;

/// Color used when the configuration does not name one.
pub const DEFAULT_HIGHLIGHT_COLOR: &str = "red";

const EMPHASIS_CLOSE: &str = "</span>";

/// One keyword occurrence selected for emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    /// Byte offset of the first highlighted character.
    pub start: usize,
    /// Byte offset one past the last highlighted character.
    pub end: usize,
    /// Index of the keyword in its [`KeywordSet`] that claimed this span.
    pub keyword: usize,
}

impl HighlightSpan {
    fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    fn overlaps(&self, other: &Range<usize>) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Choose the non-overlapping keyword occurrences to emphasize in `text`.
///
/// Keywords are visited in order and an earlier keyword keeps every span it
/// claims; a later keyword only gets the occurrences that overlap nothing
/// already taken. Occurrences inside markup (a tag, or an emphasis span this
/// module produced earlier) are never selected. The result is sorted by
/// start offset.
pub fn highlight_spans(text: &str, matchers: &KeywordMatchers) -> Vec<HighlightSpan> {
    if matchers.is_empty() || text.is_empty() {
        return Vec::new();
    }

    let protected = markup_regions(text);
    let mut spans: Vec<HighlightSpan> = Vec::new();

    for (keyword, matcher) in matchers.iter().enumerate() {
        for range in matcher.find_iter(text) {
            let in_markup = protected
                .iter()
                .any(|p| p.start < range.end && range.start < p.end);
            if in_markup || spans.iter().any(|s| s.overlaps(&range)) {
                continue;
            }
            spans.push(HighlightSpan {
                start: range.start,
                end: range.end,
                keyword,
            });
        }
    }

    spans.sort_by_key(|s| s.start);
    spans
}

/// Wrap every whole-word keyword occurrence in an emphasis span.
///
/// The matched text keeps its original casing. Running the result through
/// this function again with the same keywords changes nothing.
///
/// ```
/// use feedsift::filter::{highlight, KeywordSet};
///
/// let keywords = KeywordSet::parse("agn");
/// assert_eq!(
///     highlight("AGN feedback", &keywords, "red"),
///     "<span style=\"color:red; font-weight:bold;\">AGN</span> feedback",
/// );
/// ```
pub fn highlight(text: &str, keywords: &KeywordSet, color: &str) -> String {
    highlight_with(text, &KeywordMatchers::new(keywords), color)
}

/// [`highlight`] with matchers compiled once by the caller.
pub fn highlight_with(text: &str, matchers: &KeywordMatchers, color: &str) -> String {
    highlight_escaped(text, matchers, color, str::to_string)
}

/// Highlight plain `text` for an output format with its own escaping.
///
/// Keyword occurrences are found in `text` as given, then `escape` is
/// applied to every piece of it, inside and outside the emphasis spans.
/// Escaping first would hide keywords such as `[OIII]` from the matcher.
pub fn highlight_escaped<F>(text: &str, matchers: &KeywordMatchers, color: &str, escape: F) -> String
where
    F: Fn(&str) -> String,
{
    let spans = highlight_spans(text, matchers);
    if spans.is_empty() {
        return escape(text);
    }

    let color = sanitize_color(color);
    let mut out = String::with_capacity(text.len() + spans.len() * 48);
    let mut last = 0;
    for span in &spans {
        out.push_str(&escape(&text[last..span.start]));
        let _ = write!(
            out,
            "<span style=\"color:{}; font-weight:bold;\">{}{}",
            color,
            escape(&text[span.range()]),
            EMPHASIS_CLOSE
        );
        last = span.end;
    }
    out.push_str(&escape(&text[last..]));
    out
}

/// Keep only characters that are valid in a CSS color token.
fn sanitize_color(color: &str) -> &str {
    let valid = !color.is_empty()
        && color
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '#' | '(' | ')' | ',' | '.' | '%' | ' '));
    if valid {
        color
    } else {
        DEFAULT_HIGHLIGHT_COLOR
    }
}

/// Byte ranges of `text` that belong to markup.
///
/// Tags are recognized by [`html_tag_len`], so a `<` in prose protects
/// nothing. An opening `<span>` whose style sets `font-weight:bold` extends
/// its region to the matching close tag so its text is not emphasized twice.
fn markup_regions(text: &str) -> Vec<Range<usize>> {
    let mut regions = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('<') {
        let start = pos + offset;
        let Some(len) = html_tag_len(&text[start..]) else {
            pos = start + 1;
            continue;
        };
        let tag_end = start + len;

        let end = if is_emphasis_open(&text[start..tag_end]) {
            text[tag_end..]
                .find(EMPHASIS_CLOSE)
                .map_or(text.len(), |i| tag_end + i + EMPHASIS_CLOSE.len())
        } else {
            tag_end
        };
        regions.push(start..end);
        pos = end;
    }

    regions
}

fn is_emphasis_open(tag: &str) -> bool {
    let compact: String = tag
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    compact.starts_with("<span") && compact.contains("font-weight:bold")
}
