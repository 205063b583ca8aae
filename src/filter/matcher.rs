use regex::{Regex, RegexBuilder};
use std::ops::Range;

use super::{KeywordSet, MatchMode};
use crate::feed::FeedEntry;

/// Characters that make up a word for boundary purposes.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True if `text[range]` is neither preceded nor followed by a word character.
fn is_bounded(text: &str, range: &Range<usize>) -> bool {
    let before = text[..range.start].chars().next_back();
    let after = text[range.end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Whole-word, case-insensitive matcher for one keyword.
///
/// The keyword is escaped before compilation, so `C++` or `H(alpha)` are
/// matched literally. A hit only counts when it is bounded by non-word
/// characters or the string edges: `AGN` hits "AGN detected" but not
/// "MAGNETAR".
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keyword: String,
    pattern: Option<Regex>,
}

impl KeywordMatcher {
    pub fn new(keyword: &str) -> Self {
        let pattern = match RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()
        {
            Ok(re) => Some(re),
            Err(e) => {
                // Only reachable for keywords beyond the compiled size limit
                tracing::warn!(keyword = %keyword, error = %e, "Keyword cannot be matched");
                None
            }
        };
        Self {
            keyword: keyword.to_string(),
            pattern,
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Byte ranges of every whole-word occurrence, in order, non-overlapping.
    pub fn find_iter<'a>(&'a self, text: &'a str) -> WholeWordMatches<'a> {
        WholeWordMatches {
            pattern: self.pattern.as_ref(),
            text,
            pos: 0,
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.find_iter(text).next().is_some()
    }
}

/// Iterator returned by [`KeywordMatcher::find_iter`].
///
/// A candidate that fails the boundary test does not consume its whole
/// length; scanning resumes one character later so an overlapping,
/// properly bounded occurrence is still found.
pub struct WholeWordMatches<'a> {
    pattern: Option<&'a Regex>,
    text: &'a str,
    pos: usize,
}

impl Iterator for WholeWordMatches<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let pattern = self.pattern?;
        while self.pos <= self.text.len() {
            let m = pattern.find_at(self.text, self.pos)?;
            let range = m.range();
            if range.is_empty() {
                return None;
            }
            if is_bounded(self.text, &range) {
                self.pos = range.end;
                return Some(range);
            }
            let step = self.text[range.start..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            self.pos = range.start + step;
        }
        None
    }
}

/// Compiled matchers for a whole [`KeywordSet`], in keyword order.
#[derive(Debug, Clone, Default)]
pub struct KeywordMatchers {
    matchers: Vec<KeywordMatcher>,
}

impl KeywordMatchers {
    pub fn new(keywords: &KeywordSet) -> Self {
        Self {
            matchers: keywords.iter().map(KeywordMatcher::new).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeywordMatcher> {
        self.matchers.iter()
    }

    /// Per-keyword hit: a match in the title or in the summary.
    fn hits(matcher: &KeywordMatcher, entry: &FeedEntry) -> bool {
        matcher.is_match(&entry.title) || matcher.is_match(&entry.summary)
    }

    /// Inclusion decision for one entry under `mode`.
    pub fn matches_entry(&self, entry: &FeedEntry, mode: MatchMode) -> bool {
        match mode {
            MatchMode::Any => self.matchers.iter().any(|m| Self::hits(m, entry)),
            MatchMode::All => self.matchers.iter().all(|m| Self::hits(m, entry)),
        }
    }

    /// Keep the entries that pass, in their original order.
    ///
    /// With no keywords at all the input is returned unchanged; callers are
    /// expected to refuse that case before fetching.
    pub fn filter(&self, entries: &[FeedEntry], mode: MatchMode) -> Vec<FeedEntry> {
        if self.is_empty() {
            return entries.to_vec();
        }
        entries
            .iter()
            .filter(|entry| self.matches_entry(entry, mode))
            .cloned()
            .collect()
    }
}
