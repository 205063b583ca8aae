use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered list of keywords taken from a comma-separated input field.
///
/// Every keyword is trimmed and non-empty. Order is kept and duplicates are
/// allowed: a duplicate never changes a filter decision and only repeats
/// work in the highlighter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet(Vec<String>);

impl KeywordSet {
    /// Split `input` on commas, trim each token and drop the empty ones.
    ///
    /// ```
    /// use feedsift::filter::KeywordSet;
    ///
    /// let set = KeywordSet::parse(" metallicity, galaxy cluster,,AGN ");
    /// assert_eq!(set.as_slice(), ["metallicity", "galaxy cluster", "AGN"]);
    /// ```
    pub fn parse(input: &str) -> Self {
        Self::from_keywords(input.split(','))
    }

    /// Build a set from already-separated keywords, applying the same trimming.
    pub fn from_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for KeywordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// How per-keyword hits combine into one inclusion decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// At least one keyword must match (OR).
    #[default]
    #[serde(alias = "or")]
    #[value(alias = "or")]
    Any,
    /// Every keyword must match (AND).
    #[serde(alias = "and")]
    #[value(alias = "and")]
    All,
}

impl MatchMode {
    /// The other mode; the selector only ever has these two options.
    pub fn toggle(self) -> Self {
        match self {
            Self::Any => Self::All,
            Self::All => Self::Any,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Any => "ANY (OR)",
            Self::All => "ALL (AND)",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Any => "any",
            Self::All => "all",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_and_trims() {
        let set = KeywordSet::parse("metallicity, galaxy cluster , AGN");
        assert_eq!(set.as_slice(), ["metallicity", "galaxy cluster", "AGN"]);
    }

    #[test]
    fn test_parse_drops_empty_tokens() {
        let set = KeywordSet::parse(" , ,AGN,, ");
        assert_eq!(set.as_slice(), ["AGN"]);
        assert!(KeywordSet::parse("  ,  ").is_empty());
        assert!(KeywordSet::parse("").is_empty());
    }

    #[test]
    fn test_parse_keeps_order_and_duplicates() {
        let set = KeywordSet::parse("b, a, b");
        assert_eq!(set.as_slice(), ["b", "a", "b"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_display_joins_with_comma() {
        let set = KeywordSet::from_keywords(["AGN", " quasar "]);
        assert_eq!(set.to_string(), "AGN, quasar");
    }

    #[test]
    fn test_match_mode_toggle() {
        assert_eq!(MatchMode::Any.toggle(), MatchMode::All);
        assert_eq!(MatchMode::All.toggle(), MatchMode::Any);
        assert_eq!(MatchMode::default(), MatchMode::Any);
    }

    #[test]
    fn test_match_mode_deserialize_aliases() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: MatchMode,
        }
        let w: Wrapper = toml::from_str("mode = \"and\"").unwrap();
        assert_eq!(w.mode, MatchMode::All);
        let w: Wrapper = toml::from_str("mode = \"any\"").unwrap();
        assert_eq!(w.mode, MatchMode::Any);
        assert!(toml::from_str::<Wrapper>("mode = \"xor\"").is_err());
    }
}
