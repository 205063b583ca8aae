//! Configuration file parser for `~/.config/feedsift/config.toml`.
//!
//! The file is optional and read once at startup; nothing is ever written
//! back. Every key has a default, unknown keys are logged and ignored, and
//! a value that is present but unusable is an error.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::feed::DEFAULT_FEED_URL;
use crate::filter::{KeywordSet, MatchMode, DEFAULT_HIGHLIGHT_COLOR};
use crate::render::{DisplayMode, RenderOptions, DEFAULT_CARD_SUMMARY_WIDTH, DEFAULT_PAGE_SIZE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// File is over the 1 MB limit.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// A key parsed but its value cannot be used.
    #[error("Invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

const KNOWN_KEYS: [&str; 9] = [
    "feed_url",
    "keywords",
    "match_mode",
    "display_mode",
    "page_size",
    "highlight_color",
    "card_summary_width",
    "theme",
    "keybindings",
];

/// Narrowest Card summary that still leaves room for text before "...".
const MIN_CARD_SUMMARY_WIDTH: usize = 10;
const MAX_PAGE_SIZE: usize = 500;

/// Startup settings. Command-line flags override these.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Feed fetched on startup and on every refresh.
    pub feed_url: String,
    /// Keywords pre-filled in the keyword field.
    pub keywords: Vec<String>,
    pub match_mode: MatchMode,
    pub display_mode: DisplayMode,
    /// Entries per page.
    pub page_size: usize,
    /// CSS color token used in emphasis spans (print mode) and mapped to a
    /// terminal color in the UI when possible.
    pub highlight_color: String,
    /// Card-mode summary width in columns.
    pub card_summary_width: usize,
    /// Theme variant name ("dark" or "light").
    pub theme: String,
    /// Keybinding overrides: action name to key string.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            keywords: Vec::new(),
            match_mode: MatchMode::default(),
            display_mode: DisplayMode::default(),
            page_size: DEFAULT_PAGE_SIZE,
            highlight_color: DEFAULT_HIGHLIGHT_COLOR.to_string(),
            card_summary_width: DEFAULT_CARD_SUMMARY_WIDTH,
            theme: "dark".to_string(),
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// `$HOME/.config/feedsift/config.toml`, or `None` without a home directory.
    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(PathBuf::from(home).join(".config").join("feedsift").join("config.toml"))
    }

    /// Load configuration from a TOML file.
    ///
    /// - Missing, empty or whitespace-only file → defaults
    /// - Over 1 MB → [`ConfigError::TooLarge`]
    /// - Invalid TOML or wrong types → [`ConfigError::Parse`]
    /// - Out-of-range values → [`ConfigError::Invalid`]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::from_toml(&content)?;
        tracing::info!(
            path = %path.display(),
            feed = %config.feed_url,
            keywords = config.keywords.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid {
                key: "page_size",
                reason: format!("must be between 1 and {MAX_PAGE_SIZE}, got {}", self.page_size),
            });
        }
        if self.card_summary_width < MIN_CARD_SUMMARY_WIDTH {
            return Err(ConfigError::Invalid {
                key: "card_summary_width",
                reason: format!("must be at least {MIN_CARD_SUMMARY_WIDTH}"),
            });
        }
        if !is_color_token(&self.highlight_color) {
            return Err(ConfigError::Invalid {
                key: "highlight_color",
                reason: format!("`{}` is not a color name or #rrggbb value", self.highlight_color),
            });
        }
        if self.feed_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "feed_url",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Configured keywords, trimmed, with empty ones dropped.
    pub fn keyword_set(&self) -> KeywordSet {
        KeywordSet::from_keywords(&self.keywords)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            display: self.display_mode,
            highlight_color: self.highlight_color.clone(),
            card_summary_width: self.card_summary_width,
        }
    }
}

/// A named color (`red`, `darkorange`) or a `#rgb`/`#rrggbb` hex value.
fn is_color_token(s: &str) -> bool {
    if let Some(hex) = s.strip_prefix('#') {
        return matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("feedsift_config_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.feed_url, "https://arxiv.org/rss/astro-ph.GA");
        assert!(config.keywords.is_empty());
        assert_eq!(config.match_mode, MatchMode::Any);
        assert_eq!(config.display_mode, DisplayMode::Card);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.highlight_color, "red");
        assert_eq!(config.theme, "dark");
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/feedsift_test_nonexistent_config.toml");
        assert_eq!(Config::load(path).unwrap(), Config::default());
    }

    #[test]
    fn test_whitespace_only_returns_default() {
        let (dir, path) = write_temp("whitespace", "   \n  \n");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r##"
feed_url = "https://arxiv.org/rss/astro-ph.CO"
keywords = ["dark energy", " BAO "]
match_mode = "all"
display_mode = "title"
page_size = 25
highlight_color = "#ff8800"
card_summary_width = 120
theme = "light"

[keybindings]
quit = "Ctrl+q"
toggle_match_mode = "M"
"##;
        let (dir, path) = write_temp("full", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.feed_url, "https://arxiv.org/rss/astro-ph.CO");
        assert_eq!(config.keyword_set().as_slice(), ["dark energy", "BAO"]);
        assert_eq!(config.match_mode, MatchMode::All);
        assert_eq!(config.display_mode, DisplayMode::TitleOnly);
        assert_eq!(config.page_size, 25);
        assert_eq!(config.theme, "light");
        assert_eq!(config.keybindings.get("quit").map(String::as_str), Some("Ctrl+q"));

        let options = config.render_options();
        assert_eq!(options.highlight_color, "#ff8800");
        assert_eq!(options.card_summary_width, 120);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_toml("keywords = [\"AGN\"]\n").unwrap();
        assert_eq!(config.keywords, vec!["AGN"]);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        let err = Config::from_toml("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_unknown_match_mode_rejected() {
        assert!(matches!(
            Config::from_toml("match_mode = \"xor\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let config = Config::from_toml("theme = \"dark\"\nrefresh_interval_minutes = 5\n").unwrap();
        assert_eq!(config.theme, "dark");
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(matches!(
            Config::from_toml("page_size = 0\n"),
            Err(ConfigError::Invalid { key: "page_size", .. })
        ));
        assert!(matches!(
            Config::from_toml("card_summary_width = 3\n"),
            Err(ConfigError::Invalid { key: "card_summary_width", .. })
        ));
        assert!(matches!(
            Config::from_toml("highlight_color = \"red; x\"\n"),
            Err(ConfigError::Invalid { key: "highlight_color", .. })
        ));
        assert!(matches!(
            Config::from_toml("feed_url = \" \"\n"),
            Err(ConfigError::Invalid { key: "feed_url", .. })
        ));
    }

    #[test]
    fn test_color_tokens() {
        assert!(is_color_token("red"));
        assert!(is_color_token("DarkOrange"));
        assert!(is_color_token("#f80"));
        assert!(is_color_token("#ff8800"));
        assert!(!is_color_token("#ff88"));
        assert!(!is_color_token("#gg0000"));
        assert!(!is_color_token(""));
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_temp("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
