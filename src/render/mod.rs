//! Turning filtered entries into something to read.
//!
//! - [`DisplayMode`] decides how much of each entry is shown
//! - [`paginate`] slices a result list into pages
//! - [`render_document`] produces the Markdown, HTML or JSON output of
//!   print mode
//!
//! The terminal UI uses [`DisplayMode`], [`paginate`] and
//! [`summary_text`] directly and styles highlights itself.

mod document;
mod page;

pub use document::{render_document, render_html, render_json, render_markdown, Report, NO_MATCHES_MESSAGE};
pub use page::{page_count, paginate, Page, DEFAULT_PAGE_SIZE};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::feed::FeedEntry;
use crate::filter::DEFAULT_HIGHLIGHT_COLOR;
use crate::util::{strip_html, truncate_to_width};

/// Summary length in Card mode when the configuration does not set one.
pub const DEFAULT_CARD_SUMMARY_WIDTH: usize = 300;

/// Errors raised while producing output.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Requested page does not exist for this result set
    #[error("Page {page} out of range (1-{pages})")]
    PageOutOfRange { page: usize, pages: usize },
    /// JSON serialization failed
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// How much of each entry is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Title, authors and a truncated summary.
    #[default]
    Card,
    /// Title and authors only.
    #[serde(rename = "title", alias = "title_only")]
    #[value(name = "title", alias = "title-only")]
    TitleOnly,
    /// Title, authors and the whole summary.
    Full,
}

impl DisplayMode {
    /// Next mode in the Card, TitleOnly, Full cycle.
    pub fn cycle(self) -> Self {
        match self {
            Self::Card => Self::TitleOnly,
            Self::TitleOnly => Self::Full,
            Self::Full => Self::Card,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Card => "Card",
            Self::TitleOnly => "Title only",
            Self::Full => "Full",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Print-mode output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Html,
    Json,
}

/// Presentation settings shared by every renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub display: DisplayMode,
    /// CSS color token placed in emphasis spans.
    pub highlight_color: String,
    /// Maximum width, in columns, of a Card-mode summary.
    pub card_summary_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            display: DisplayMode::default(),
            highlight_color: DEFAULT_HIGHLIGHT_COLOR.to_string(),
            card_summary_width: DEFAULT_CARD_SUMMARY_WIDTH,
        }
    }
}

/// Plain-text summary of `entry` as `display` wants it, or `None` when the
/// mode shows no summary.
pub fn summary_text(entry: &FeedEntry, display: DisplayMode, card_width: usize) -> Option<String> {
    match display {
        DisplayMode::TitleOnly => None,
        DisplayMode::Card => {
            let text = strip_html(&entry.summary);
            Some(truncate_to_width(&text, card_width).into_owned())
        }
        DisplayMode::Full => Some(strip_html(&entry.summary)),
    }
}
