//! Small helpers shared by the feed parser, renderers and UI.
//!
//! - **URL validation**: feed URLs (no local or private hosts) and entry links
//!   opened in the browser (http/https only)
//! - **Text**: terminal width, truncation, control-character and HTML stripping
//!
//! ```
//! use feedsift::util::{display_width, strip_html, truncate_to_width, validate_url};
//!
//! assert!(validate_url("https://arxiv.org/rss/astro-ph.GA").is_ok());
//! assert_eq!(display_width("AGN"), 3);
//! assert_eq!(truncate_to_width("Metallicity gradients", 14), "Metallicity...");
//! assert_eq!(strip_html("<p>AGN</p>"), "AGN");
//! ```

mod html;
mod text;
mod url_validator;

pub use html::{html_tag_len, strip_html};
pub use text::{display_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_url, validate_url_for_open, UrlValidationError};

/// Longest keyword field the UI accepts, in characters.
pub const MAX_KEYWORD_INPUT_LENGTH: usize = 1024;
