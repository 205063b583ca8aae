//! Feed retrieval and parsing.
//!
//! - **Parsing**: Convert RSS/Atom XML into [`FeedEntry`] values
//! - **Fetching**: HTTP retrieval with retry logic, timeouts and size limits
//!
//! # Architecture
//!
//! - [`entry`] - The entry model shared with the filter and renderers
//! - [`parser`] - Low-level feed parsing using the `feed-rs` crate
//! - [`fetcher`] - The [`FeedSource`] seam and its HTTP implementation
//!
//! # Example
//!
//! ```ignore
//! use feedsift::feed::{FeedSource, HttpFeedSource};
//!
//! let source = HttpFeedSource::new(reqwest::Client::new());
//! let entries = source.fetch("https://arxiv.org/rss/astro-ph.GA").await?;
//! ```

mod entry;
mod fetcher;
mod parser;

pub use entry::FeedEntry;
pub use fetcher::{FeedSource, FetchError, HttpFeedSource};
pub use parser::{parse_feed, ParseResult};

/// Feed fetched when neither the config file nor the command line names one.
pub const DEFAULT_FEED_URL: &str = "https://arxiv.org/rss/astro-ph.GA";
