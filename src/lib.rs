//! feedsift: fetch an arXiv RSS feed, keep the entries that match a set of
//! keywords, and show them with the keywords highlighted.
//!
//! The filtering core ([`filter`]) is independent of any front end. The
//! binary drives it either through the terminal UI ([`ui`]) or in print
//! mode through [`render`].

pub mod app;
pub mod config;
pub mod feed;
pub mod filter;
pub mod keybindings;
pub mod render;
pub mod theme;
pub mod ui;
pub mod util;
