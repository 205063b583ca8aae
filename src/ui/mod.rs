//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling for the results view and keyword field
//! - `events` - Background task event processing
//! - `render` - Layout and the keyword panel
//! - `results` - Result list widget with keyword highlighting
//! - `status` - Status bar widget
//! - `help` - Keybinding overlay
//! - `helpers` - Fetch task spawning, panic capture, browser hand-off

mod events;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod results;
mod status;

pub use loop_runner::{run, Action};
