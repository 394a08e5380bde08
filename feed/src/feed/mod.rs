//! Feed module
//!
//! Plain-text rendering of feed snapshots for the terminal.

pub mod renderer;

pub use renderer::{render_feed, render_line, time_ago};
