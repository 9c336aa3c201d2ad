//! Terminal User Interface module.
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `render` - Layout of the two panes and the status bar
//! - `feeds` - Feed list widget
//! - `articles` - Article list widget
//! - `status` - Status bar widget

mod articles;
mod feeds;
mod input;
mod loop_runner;
mod render;
mod status;

pub use loop_runner::{run, WINDOW_TITLE};
