//! A minimal two-pane RSS/Atom reader for the terminal.
//!
//! Feeds come from an INI config file, are fetched up front, and the feed
//! on display is re-fetched on a timer. Activating an article hands its link
//! to an external browser.

pub mod app;
pub mod browser;
pub mod config;
pub mod feed;
pub mod ui;
