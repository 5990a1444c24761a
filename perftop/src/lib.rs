//! perftop: a terminal dashboard for a remote host-performance collector.
//!
//! The library holds everything but argument handling: the HTTP client, the
//! refresh controller, the pure formatting/windowing helpers and the ratatui panels.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod sync;
pub mod types;
pub mod ui;
pub mod view;
pub mod window;
