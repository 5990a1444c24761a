//! File-backed tracing. The terminal belongs to the dashboard, so logs go to
//! `<config dir>/perftop.log`, and only when a filter is set.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::config::config_dir;

pub const ENV_LOG: &str = "PERFTOP_LOG";

/// `PERFTOP_LOG` first, then `RUST_LOG`.
pub fn log_filter() -> Option<String> {
    [ENV_LOG, "RUST_LOG"]
        .iter()
        .find_map(|k| std::env::var(k).ok().filter(|v| !v.trim().is_empty()))
}

pub fn log_path() -> PathBuf {
    config_dir().join("perftop.log")
}

/// Installs the subscriber when a filter is configured. Returns the log file path if it did.
pub fn init() -> anyhow::Result<Option<PathBuf>> {
    let Some(filter) = log_filter() else {
        return Ok(None);
    };
    let path = log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;
    Ok(Some(path))
}
