//! Resolves the dashboard [`Settings`] from CLI flags, saved profiles and the environment.
//!
//! A profile names a collector (`base_url`, optional `timeout_secs`) in
//! `profiles.json` inside [`config_dir`]. Base URL precedence: CLI argument,
//! then profile, then `PERFTOP_API_URL`, then the local default.

use std::num::NonZeroU32;
use std::time::Duration;
use std::{collections::BTreeMap, fs, path::PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cli::CliArgs;
use crate::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::sync::{SyncOptions, HISTORY_WINDOW_HOURS, REFRESH_PERIOD};
use crate::window::DEFAULT_MAX_POINTS;

pub const ENV_API_URL: &str = "PERFTOP_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "PERFTOP_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProfileEntry {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileEntry>,
    #[serde(default)]
    pub version: u32,
}

/// `$XDG_CONFIG_HOME/perftop`, else the platform config dir. Also holds the log file.
pub fn config_dir() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dirs_next::config_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("perftop")
}

pub fn profiles_path() -> PathBuf {
    config_dir().join("profiles.json")
}

/// A missing or unreadable profiles file counts as empty; the next save rewrites it.
pub fn load_profiles() -> ProfilesFile {
    fs::read(profiles_path())
        .ok()
        .and_then(|raw| serde_json::from_slice(&raw).ok())
        .unwrap_or_default()
}

pub fn save_profiles(profiles: &ProfilesFile) -> std::io::Result<()> {
    fs::create_dir_all(config_dir())?;
    fs::write(profiles_path(), serde_json::to_vec_pretty(profiles)?)
}

/// Environment inputs, captured once so resolution stays pure.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub api_url: Option<String>,
    pub timeout_secs: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let non_empty = |k: &str| std::env::var(k).ok().filter(|v| !v.trim().is_empty());
        Self {
            api_url: non_empty(ENV_API_URL),
            timeout_secs: non_empty(ENV_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: Url,
    pub timeout: Duration,
    pub window_hours: NonZeroU32,
    pub refresh_period: Duration,
    pub auto_refresh: bool,
    pub max_points: usize,
}

impl Settings {
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            period: self.refresh_period,
            window_hours: self.window_hours,
            auto_refresh: self.auto_refresh,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileChange {
    /// Nothing to write.
    Unchanged,
    /// First use of this profile name.
    Created(String, ProfileEntry),
    /// Existing profile overwritten because `--save` was given.
    Updated(String, ProfileEntry),
    /// Arguments differ from the stored profile but `--save` was not given.
    NotSaved(String),
}

#[derive(Debug, Clone)]
pub struct Resolved {
    pub settings: Settings,
    pub change: ProfileChange,
}

pub fn resolve(args: &CliArgs, profiles: &ProfilesFile, env: &EnvOverrides) -> anyhow::Result<Resolved> {
    let stored = args
        .profile
        .as_ref()
        .map(|name| (name, profiles.profiles.get(name)));

    let (raw_url, profile_timeout, change) = match (stored, &args.base_url) {
        (Some((name, existing)), Some(url)) => {
            let entry = ProfileEntry {
                base_url: url.clone(),
                timeout_secs: args.timeout_secs.or(existing.and_then(|e| e.timeout_secs)),
            };
            let change = match existing {
                None => ProfileChange::Created(name.clone(), entry.clone()),
                Some(e) if *e == entry => ProfileChange::Unchanged,
                Some(_) if args.save => ProfileChange::Updated(name.clone(), entry.clone()),
                Some(_) => ProfileChange::NotSaved(name.clone()),
            };
            (url.clone(), entry.timeout_secs, change)
        }
        (Some((_, Some(entry))), None) => {
            (entry.base_url.clone(), entry.timeout_secs, ProfileChange::Unchanged)
        }
        (Some((name, None)), None) => {
            bail!("profile '{name}' does not exist; pass a base URL to create it")
        }
        (None, Some(url)) => (url.clone(), None, ProfileChange::Unchanged),
        (None, None) => (
            env.api_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            None,
            ProfileChange::Unchanged,
        ),
    };

    let base_url = parse_base_url(&raw_url)?;

    let env_timeout = env
        .timeout_secs
        .as_deref()
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .with_context(|| format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got {v:?}"))
        })
        .transpose()?;
    let timeout = args
        .timeout_secs
        .or(profile_timeout)
        .or(env_timeout)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);
    if timeout.is_zero() {
        bail!("request timeout must be greater than zero");
    }

    Ok(Resolved {
        settings: Settings {
            base_url,
            timeout,
            window_hours: args.hours.unwrap_or(HISTORY_WINDOW_HOURS),
            refresh_period: REFRESH_PERIOD,
            auto_refresh: !args.no_auto_refresh,
            max_points: DEFAULT_MAX_POINTS,
        },
        change,
    })
}

fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid base URL {raw:?}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("base URL must use http or https, got {:?}", url.scheme());
    }
    Ok(url)
}

/// Writes a created/updated profile back to disk.
pub fn persist_change(profiles: &mut ProfilesFile, change: &ProfileChange) -> std::io::Result<()> {
    match change {
        ProfileChange::Created(name, entry) | ProfileChange::Updated(name, entry) => {
            profiles.profiles.insert(name.clone(), entry.clone());
            save_profiles(profiles)
        }
        ProfileChange::Unchanged | ProfileChange::NotSaved(_) => Ok(()),
    }
}
