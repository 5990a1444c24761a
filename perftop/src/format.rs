//! Pure formatting helpers: human-readable sizes, percentages, disk rows, severity tiers.

use crate::types::DiskUsageMap;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// `0 -> "0 B"`, `1536 -> "1.5 KB"`. Base 1024, two decimals at most, capped at TB.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".into();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{} {}", trim_decimals(value), UNITS[unit])
}

/// `42.0 -> "42%"`, `70.456 -> "70.46%"`. Non-finite values render as absent.
pub fn format_percent(pct: f64) -> String {
    if !pct.is_finite() {
        return ABSENT.into();
    }
    format!("{}%", trim_decimals(pct))
}

pub const ABSENT: &str = "—";

pub fn format_optional_percent(pct: Option<f64>) -> String {
    pct.map(format_percent).unwrap_or_else(|| ABSENT.into())
}

// Round to 2 places and drop trailing zeros
fn trim_decimals(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    let s = format!("{rounded:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".into() } else { s.to_string() }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiskRow {
    pub device: String,
    pub mountpoint: Option<String>,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub total_bytes: u64,
    pub percent: f64,
}

/// Disk map -> rows in the collector's key order. A missing or non-finite
/// reported percent is recomputed from used/total.
pub fn derive_disk_rows(disks: &DiskUsageMap) -> Vec<DiskRow> {
    disks
        .iter()
        .map(|(device, d)| {
            let percent = match d.percent.filter(|p| p.is_finite()) {
                Some(p) => p,
                None if d.total_bytes > 0 => d.used_bytes as f64 / d.total_bytes as f64 * 100.0,
                None => 0.0,
            };
            DiskRow {
                device: device.to_string(),
                mountpoint: d.mountpoint.clone(),
                used_bytes: d.used_bytes,
                free_bytes: d.free_bytes,
                total_bytes: d.total_bytes,
                percent,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

/// `> 80` critical, `> 60` warning, otherwise normal.
pub fn severity(percent: f64) -> Severity {
    if percent > 80.0 {
        Severity::Critical
    } else if percent > 60.0 {
        Severity::Warning
    } else {
        Severity::Normal
    }
}

pub fn truncate_middle(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        return s.to_string();
    }
    if max <= 3 {
        return "...".into();
    }
    let keep = max - 3;
    let left = keep / 2;
    let right = keep - left;
    let head: String = s.chars().take(left).collect();
    let tail: String = s.chars().skip(len - right).collect();
    format!("{head}...{tail}")
}

pub fn disk_icon(name: &str) -> &'static str {
    let n = name.to_ascii_lowercase();
    if n.contains(':') {
        "🗄️"
    } else if n.contains("nvme") {
        "⚡"
    } else if n.contains("/sd") || n.starts_with("sd") {
        "💽"
    } else if n.contains("overlay") {
        "📦"
    } else {
        "🖴"
    }
}
