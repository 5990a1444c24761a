//! Bounded, chronologically ascending series for the charts.

use chrono::{DateTime, FixedOffset};

use crate::types::Sample;

/// Enough points to show a trend without making every redraw expensive.
pub const DEFAULT_MAX_POINTS: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    /// Clock time on the collector, `HH:MM:SS`.
    pub time: String,
    pub cpu: f64,
    pub memory: f64,
    pub timestamp: DateTime<FixedOffset>,
}

impl From<&Sample> for SeriesPoint {
    fn from(s: &Sample) -> Self {
        Self {
            time: s.timestamp.format("%H:%M:%S").to_string(),
            cpu: s.cpu_percent,
            memory: s.memory_percent,
            timestamp: s.timestamp,
        }
    }
}

/// The `max_points` newest samples by timestamp, oldest first. Input order does
/// not matter; duplicate timestamps collapse to one point.
pub fn window_series(history: &[Sample], max_points: usize) -> Vec<SeriesPoint> {
    newest_ascending(history, |s| s.timestamp, max_points)
        .into_iter()
        .map(SeriesPoint::from)
        .collect()
}

fn newest_ascending<T, F>(items: &[T], key: F, max_points: usize) -> Vec<&T>
where
    F: Fn(&T) -> DateTime<FixedOffset>,
{
    let mut recent: Vec<&T> = items.iter().collect();
    recent.sort_by_key(|item| std::cmp::Reverse(key(item)));
    recent.dedup_by_key(|item| key(item));
    recent.truncate(max_points);
    recent.reverse();
    recent
}
