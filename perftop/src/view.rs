//! View-models the dashboard panels render: metric cards, stats rows, network deltas.

use crate::format::{format_bytes, format_optional_percent, format_percent};
use crate::types::{Sample, Stats};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricCard {
    pub title: &'static str,
    pub value: String,
    pub subtitle: String,
}

pub fn metric_cards(s: &Sample) -> [MetricCard; 4] {
    [
        MetricCard {
            title: "CPU Usage",
            value: format_percent(s.cpu_percent),
            subtitle: "Current CPU utilization".into(),
        },
        MetricCard {
            title: "Memory Usage",
            value: format_percent(s.memory_percent),
            subtitle: format!(
                "{} / {}",
                format_bytes(s.memory_used_bytes),
                format_bytes(s.memory_total_bytes)
            ),
        },
        MetricCard {
            title: "Network Sent",
            value: format_bytes(s.network_sent_bytes),
            subtitle: "Total bytes sent".into(),
        },
        MetricCard {
            title: "Network Received",
            value: format_bytes(s.network_recv_bytes),
            subtitle: "Total bytes received".into(),
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRow {
    pub label: &'static str,
    pub value: String,
}

/// Average/max rows plus the sample count. An empty window shows absent
/// markers instead of numbers.
pub fn stat_rows(stats: &Stats) -> Vec<StatRow> {
    let cpu = stats.cpu_summary();
    let mem = stats.memory_summary();
    vec![
        StatRow {
            label: "CPU Average",
            value: format_optional_percent(cpu.and_then(|a| a.average)),
        },
        StatRow {
            label: "CPU Max",
            value: format_optional_percent(cpu.and_then(|a| a.maximum)),
        },
        StatRow {
            label: "Memory Average",
            value: format_optional_percent(mem.and_then(|a| a.average)),
        },
        StatRow {
            label: "Memory Max",
            value: format_optional_percent(mem.and_then(|a| a.maximum)),
        },
        StatRow {
            label: "Total Samples",
            value: stats.total_samples.to_string(),
        },
    ]
}

pub fn stats_title(stats: &Stats) -> String {
    match stats.time_range_hours {
        Some(h) => format!("Statistics (Last {h} Hours)"),
        None => "Statistics".into(),
    }
}

/// Growth of a cumulative counter. `None` when it went backwards (collector restart).
pub fn counter_delta(prev: u64, cur: u64) -> Option<u64> {
    cur.checked_sub(prev)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetDelta {
    pub sent: Option<u64>,
    pub recv: Option<u64>,
}

/// Network growth between the two newest samples of a newest-first history.
pub fn latest_net_delta(history: &[Sample]) -> Option<NetDelta> {
    let [cur, prev, ..] = history else {
        return None;
    };
    Some(NetDelta {
        sent: counter_delta(prev.network_sent_bytes, cur.network_sent_bytes),
        recv: counter_delta(prev.network_recv_bytes, cur.network_recv_bytes),
    })
}

pub fn describe_delta(delta: Option<u64>) -> String {
    match delta {
        Some(d) => format!("+{} since previous sample", format_bytes(d)),
        None => "counter reset since previous sample".into(),
    }
}
