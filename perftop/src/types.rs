//! Types that mirror the collector's JSON schema.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Usage of one mounted device as reported by the collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskUsage {
    #[serde(rename = "used")]
    pub used_bytes: u64,
    #[serde(rename = "free")]
    pub free_bytes: u64,
    #[serde(rename = "total")]
    pub total_bytes: u64,
    /// Absent on some collectors; rows recompute it from used/total.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mountpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fstype: Option<String>,
}

/// Device name -> usage, kept in the order the collector sent the keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskUsageMap(Vec<(String, DiskUsage)>);

impl DiskUsageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a device; a replaced device keeps its original position.
    pub fn insert(&mut self, device: impl Into<String>, usage: DiskUsage) {
        let device = device.into();
        match self.0.iter_mut().find(|(name, _)| *name == device) {
            Some(slot) => slot.1 = usage,
            None => self.0.push((device, usage)),
        }
    }

    pub fn get(&self, device: &str) -> Option<&DiskUsage> {
        self.0
            .iter()
            .find(|(name, _)| name == device)
            .map(|(_, usage)| usage)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DiskUsage)> {
        self.0.iter().map(|(name, usage)| (name.as_str(), usage))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, DiskUsage)> for DiskUsageMap {
    fn from_iter<I: IntoIterator<Item = (String, DiskUsage)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (device, usage) in iter {
            map.insert(device, usage);
        }
        map
    }
}

impl Serialize for DiskUsageMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (device, usage) in &self.0 {
            map.serialize_entry(device, usage)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DiskUsageMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = DiskUsageMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of device name to disk usage")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
                let mut map = DiskUsageMap::new();
                while let Some((device, usage)) = access.next_entry::<String, DiskUsage>()? {
                    map.insert(device, usage);
                }
                Ok(map)
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(DiskUsageMap::new())
            }
        }

        deserializer.deserialize_any(OrderedVisitor)
    }
}

/// One point-in-time host measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(with = "collector_time")]
    pub timestamp: DateTime<FixedOffset>,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    #[serde(rename = "memory_used")]
    pub memory_used_bytes: u64,
    #[serde(rename = "memory_total")]
    pub memory_total_bytes: u64,
    #[serde(
        rename = "memory_available",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub memory_available_bytes: Option<u64>,
    // cumulative counters; a decrease means the collector restarted
    #[serde(rename = "network_sent", default)]
    pub network_sent_bytes: u64,
    #[serde(rename = "network_recv", default)]
    pub network_recv_bytes: u64,
    #[serde(default)]
    pub disk_usage: DiskUsageMap,
}

impl Sample {
    /// Checks the invariants serde cannot express. Returns a description of the first violation.
    pub fn validate(&self) -> Result<(), String> {
        for (name, v) in [("cpu_percent", self.cpu_percent), ("memory_percent", self.memory_percent)] {
            if !v.is_finite() || !(0.0..=100.0).contains(&v) {
                return Err(format!("{name} out of range: {v}"));
            }
        }
        if self.memory_used_bytes > self.memory_total_bytes {
            return Err(format!(
                "memory_used ({}) exceeds memory_total ({})",
                self.memory_used_bytes, self.memory_total_bytes
            ));
        }
        Ok(())
    }
}

/// Average/maximum/minimum of one resource over a stats window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    #[serde(default)]
    pub average: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
    #[serde(default)]
    pub minimum: Option<f64>,
}

impl Aggregate {
    fn finite(self) -> Self {
        let keep = |v: Option<f64>| v.filter(|x| x.is_finite());
        Self {
            average: keep(self.average),
            maximum: keep(self.maximum),
            minimum: keep(self.minimum),
        }
    }
}

/// Aggregates over a requested time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range_hours: Option<u32>,
    #[serde(default)]
    pub total_samples: u64,
    #[serde(default)]
    pub cpu: Aggregate,
    #[serde(default)]
    pub memory: Aggregate,
}

impl Stats {
    /// A successful answer for a window that holds no samples.
    pub fn empty(window_hours: u32) -> Self {
        Self {
            time_range_hours: Some(window_hours),
            total_samples: 0,
            cpu: Aggregate::default(),
            memory: Aggregate::default(),
        }
    }

    /// CPU aggregates, or `None` when the window is empty.
    pub fn cpu_summary(&self) -> Option<Aggregate> {
        (self.total_samples > 0).then(|| self.cpu.finite())
    }

    /// Memory aggregates, or `None` when the window is empty.
    pub fn memory_summary(&self) -> Option<Aggregate> {
        (self.total_samples > 0).then(|| self.memory.finite())
    }
}

/// `/metrics/` answers either with a bare array or a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum HistoryBody {
    Bare(Vec<Sample>),
    Paged { results: Vec<Sample> },
}

impl HistoryBody {
    pub fn into_samples(self) -> Vec<Sample> {
        match self {
            HistoryBody::Bare(v) | HistoryBody::Paged { results: v } => v,
        }
    }
}

/// RFC 3339 timestamps; naive ones (no offset) are read as UTC.
mod collector_time {
    use chrono::{DateTime, FixedOffset, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<FixedOffset>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(d)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(ts);
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc().fixed_offset())
            .map_err(|e| serde::de::Error::custom(format!("bad timestamp {raw:?}: {e}")))
    }
}
