//! Metric types for registration statistics

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One metric/name/month observation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlyDataPoint {
    pub year: i32,
    /// Calendar month, 1..=12
    pub month: u32,
    pub count: u64,
}

impl MonthlyDataPoint {
    pub fn new(year: i32, month: u32, count: u64) -> Self {
        Self { year, month, count }
    }
}

/// A series value as found in a document.
///
/// Different generations of the pipeline wrote the same series in different
/// shapes; all of them are accepted and resolved by the normalizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SeriesValue {
    /// `[{year, month, count}, ...]`
    TimeSeries(Vec<MonthlyDataPoint>),
    /// `{"2024-01": 12, ...}`
    MonthTotals(BTreeMap<String, u64>),
    /// A bare count
    Scalar(u64),
    /// Anything else. Contributes zero and never survives a time filter.
    Unrecognized(serde_json::Value),
}

impl SeriesValue {
    /// Monthly points, if this value carries a time dimension
    pub fn points(&self) -> Option<&[MonthlyDataPoint]> {
        match self {
            SeriesValue::TimeSeries(points) => Some(points),
            _ => None,
        }
    }
}

/// `metric → name → series`
pub type OptimizedMetrics = BTreeMap<String, BTreeMap<String, SeriesValue>>;

/// `metric → name → total` (no time dimension)
pub type SimpleMetrics = BTreeMap<String, BTreeMap<String, u64>>;

/// One flattened (metric, name, total) row
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetricTotal {
    pub metric: String,
    pub name: String,
    pub total: u64,
}

/// Aggregated count for one calendar month
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TrendPoint {
    pub year: i32,
    pub month: u32,
    pub count: u64,
}

/// One row of a ranking (metric, name or child entity)
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RankedEntry {
    pub name: String,
    pub total: u64,
}

impl RankedEntry {
    pub fn new(name: impl Into<String>, total: u64) -> Self {
        Self {
            name: name.into(),
            total,
        }
    }
}
