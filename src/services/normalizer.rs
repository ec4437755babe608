//! Series normalization service
//!
//! Resolves a count from any of the series encodings found in documents,
//! so that callers never inspect the encoding themselves.

use crate::types::{MetricTotal, OptimizedMetrics, SeriesValue};

/// Total count carried by a series value.
///
/// - Time series: sum of point counts
/// - Month totals: sum of the map values
/// - Scalar: the value itself
/// - Unrecognized: zero
///
/// # Examples
/// ```
/// use regstats::services::normalizer::series_total;
/// use regstats::types::SeriesValue;
///
/// assert_eq!(series_total(&SeriesValue::Scalar(12)), 12);
/// ```
pub fn series_total(value: &SeriesValue) -> u64 {
    match value {
        SeriesValue::TimeSeries(points) => points
            .iter()
            .fold(0u64, |acc, p| acc.saturating_add(p.count)),
        SeriesValue::MonthTotals(months) => months
            .values()
            .fold(0u64, |acc, count| acc.saturating_add(*count)),
        SeriesValue::Scalar(count) => *count,
        SeriesValue::Unrecognized(_) => 0,
    }
}

/// Flatten a metrics block into (metric, name, total) rows, largest first.
///
/// The sort is stable: equal totals keep the order in which they appear in
/// the source maps, which are keyed (metric, name) ascending.
pub fn flatten(metrics: &OptimizedMetrics) -> Vec<MetricTotal> {
    let mut rows: Vec<MetricTotal> = metrics
        .iter()
        .flat_map(|(metric, names)| {
            names.iter().map(move |(name, value)| MetricTotal {
                metric: metric.clone(),
                name: name.clone(),
                total: series_total(value),
            })
        })
        .collect();

    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}

/// Number of series whose shape was not recognized
pub fn unrecognized_entries(metrics: &OptimizedMetrics) -> usize {
    metrics
        .values()
        .flat_map(|names| names.values())
        .filter(|value| matches!(value, SeriesValue::Unrecognized(_)))
        .count()
}
