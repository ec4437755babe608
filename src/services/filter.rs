//! Time-window filters
//!
//! Filters only understand the time-series encoding. Month totals and scalar
//! values carry no usable time dimension and are left out of every
//! time-filtered view; the same goes for child summaries, which are totals
//! only and disappear from yearly and monthly documents.

use crate::types::{
    CountryDocument, MetricsDocument, MonthlyDataPoint, OptimizedMetrics, RtoDocument,
    SeriesValue, StateDocument, TimeWindow,
};
use std::collections::BTreeMap;

/// Keep only observations from `year`
pub fn filter_by_year(metrics: &OptimizedMetrics, year: i32) -> OptimizedMetrics {
    filter_points(metrics, |p| p.year == year)
}

/// Keep only observations from `year`/`month`
pub fn filter_by_year_month(metrics: &OptimizedMetrics, year: i32, month: u32) -> OptimizedMetrics {
    filter_points(metrics, |p| p.year == year && p.month == month)
}

/// Apply a [`TimeWindow`]. `All` returns an unchanged copy.
pub fn filter_window(metrics: &OptimizedMetrics, window: TimeWindow) -> OptimizedMetrics {
    match window {
        TimeWindow::All => metrics.clone(),
        TimeWindow::Year(year) => filter_by_year(metrics, year),
        TimeWindow::Month(year, month) => filter_by_year_month(metrics, year, month),
    }
}

/// Restrict a whole document to `window`.
///
/// Any window other than `All` empties the child list: per-month child
/// breakdowns are not available from the parent document.
pub fn filter_document(doc: &MetricsDocument, window: TimeWindow) -> MetricsDocument {
    if window == TimeWindow::All {
        return doc.clone();
    }

    match doc {
        MetricsDocument::Country(country) => MetricsDocument::Country(CountryDocument {
            name: country.name.clone(),
            metrics: filter_window(&country.metrics, window),
            states: Vec::new(),
        }),
        MetricsDocument::State(state) => MetricsDocument::State(StateDocument {
            state: state.state.clone(),
            name: state.name.clone(),
            metrics: filter_window(&state.metrics, window),
            rtos: Vec::new(),
        }),
        MetricsDocument::Rto(rto) => MetricsDocument::Rto(RtoDocument {
            state: rto.state.clone(),
            code: rto.code.clone(),
            name: rto.name.clone(),
            metrics: filter_window(&rto.metrics, window),
        }),
    }
}

fn filter_points<F>(metrics: &OptimizedMetrics, keep: F) -> OptimizedMetrics
where
    F: Fn(&MonthlyDataPoint) -> bool,
{
    let mut filtered = OptimizedMetrics::new();

    for (metric, names) in metrics {
        let kept: BTreeMap<String, SeriesValue> = names
            .iter()
            .filter_map(|(name, value)| {
                let points: Vec<MonthlyDataPoint> =
                    value.points()?.iter().filter(|p| keep(*p)).copied().collect();
                if points.is_empty() {
                    None
                } else {
                    Some((name.clone(), SeriesValue::TimeSeries(points)))
                }
            })
            .collect();

        if !kept.is_empty() {
            filtered.insert(metric.clone(), kept);
        }
    }

    filtered
}
