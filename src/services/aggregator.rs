//! Aggregator service for computing registration statistics

use crate::services::normalizer::series_total;
use crate::types::{
    MetricsDocument, OptimizedMetrics, RankedEntry, SeriesValue, SimpleMetrics, TrendPoint,
};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Rankings at or above this length are sorted on the rayon pool
const PARALLEL_SORT_THRESHOLD: usize = 4096;

/// Label of the remainder row produced by [`Aggregator::top_names`]
pub const OTHERS_LABEL: &str = "Others";

/// Aggregator for computing registration statistics
pub struct Aggregator;

impl Aggregator {
    /// Total for a metric across all names, or for a single name
    pub fn total_for_metric(metrics: &OptimizedMetrics, metric: &str, name: Option<&str>) -> u64 {
        Self::matching(metrics, metric, name)
            .map(series_total)
            .fold(0u64, u64::saturating_add)
    }

    /// Counts grouped by (year, month), oldest first.
    ///
    /// Only time-series values have a month to group by; other encodings
    /// are skipped.
    pub fn monthly_trend(
        metrics: &OptimizedMetrics,
        metric: &str,
        name: Option<&str>,
    ) -> Vec<TrendPoint> {
        let mut buckets: BTreeMap<(i32, u32), u64> = BTreeMap::new();

        for points in Self::matching(metrics, metric, name).filter_map(SeriesValue::points) {
            for point in points {
                let bucket = buckets.entry((point.year, point.month)).or_insert(0);
                *bucket = bucket.saturating_add(point.count);
            }
        }

        buckets
            .into_iter()
            .map(|((year, month), count)| TrendPoint { year, month, count })
            .collect()
    }

    /// One total per metric, largest first (ties by metric name)
    pub fn metric_summaries(metrics: &OptimizedMetrics) -> Vec<RankedEntry> {
        let mut summaries: Vec<RankedEntry> = metrics
            .keys()
            .map(|metric| RankedEntry::new(metric, Self::total_for_metric(metrics, metric, None)))
            .collect();
        sort_ranked(&mut summaries);
        summaries
    }

    /// All names under a metric, largest first (ties by name)
    pub fn ranked_names(metrics: &OptimizedMetrics, metric: &str) -> Vec<RankedEntry> {
        let Some(names) = metrics.get(metric) else {
            return Vec::new();
        };

        let mut ranked: Vec<RankedEntry> = names
            .iter()
            .map(|(name, value)| RankedEntry::new(name, series_total(value)))
            .collect();
        sort_ranked(&mut ranked);
        ranked
    }

    /// The `n` largest names plus one [`OTHERS_LABEL`] row for the rest.
    ///
    /// Row totals still add up to [`Aggregator::total_for_metric`].
    pub fn top_names(metrics: &OptimizedMetrics, metric: &str, n: usize) -> Vec<RankedEntry> {
        let mut ranked = Self::ranked_names(metrics, metric);
        if ranked.len() <= n {
            return ranked;
        }

        let others = ranked
            .split_off(n)
            .iter()
            .fold(0u64, |acc, entry| acc.saturating_add(entry.total));
        ranked.push(RankedEntry::new(OTHERS_LABEL, others));
        ranked
    }

    /// Grand total across every metric and name
    pub fn record_total(metrics: &OptimizedMetrics) -> u64 {
        metrics
            .values()
            .flat_map(|names| names.values())
            .map(series_total)
            .fold(0u64, u64::saturating_add)
    }

    /// Rank a document's child summaries by their total for `metric` (and `name`).
    ///
    /// States are labelled by code, RTOs by name. Children without the metric
    /// are left out; RTO documents have no children.
    pub fn rank_children(
        doc: &MetricsDocument,
        metric: &str,
        name: Option<&str>,
    ) -> Vec<RankedEntry> {
        let mut ranked: Vec<RankedEntry> = match doc {
            MetricsDocument::Country(country) => country
                .states
                .iter()
                .filter(|s| s.metrics.contains_key(metric))
                .map(|s| RankedEntry::new(&s.code, simple_total(&s.metrics, metric, name)))
                .collect(),
            MetricsDocument::State(state) => state
                .rtos
                .iter()
                .filter(|r| r.metrics.contains_key(metric))
                .map(|r| RankedEntry::new(r.label(), simple_total(&r.metrics, metric, name)))
                .collect(),
            MetricsDocument::Rto(_) => Vec::new(),
        };
        sort_ranked(&mut ranked);
        ranked
    }

    /// Years present in time-series data, ascending
    pub fn available_years(metrics: &OptimizedMetrics) -> Vec<i32> {
        Self::all_points(metrics)
            .map(|p| p.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Months of `year` present in time-series data, ascending
    pub fn available_months(metrics: &OptimizedMetrics, year: i32) -> Vec<u32> {
        Self::all_points(metrics)
            .filter(|p| p.year == year)
            .map(|p| p.month)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn matching<'a>(
        metrics: &'a OptimizedMetrics,
        metric: &str,
        name: Option<&'a str>,
    ) -> impl Iterator<Item = &'a SeriesValue> + 'a {
        metrics
            .get(metric)
            .into_iter()
            .flat_map(|names| names.iter())
            .filter(move |(n, _)| name.is_none_or(|wanted| n.as_str() == wanted))
            .map(|(_, value)| value)
    }

    fn all_points(
        metrics: &OptimizedMetrics,
    ) -> impl Iterator<Item = &crate::types::MonthlyDataPoint> {
        metrics
            .values()
            .flat_map(|names| names.values())
            .filter_map(SeriesValue::points)
            .flatten()
    }
}

/// Total of a child summary for `metric`, optionally a single `name`
pub fn simple_total(metrics: &SimpleMetrics, metric: &str, name: Option<&str>) -> u64 {
    let Some(names) = metrics.get(metric) else {
        return 0;
    };
    match name {
        Some(name) => names.get(name).copied().unwrap_or(0),
        None => names.values().fold(0u64, |acc, c| acc.saturating_add(*c)),
    }
}

fn compare_ranked(a: &RankedEntry, b: &RankedEntry) -> Ordering {
    b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name))
}

/// Descending by total, then ascending by name.
///
/// The comparator is a total order over distinct names, so the unstable and
/// parallel sorts give the same result as a stable one.
fn sort_ranked(entries: &mut [RankedEntry]) {
    if entries.len() >= PARALLEL_SORT_THRESHOLD {
        entries.par_sort_unstable_by(compare_ranked);
    } else {
        entries.sort_unstable_by(compare_ranked);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::filter::filter_by_year;
    use crate::types::{
        CountryDocument, MonthlyDataPoint, RtoDocument, RtoSummary, StateDocument, StateSummary,
    };

    fn ts(points: &[(i32, u32, u64)]) -> SeriesValue {
        SeriesValue::TimeSeries(
            points
                .iter()
                .map(|&(y, m, c)| MonthlyDataPoint::new(y, m, c))
                .collect(),
        )
    }

    fn make_metrics(entries: Vec<(&str, &str, SeriesValue)>) -> OptimizedMetrics {
        let mut metrics = OptimizedMetrics::new();
        for (metric, name, value) in entries {
            metrics
                .entry(metric.to_string())
                .or_default()
                .insert(name.to_string(), value);
        }
        metrics
    }

    fn transaction_metrics() -> OptimizedMetrics {
        make_metrics(vec![(
            "Transaction",
            "X",
            ts(&[(2022, 1, 10), (2022, 2, 20), (2023, 1, 5)]),
        )])
    }

    fn mixed_metrics() -> OptimizedMetrics {
        make_metrics(vec![
            ("Transaction", "X", ts(&[(2022, 1, 10), (2022, 2, 20), (2023, 1, 5)])),
            ("Transaction", "Y", ts(&[(2022, 1, 1), (2023, 1, 2)])),
            (
                "Transaction",
                "Legacy",
                SeriesValue::MonthTotals(BTreeMap::from([("2022-01".to_string(), 7)])),
            ),
            ("Vehicle Fuel", "PETROL", SeriesValue::Scalar(40)),
            ("Vehicle Fuel", "DIESEL", ts(&[(2022, 3, 15)])),
            ("Revenue (Fee)", "Fees", SeriesValue::Unrecognized(serde_json::json!("?"))),
        ])
    }

    // ========== total_for_metric() tests ==========

    #[test]
    fn test_total_for_metric_transaction_scenario() {
        let metrics = transaction_metrics();
        assert_eq!(Aggregator::total_for_metric(&metrics, "Transaction", None), 35);
        assert_eq!(
            Aggregator::total_for_metric(&filter_by_year(&metrics, 2022), "Transaction", None),
            30
        );
    }

    #[test]
    fn test_total_for_metric_all_encodings() {
        let metrics = mixed_metrics();
        assert_eq!(
            Aggregator::total_for_metric(&metrics, "Transaction", None),
            35 + 3 + 7
        );
        assert_eq!(Aggregator::total_for_metric(&metrics, "Vehicle Fuel", None), 55);
        assert_eq!(Aggregator::total_for_metric(&metrics, "Revenue (Fee)", None), 0);
    }

    #[test]
    fn test_total_for_metric_single_name() {
        let metrics = mixed_metrics();
        assert_eq!(
            Aggregator::total_for_metric(&metrics, "Vehicle Fuel", Some("PETROL")),
            40
        );
        assert_eq!(
            Aggregator::total_for_metric(&metrics, "Vehicle Fuel", Some("CNG")),
            0
        );
    }

    #[test]
    fn test_total_for_missing_metric() {
        assert_eq!(
            Aggregator::total_for_metric(&mixed_metrics(), "Permit Type", None),
            0
        );
    }

    // ========== monthly_trend() tests ==========

    #[test]
    fn test_monthly_trend_transaction_scenario() {
        let trend = Aggregator::monthly_trend(&transaction_metrics(), "Transaction", None);

        assert_eq!(trend.len(), 3);
        assert_eq!(trend.iter().filter(|p| p.year == 2022).count(), 2);
        assert_eq!(trend.iter().filter(|p| p.year == 2023).count(), 1);
        assert_eq!(
            trend[0],
            TrendPoint {
                year: 2022,
                month: 1,
                count: 10
            }
        );
    }

    #[test]
    fn test_monthly_trend_sums_names_and_skips_untimed() {
        let trend = Aggregator::monthly_trend(&mixed_metrics(), "Transaction", None);
        let counts: Vec<(i32, u32, u64)> =
            trend.iter().map(|p| (p.year, p.month, p.count)).collect();
        // Legacy month totals contribute nothing
        assert_eq!(counts, vec![(2022, 1, 11), (2022, 2, 20), (2023, 1, 7)]);
    }

    #[test]
    fn test_monthly_trend_single_name() {
        let trend = Aggregator::monthly_trend(&mixed_metrics(), "Transaction", Some("Y"));
        assert_eq!(trend.len(), 2);
        assert_eq!(trend.iter().map(|p| p.count).sum::<u64>(), 3);
    }

    #[test]
    fn test_year_total_matches_trend_for_time_series() {
        let metrics = make_metrics(vec![
            ("Transaction", "X", ts(&[(2022, 1, 10), (2022, 2, 20), (2023, 1, 5)])),
            ("Transaction", "Y", ts(&[(2022, 5, 3), (2024, 1, 9)])),
        ]);
        let trend = Aggregator::monthly_trend(&metrics, "Transaction", None);

        for year in [2021, 2022, 2023, 2024] {
            let from_trend: u64 = trend
                .iter()
                .filter(|p| p.year == year)
                .map(|p| p.count)
                .sum();
            let filtered = filter_by_year(&metrics, year);
            assert_eq!(
                Aggregator::total_for_metric(&filtered, "Transaction", None),
                from_trend
            );
        }
    }

    // ========== ranking tests ==========

    #[test]
    fn test_ranked_names_ties_broken_by_name() {
        let metrics = make_metrics(vec![
            ("M", "C", SeriesValue::Scalar(50)),
            ("M", "B", SeriesValue::Scalar(100)),
            ("M", "A", SeriesValue::Scalar(100)),
        ]);

        let ranked = Aggregator::ranked_names(&metrics, "M");
        let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(Aggregator::ranked_names(&metrics, "M"), ranked);
    }

    #[test]
    fn test_ranked_names_missing_metric() {
        assert!(Aggregator::ranked_names(&mixed_metrics(), "Nope").is_empty());
    }

    #[test]
    fn test_ranked_names_large_list_parallel_path() {
        let mut names = BTreeMap::new();
        for i in 0..(PARALLEL_SORT_THRESHOLD as u64 + 10) {
            names.insert(format!("maker-{:05}", i), SeriesValue::Scalar(i % 7));
        }
        let metrics = OptimizedMetrics::from([("Vehicle Manufacturer".to_string(), names)]);

        let ranked = Aggregator::ranked_names(&metrics, "Vehicle Manufacturer");
        assert_eq!(ranked.len(), PARALLEL_SORT_THRESHOLD + 10);
        for pair in ranked.windows(2) {
            assert_ne!(compare_ranked(&pair[0], &pair[1]), Ordering::Greater);
        }
        assert_eq!(ranked[0].total, 6);
        assert_eq!(ranked[0].name, "maker-00006");
    }

    #[test]
    fn test_metric_summaries_sorted() {
        let summaries = Aggregator::metric_summaries(&mixed_metrics());
        let rows: Vec<(&str, u64)> = summaries
            .iter()
            .map(|r| (r.name.as_str(), r.total))
            .collect();
        assert_eq!(
            rows,
            vec![("Vehicle Fuel", 55), ("Transaction", 45), ("Revenue (Fee)", 0)]
        );
    }

    #[test]
    fn test_top_names_keeps_total() {
        let metrics = make_metrics(vec![
            ("M", "a", SeriesValue::Scalar(50)),
            ("M", "b", SeriesValue::Scalar(30)),
            ("M", "c", SeriesValue::Scalar(15)),
            ("M", "d", SeriesValue::Scalar(5)),
        ]);

        let top = Aggregator::top_names(&metrics, "M", 2);
        assert_eq!(
            top,
            vec![
                RankedEntry::new("a", 50),
                RankedEntry::new("b", 30),
                RankedEntry::new(OTHERS_LABEL, 20),
            ]
        );
        assert_eq!(
            top.iter().map(|r| r.total).sum::<u64>(),
            Aggregator::total_for_metric(&metrics, "M", None)
        );
        assert_eq!(Aggregator::top_names(&metrics, "M", 10).len(), 4);
    }

    // ========== record_total() tests ==========

    #[test]
    fn test_record_total_matches_metric_totals() {
        let metrics = mixed_metrics();
        let by_metric: u64 = metrics
            .keys()
            .map(|m| Aggregator::total_for_metric(&metrics, m, None))
            .sum();
        assert_eq!(Aggregator::record_total(&metrics), by_metric);
        assert_eq!(Aggregator::record_total(&metrics), 100);
    }

    #[test]
    fn test_record_total_empty() {
        assert_eq!(Aggregator::record_total(&OptimizedMetrics::new()), 0);
    }

    // ========== child ranking tests ==========

    fn simple(entries: &[(&str, &str, u64)]) -> SimpleMetrics {
        let mut metrics = SimpleMetrics::new();
        for (metric, name, count) in entries {
            metrics
                .entry(metric.to_string())
                .or_default()
                .insert(name.to_string(), *count);
        }
        metrics
    }

    #[test]
    fn test_rank_children_states() {
        let doc = MetricsDocument::Country(CountryDocument {
            name: "India".into(),
            metrics: OptimizedMetrics::new(),
            states: vec![
                StateSummary {
                    code: "MH".into(),
                    total_count: 90,
                    child_count: 4,
                    metrics: simple(&[("Vehicle Fuel", "PETROL", 60), ("Vehicle Fuel", "EV", 30)]),
                },
                StateSummary {
                    code: "KA".into(),
                    total_count: 90,
                    child_count: 2,
                    metrics: simple(&[("Vehicle Fuel", "PETROL", 80), ("Vehicle Fuel", "EV", 10)]),
                },
                StateSummary {
                    code: "GA".into(),
                    total_count: 1,
                    child_count: 1,
                    metrics: simple(&[("Transaction", "X", 1)]),
                },
            ],
        });

        let all = Aggregator::rank_children(&doc, "Vehicle Fuel", None);
        assert_eq!(
            all,
            vec![RankedEntry::new("KA", 90), RankedEntry::new("MH", 90)]
        );

        let ev = Aggregator::rank_children(&doc, "Vehicle Fuel", Some("EV"));
        assert_eq!(ev, vec![RankedEntry::new("MH", 30), RankedEntry::new("KA", 10)]);
    }

    #[test]
    fn test_rank_children_rtos_use_labels() {
        let doc = MetricsDocument::State(StateDocument {
            state: "KA".into(),
            name: "State KA".into(),
            metrics: OptimizedMetrics::new(),
            rtos: vec![
                RtoSummary {
                    code: "KA01".into(),
                    name: Some("Central".into()),
                    total_count: 5,
                    metrics: simple(&[("Transaction", "X", 5)]),
                },
                RtoSummary {
                    code: "KA02".into(),
                    name: None,
                    total_count: 9,
                    metrics: simple(&[("Transaction", "X", 9)]),
                },
            ],
        });

        let ranked = Aggregator::rank_children(&doc, "Transaction", None);
        assert_eq!(
            ranked,
            vec![RankedEntry::new("KA02", 9), RankedEntry::new("Central", 5)]
        );
    }

    #[test]
    fn test_rank_children_rto_document_is_empty() {
        let doc = MetricsDocument::Rto(RtoDocument {
            state: "KA".into(),
            code: "KA01".into(),
            name: "Central".into(),
            metrics: transaction_metrics(),
        });
        assert!(Aggregator::rank_children(&doc, "Transaction", None).is_empty());
    }

    // ========== period tests ==========

    #[test]
    fn test_available_years_and_months() {
        let metrics = mixed_metrics();
        assert_eq!(Aggregator::available_years(&metrics), vec![2022, 2023]);
        assert_eq!(Aggregator::available_months(&metrics, 2022), vec![1, 2, 3]);
        assert_eq!(Aggregator::available_months(&metrics, 2023), vec![1]);
        assert!(Aggregator::available_months(&metrics, 2019).is_empty());
    }

    #[test]
    fn test_simple_total() {
        let metrics = simple(&[("Transaction", "X", 5), ("Transaction", "Y", 6)]);
        assert_eq!(simple_total(&metrics, "Transaction", None), 11);
        assert_eq!(simple_total(&metrics, "Transaction", Some("Y")), 6);
        assert_eq!(simple_total(&metrics, "Fuel", None), 0);
    }
}
