//! Plain-text and JSON rendering of (name, value) rows

use serde::Serialize;

use crate::services::formatter::{format_count, format_metric_value, format_month};
use crate::types::{RankedEntry, TrendPoint};

#[derive(Debug, Serialize)]
struct RowsReport<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    metric: Option<&'a str>,
    rows: Vec<Row<'a>>,
}

#[derive(Debug, Serialize)]
struct Row<'a> {
    name: &'a str,
    value: u64,
}

/// Render (name, value) rows as an aligned table, or as JSON.
///
/// Table values use the K / L / Cr scale, with currency for revenue metrics.
pub fn render_rows(
    title: &str,
    rows: &[(String, u64)],
    metric: Option<&str>,
    json: bool,
) -> serde_json::Result<String> {
    if json {
        let report = RowsReport {
            title,
            metric,
            rows: rows
                .iter()
                .map(|(name, value)| Row { name, value: *value })
                .collect(),
        };
        return serde_json::to_string_pretty(&report);
    }

    let width = rows
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    if rows.is_empty() {
        out.push_str("  (no data)\n");
        return Ok(out);
    }
    for (name, value) in rows {
        let shown = match metric {
            Some(metric) => format_metric_value(metric, Some(*value as f64)),
            None => format_count(*value),
        };
        out.push_str(&format!(
            "  {:<width$}  {:>10}  {:>14}\n",
            name,
            shown,
            value,
            width = width
        ));
    }
    Ok(out)
}

/// Rows for a ranking
pub fn ranked_rows(entries: &[RankedEntry]) -> Vec<(String, u64)> {
    entries.iter().map(|e| (e.name.clone(), e.total)).collect()
}

/// Rows for a monthly trend, labelled "Jan 2024"
pub fn trend_rows(points: &[TrendPoint]) -> Vec<(String, u64)> {
    points
        .iter()
        .map(|p| (format_month(p.year, p.month), p.count))
        .collect()
}
