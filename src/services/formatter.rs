//! Display formatting for counts and revenue
//!
//! Uses the Indian numbering scale: thousand (K), lakh (L) and crore (Cr).

use chrono::Month;

const THOUSAND: f64 = 1_000.0;
const LAKH: f64 = 100_000.0;
const CRORE: f64 = 10_000_000.0;

/// Prefix for revenue figures
pub const CURRENCY_SYMBOL: &str = "₹";

/// Format a value on the K / L / Cr scale (e.g., 1_234_567 -> "12.3 L").
/// `None`, NaN and infinities render as "0".
pub fn format_number(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => scaled(v),
        None => "0".to_string(),
    }
}

/// Integer convenience wrapper around [`format_number`]
pub fn format_count(count: u64) -> String {
    format_number(Some(count as f64))
}

/// Same scale as [`format_number`], prefixed with the rupee symbol
pub fn format_currency(value: Option<f64>) -> String {
    format!("{}{}", CURRENCY_SYMBOL, format_number(value))
}

/// Revenue metrics ("Revenue (Fee)", "Revenue (Tax)") are shown as currency
pub fn is_revenue_metric(metric: &str) -> bool {
    metric.to_ascii_lowercase().contains("revenue")
}

/// Currency formatting for revenue metrics, count formatting otherwise
pub fn format_metric_value(metric: &str, value: Option<f64>) -> String {
    if is_revenue_metric(metric) {
        format_currency(value)
    } else {
        format_number(value)
    }
}

/// Short label for a trend bucket (e.g., "Mar 2024")
pub fn format_month(year: i32, month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| format!("{} {}", &m.name()[..3], year))
        .unwrap_or_else(|| format!("{}/{}", month, year))
}

fn scaled(value: f64) -> String {
    if value >= CRORE {
        format!("{:.1} Cr", value / CRORE)
    } else if value >= LAKH {
        format!("{:.1} L", value / LAKH)
    } else if value >= THOUSAND {
        format!("{:.1}K", value / THOUSAND)
    } else {
        value.to_string()
    }
}
