//! Services for loading, filtering, aggregating and formatting statistics

pub mod aggregator;
pub mod cache;
pub mod filter;
pub mod formatter;
pub mod loader;
pub mod normalizer;
pub mod source;

pub use aggregator::Aggregator;
pub use cache::DocumentCache;
pub use filter::{filter_by_year, filter_by_year_month, filter_document, filter_window};
pub use formatter::{format_count, format_currency, format_metric_value, format_number};
pub use loader::DocumentLoader;
pub use normalizer::{flatten, series_total};
pub use source::{DirSource, DocumentSource, HttpSource};
