mod render;

pub use render::{ranked_rows, render_rows, trend_rows};

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::config::Config;
use crate::services::{Aggregator, DocumentLoader};
use crate::types::{DocumentKey, Level, MetricsDocument, RankedEntry, TimeWindow};

/// Vehicle-registration statistics by country, state and RTO
#[derive(Parser)]
#[command(name = "regstats")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Fetch documents from this base URL (overrides REGSTATS_BASE_URL)
    #[arg(long, global = true, conflicts_with = "data_dir")]
    base_url: Option<String>,

    /// Read documents from this directory (overrides REGSTATS_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// HTTP timeout in seconds, 0 to disable
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record total and per-metric totals of a document
    Summary {
        /// Document key, e.g. country, state/KA/year/2023, rto/KA/KA01
        key: DocumentKey,
    },

    /// Names under a metric, largest first
    Rank {
        key: DocumentKey,
        /// Metric, e.g. "Vehicle Manufacturer"
        #[arg(long)]
        metric: String,
        /// Keep the N largest and fold the rest into "Others"
        #[arg(long)]
        top: Option<usize>,
    },

    /// Monthly totals for a metric
    Trend {
        key: DocumentKey,
        #[command(flatten)]
        selection: MetricArgs,
    },

    /// Child states or RTOs ranked by a metric
    Children {
        key: DocumentKey,
        #[command(flatten)]
        selection: MetricArgs,
    },

    /// Years and months with data
    Periods { key: DocumentKey },

    /// Dataset metadata
    Metadata,
}

#[derive(Args, Debug, Clone)]
struct MetricArgs {
    /// Metric, e.g. "Vehicle Fuel" or "Revenue (Tax)"
    #[arg(long)]
    metric: String,

    /// Restrict to one name within the metric
    #[arg(long)]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct SummaryReport<'a> {
    name: &'a str,
    level: Level,
    record_total: u64,
    children: usize,
    metrics: Vec<RankedEntry>,
}

#[derive(Debug, Serialize)]
struct YearPeriods {
    year: i32,
    months: Vec<u32>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        crate::logging::init_logging(self.verbose);

        let config = Config::from_env()?.with_overrides(
            self.base_url.clone(),
            self.data_dir.clone(),
            self.timeout,
        )?;
        tracing::debug!(?config, "resolved configuration");

        let loader = DocumentLoader::new(config.build_source()?);
        let output = self.execute(&loader).await?;
        println!("{}", output.trim_end());
        Ok(())
    }

    async fn execute(&self, loader: &DocumentLoader) -> anyhow::Result<String> {
        let json = self.json;

        match &self.command {
            Commands::Summary { key } => {
                let doc = load(loader, key).await?;
                summary(&doc, json)
            }
            Commands::Rank { key, metric, top } => {
                let doc = load(loader, key).await?;
                let metrics = doc.metrics();
                let ranked = match top {
                    Some(n) => Aggregator::top_names(metrics, metric, *n),
                    None => Aggregator::ranked_names(metrics, metric),
                };
                let title = format!("{} · {}", doc.name(), metric);
                Ok(render_rows(
                    &title,
                    &ranked_rows(&ranked),
                    Some(metric.as_str()),
                    json,
                )?)
            }
            Commands::Trend { key, selection } => {
                let doc = load(loader, key).await?;
                let trend = Aggregator::monthly_trend(
                    doc.metrics(),
                    &selection.metric,
                    selection.name.as_deref(),
                );
                let title = selection_title(&doc, selection);
                Ok(render_rows(
                    &title,
                    &trend_rows(&trend),
                    Some(selection.metric.as_str()),
                    json,
                )?)
            }
            Commands::Children { key, selection } => {
                let doc = load(loader, key).await?;
                if key.window() != TimeWindow::All {
                    tracing::info!(%key, "child summaries are totals only; time-scoped views have none");
                }
                let ranked = Aggregator::rank_children(
                    &doc,
                    &selection.metric,
                    selection.name.as_deref(),
                );
                let title = selection_title(&doc, selection);
                Ok(render_rows(
                    &title,
                    &ranked_rows(&ranked),
                    Some(selection.metric.as_str()),
                    json,
                )?)
            }
            Commands::Periods { key } => {
                let doc = load(loader, key).await?;
                periods(&doc, json)
            }
            Commands::Metadata => {
                let meta = loader
                    .load_metadata()
                    .await
                    .context("failed to load dataset metadata")?;
                if json {
                    return Ok(serde_json::to_string_pretty(meta.as_ref())?);
                }
                let generated = meta
                    .generated_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                Ok(format!(
                    "generated: {}\nstates:    {}\nrtos:      {}\navailable: {}\n",
                    generated,
                    meta.total_states,
                    meta.total_rtos,
                    meta.available_states.join(", ")
                ))
            }
        }
    }
}

async fn load(
    loader: &DocumentLoader,
    key: &DocumentKey,
) -> anyhow::Result<Arc<MetricsDocument>> {
    loader
        .load(key)
        .await
        .with_context(|| format!("failed to load '{}'", key))
}

fn selection_title(doc: &MetricsDocument, selection: &MetricArgs) -> String {
    match &selection.name {
        Some(name) => format!("{} · {} · {}", doc.name(), selection.metric, name),
        None => format!("{} · {}", doc.name(), selection.metric),
    }
}

fn summary(doc: &MetricsDocument, json: bool) -> anyhow::Result<String> {
    let metrics = doc.metrics();
    let report = SummaryReport {
        name: doc.name(),
        level: doc.level(),
        record_total: Aggregator::record_total(metrics),
        children: doc.child_count(),
        metrics: Aggregator::metric_summaries(metrics),
    };

    if json {
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    let title = format!(
        "{} ({:?}) · {} records · {} children",
        report.name, report.level, report.record_total, report.children
    );
    Ok(render_rows(&title, &ranked_rows(&report.metrics), None, false)?)
}

fn periods(doc: &MetricsDocument, json: bool) -> anyhow::Result<String> {
    let metrics = doc.metrics();
    let years: Vec<YearPeriods> = Aggregator::available_years(metrics)
        .into_iter()
        .map(|year| YearPeriods {
            year,
            months: Aggregator::available_months(metrics, year),
        })
        .collect();

    if json {
        return Ok(serde_json::to_string_pretty(&years)?);
    }

    let mut out = format!("{}\n", doc.name());
    for period in &years {
        let months: Vec<String> = period.months.iter().map(u32::to_string).collect();
        out.push_str(&format!("  {}: {}\n", period.year, months.join(", ")));
    }
    Ok(out)
}
