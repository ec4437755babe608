//! Document types for the three hierarchy levels

use super::metrics::{OptimizedMetrics, SimpleMetrics};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hierarchy level of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Country,
    State,
    Rto,
}

/// Per-state summary carried by the country document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateSummary {
    #[serde(alias = "State")]
    pub code: String,
    #[serde(default)]
    pub total_count: u64,
    /// Number of RTOs in the state
    #[serde(default, alias = "rto_count")]
    pub child_count: u64,
    #[serde(default)]
    pub metrics: SimpleMetrics,
}

/// Per-RTO summary carried by a state document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RtoSummary {
    #[serde(alias = "RTO")]
    pub code: String,
    #[serde(default, alias = "RTO Name")]
    pub name: Option<String>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub metrics: SimpleMetrics,
}

impl RtoSummary {
    /// Display label: the office name, or its code when unnamed
    pub fn label(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.code,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryDocument {
    pub name: String,
    #[serde(default)]
    pub metrics: OptimizedMetrics,
    #[serde(default)]
    pub states: Vec<StateSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateDocument {
    pub state: String,
    pub name: String,
    #[serde(default)]
    pub metrics: OptimizedMetrics,
    #[serde(default)]
    pub rtos: Vec<RtoSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RtoDocument {
    pub state: String,
    #[serde(alias = "rto")]
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub metrics: OptimizedMetrics,
}

/// A statistics document at any level, tagged by its `level` field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "level", rename_all = "lowercase")]
pub enum MetricsDocument {
    Country(CountryDocument),
    State(StateDocument),
    Rto(RtoDocument),
}

impl MetricsDocument {
    pub fn level(&self) -> Level {
        match self {
            MetricsDocument::Country(_) => Level::Country,
            MetricsDocument::State(_) => Level::State,
            MetricsDocument::Rto(_) => Level::Rto,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MetricsDocument::Country(doc) => &doc.name,
            MetricsDocument::State(doc) => &doc.name,
            MetricsDocument::Rto(doc) => &doc.name,
        }
    }

    /// The document's own time-series metrics
    pub fn metrics(&self) -> &OptimizedMetrics {
        match self {
            MetricsDocument::Country(doc) => &doc.metrics,
            MetricsDocument::State(doc) => &doc.metrics,
            MetricsDocument::Rto(doc) => &doc.metrics,
        }
    }

    /// Number of child summaries (states or RTOs); zero for RTO documents
    pub fn child_count(&self) -> usize {
        match self {
            MetricsDocument::Country(doc) => doc.states.len(),
            MetricsDocument::State(doc) => doc.rtos.len(),
            MetricsDocument::Rto(_) => 0,
        }
    }
}

/// Dataset-level metadata written alongside the documents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DatasetMetadata {
    #[serde(default)]
    pub generated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub total_states: u64,
    #[serde(default)]
    pub total_rtos: u64,
    #[serde(default)]
    pub available_states: Vec<String>,
}

/// State code → state document file name
pub type StatesIndex = BTreeMap<String, String>;
