//! Core data types for the scenario comparison.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::registry::{Condition, DatasetKey, Scenario, Variant};

/// Simulation time in seconds
pub type SimTime = f64;

/// A row type of one of the unified tables
pub trait TableRow: Clone + Serialize {
    /// Column names, in serialization order
    const COLUMNS: &'static [&'static str];

    /// The "Variant - Condition" join key of this row
    fn scenario_label(&self) -> &str;
}

/// An ordered collection of rows with a fixed column schema.
///
/// An empty table still knows its columns, so consumers only check the row
/// count, never the shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table<R> {
    rows: Vec<R>,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R: TableRow> Table<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        R::COLUMNS
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Copy of the rows whose scenario label is in `selected`.
    pub fn filter_scenarios<S: AsRef<str>>(&self, selected: &[S]) -> Self {
        self.filter(|row| selected.iter().any(|s| s.as_ref() == row.scenario_label()))
    }

    /// Copy of the rows belonging to a single scenario.
    pub fn for_scenario(&self, label: &str) -> Self {
        self.filter(|row| row.scenario_label() == label)
    }

    /// Copy of the rows matching `predicate`.
    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&R) -> bool,
    {
        Self {
            rows: self.rows.iter().filter(|r| predicate(r)).cloned().collect(),
        }
    }

    /// Distinct scenario labels, sorted.
    pub fn scenario_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .rows
            .iter()
            .map(|r| r.scenario_label().to_string())
            .collect();
        labels.sort();
        labels.dedup();
        labels
    }

    /// Append `other`'s rows after this table's rows.
    pub fn extend(&mut self, other: Table<R>) {
        self.rows.extend(other.rows);
    }
}

impl<'a, R> IntoIterator for &'a Table<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Energy consumed by one node in one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyRecord {
    /// Node id as written in the report
    pub node_id: String,
    pub energy_j: f64,
    pub variant: Variant,
    pub condition: Condition,
    pub scenario: String,
}

impl TableRow for EnergyRecord {
    const COLUMNS: &'static [&'static str] =
        &["node_id", "energy_j", "variant", "condition", "scenario"];

    fn scenario_label(&self) -> &str {
        &self.scenario
    }
}

/// FlowMonitor counters of the distinguished flow, plus per-packet averages.
///
/// All three averages share the divisor `max(rx_packets, 1)`: with no
/// received packets the "average" equals the raw sum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowMetrics {
    pub delay_sum_s: f64,
    pub jitter_sum_s: f64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub lost_packets: u64,
    pub avg_delay_s: f64,
    pub avg_jitter_s: f64,
    pub bytes_per_packet: f64,
}

/// One row of the unified metrics table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub variant: Variant,
    pub condition: Condition,
    pub scenario: String,
    pub delay_sum_s: f64,
    pub jitter_sum_s: f64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub lost_packets: u64,
    pub avg_delay_s: f64,
    pub avg_jitter_s: f64,
    pub bytes_per_packet: f64,
}

impl MetricsRecord {
    pub fn new(scenario: Scenario, metrics: &FlowMetrics) -> Self {
        Self {
            variant: scenario.variant,
            condition: scenario.condition,
            scenario: scenario.label(),
            delay_sum_s: metrics.delay_sum_s,
            jitter_sum_s: metrics.jitter_sum_s,
            tx_bytes: metrics.tx_bytes,
            rx_packets: metrics.rx_packets,
            lost_packets: metrics.lost_packets,
            avg_delay_s: metrics.avg_delay_s,
            avg_jitter_s: metrics.avg_jitter_s,
            bytes_per_packet: metrics.bytes_per_packet,
        }
    }
}

impl TableRow for MetricsRecord {
    const COLUMNS: &'static [&'static str] = &[
        "variant",
        "condition",
        "scenario",
        "delay_sum_s",
        "jitter_sum_s",
        "tx_bytes",
        "rx_packets",
        "lost_packets",
        "avg_delay_s",
        "avg_jitter_s",
        "bytes_per_packet",
    ];

    fn scenario_label(&self) -> &str {
        &self.scenario
    }
}

/// Which FlowMonitor histogram a bin came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HistogramMetric {
    Delay,
    Jitter,
}

impl HistogramMetric {
    pub const ALL: [HistogramMetric; 2] = [HistogramMetric::Delay, HistogramMetric::Jitter];

    /// Element name inside a `Flow` element
    pub fn element_name(self) -> &'static str {
        match self {
            HistogramMetric::Delay => "delayHistogram",
            HistogramMetric::Jitter => "jitterHistogram",
        }
    }
}

impl fmt::Display for HistogramMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistogramMetric::Delay => write!(f, "Delay"),
            HistogramMetric::Jitter => write!(f, "Jitter"),
        }
    }
}

/// One histogram bin of one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub scenario: String,
    pub metric: HistogramMetric,
    pub start_s: f64,
    pub width_s: f64,
    pub count: u64,
}

impl TableRow for HistogramBin {
    const COLUMNS: &'static [&'static str] = &["scenario", "metric", "start_s", "width_s", "count"];

    fn scenario_label(&self) -> &str {
        &self.scenario
    }
}

/// Node position at one animation frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub time: SimTime,
    pub node_id: u32,
    pub x: f64,
    pub y: f64,
    pub scenario: String,
}

impl TableRow for MotionSample {
    const COLUMNS: &'static [&'static str] = &["time", "node_id", "x", "y", "scenario"];

    fn scenario_label(&self) -> &str {
        &self.scenario
    }
}

/// Unified energy table
pub type EnergyTable = Table<EnergyRecord>;
/// Unified metrics table
pub type MetricsTable = Table<MetricsRecord>;
/// Unified histogram table
pub type HistogramTable = Table<HistogramBin>;
/// Unified motion table
pub type MotionTable = Table<MotionSample>;

/// Why a single dataset contributed no rows
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("File not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Invalid value '{value}' for {field}")]
    InvalidValue { field: String, value: String },

    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute { element: String, attribute: String },

    #[error("No motion samples in trace")]
    NoMotionData,
}

impl LoadError {
    pub(crate) fn invalid(field: impl Into<String>, value: impl Into<String>) -> Self {
        LoadError::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// A dataset the aggregator skipped, and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedDataset {
    pub key: String,
    pub path: String,
    pub reason: String,
}

impl SkippedDataset {
    pub fn new(key: DatasetKey, path: &std::path::Path, error: &LoadError) -> Self {
        Self {
            key: key.to_string(),
            path: path.display().to_string(),
            reason: error.to_string(),
        }
    }
}
