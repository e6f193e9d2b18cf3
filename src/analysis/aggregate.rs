//! Aggregation of per-dataset results into unified tables.
//!
//! Every dataset of a role is attempted in scenario order. A dataset that
//! fails for any reason contributes no rows and is recorded as skipped; the
//! remaining datasets are concatenated in the order they were attempted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::energy::load_energy_file;
use super::flow_monitor::{load_flow_monitor_file, FlowReport};
use super::netanim::load_netanim_file;
use super::types::*;
use crate::registry::{DatasetKey, FileRegistry, Role, Scenario};

/// Result of attempting one dataset
#[derive(Debug)]
pub struct DatasetResult<T> {
    pub key: DatasetKey,
    pub path: PathBuf,
    pub outcome: Result<T, LoadError>,
}

impl<T> DatasetResult<T> {
    fn skipped(&self) -> Option<SkippedDataset> {
        match &self.outcome {
            Ok(_) => None,
            Err(e) => Some(SkippedDataset::new(self.key, &self.path, e)),
        }
    }
}

/// A unified table plus the datasets left out of it
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregated<R> {
    pub table: Table<R>,
    pub skipped: Vec<SkippedDataset>,
}

/// Unified metrics and histogram tables, both built from the flow-monitor files
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsAggregate {
    pub metrics: MetricsTable,
    pub histograms: HistogramTable,
    pub skipped: Vec<SkippedDataset>,
}

/// All four unified tables of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedTables {
    pub energy: EnergyTable,
    pub metrics: MetricsTable,
    pub histograms: HistogramTable,
    pub motion: MotionTable,
    pub skipped: Vec<SkippedDataset>,
}

/// Attempt every dataset of `role` in scenario order.
pub fn load_role<T, F>(registry: &FileRegistry, role: Role, mut load: F) -> Vec<DatasetResult<T>>
where
    F: FnMut(&Path, Scenario) -> Result<T, LoadError>,
{
    registry
        .entries(role)
        .into_iter()
        .map(|(key, path)| DatasetResult {
            key,
            path: path.to_path_buf(),
            outcome: load(path, key.scenario),
        })
        .collect()
}

fn log_skipped(skipped: &SkippedDataset) {
    log::warn!(
        "Skipping dataset {} ({}): {}",
        skipped.key,
        skipped.path,
        skipped.reason
    );
}

/// Concatenate the successful tables and collect the failures.
pub fn fold_tables<R: TableRow>(results: Vec<DatasetResult<Table<R>>>) -> Aggregated<R> {
    let mut table = Table::empty();
    let mut skipped = Vec::new();

    for result in results {
        if let Some(skip) = result.skipped() {
            log_skipped(&skip);
            skipped.push(skip);
            continue;
        }
        if let Ok(rows) = result.outcome {
            table.extend(rows);
        }
    }

    Aggregated { table, skipped }
}

/// One metrics row per successful flow-monitor file, plus its bins.
pub fn fold_flow_reports(results: Vec<DatasetResult<FlowReport>>) -> MetricsAggregate {
    let mut metrics = Vec::new();
    let mut histograms = Vec::new();
    let mut skipped = Vec::new();

    for result in results {
        if let Some(skip) = result.skipped() {
            log_skipped(&skip);
            skipped.push(skip);
            continue;
        }
        if let Ok(report) = result.outcome {
            metrics.push(MetricsRecord::new(result.key.scenario, &report.metrics));
            histograms.extend(report.histograms);
        }
    }

    MetricsAggregate {
        metrics: Table::new(metrics),
        histograms: Table::new(histograms),
        skipped,
    }
}

/// Unified energy table
pub fn aggregate_energy(registry: &FileRegistry) -> Aggregated<EnergyRecord> {
    let aggregated = fold_tables(load_role(registry, Role::Energy, load_energy_file));
    log::info!(
        "Energy: {} rows, {} datasets skipped",
        aggregated.table.len(),
        aggregated.skipped.len()
    );
    aggregated
}

/// Unified metrics and histogram tables
pub fn aggregate_metrics(registry: &FileRegistry) -> MetricsAggregate {
    let aggregated = fold_flow_reports(load_role(registry, Role::Metrics, load_flow_monitor_file));
    log::info!(
        "Metrics: {} rows, {} histogram bins, {} datasets skipped",
        aggregated.metrics.len(),
        aggregated.histograms.len(),
        aggregated.skipped.len()
    );
    aggregated
}

/// Unified motion table
pub fn aggregate_motion(registry: &FileRegistry) -> Aggregated<MotionSample> {
    let aggregated = fold_tables(load_role(registry, Role::Animation, load_netanim_file));
    log::info!(
        "Motion: {} samples, {} datasets skipped",
        aggregated.table.len(),
        aggregated.skipped.len()
    );
    aggregated
}

/// Load every dataset in the registry into the four unified tables.
pub fn load_all(registry: &FileRegistry) -> UnifiedTables {
    log::info!("Loading datasets from {}", registry.data_dir().display());

    let energy = aggregate_energy(registry);
    let metrics = aggregate_metrics(registry);
    let motion = aggregate_motion(registry);

    let mut skipped = energy.skipped;
    skipped.extend(metrics.skipped);
    skipped.extend(motion.skipped);

    UnifiedTables {
        energy: energy.table,
        metrics: metrics.metrics,
        histograms: metrics.histograms,
        motion: motion.table,
        skipped,
    }
}
