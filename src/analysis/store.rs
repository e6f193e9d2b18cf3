//! Session-wide memoized access to the unified tables.
//!
//! The backing files are read on first access only; later calls return the
//! same snapshot. Consumers get shared references and filter copies, so the
//! snapshot is never mutated after construction.

use std::sync::OnceLock;

use super::aggregate::{load_all, UnifiedTables};
use super::summary::{compute_kpis, energy_summary, EnergySummary, KpiReport};
use crate::registry::FileRegistry;

/// Lazily loaded, immutable view of one comparison run
#[derive(Debug)]
pub struct DataStore {
    registry: FileRegistry,
    tables: OnceLock<UnifiedTables>,
    summary: OnceLock<Vec<EnergySummary>>,
}

impl DataStore {
    pub fn new(registry: FileRegistry) -> Self {
        Self {
            registry,
            tables: OnceLock::new(),
            summary: OnceLock::new(),
        }
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    /// Whether the files have been read yet
    pub fn is_loaded(&self) -> bool {
        self.tables.get().is_some()
    }

    /// The four unified tables, loading them on first call.
    pub fn tables(&self) -> &UnifiedTables {
        self.tables.get_or_init(|| load_all(&self.registry))
    }

    /// Per-scenario energy summary of the unified energy table.
    pub fn energy_summary(&self) -> &[EnergySummary] {
        self.summary
            .get_or_init(|| energy_summary(&self.tables().energy))
    }

    /// Scenario labels available for selection, taken from the metrics table.
    pub fn scenarios(&self) -> Vec<String> {
        self.tables().metrics.scenario_labels()
    }

    /// KPIs for a scenario selection.
    pub fn kpis<S: AsRef<str>>(&self, selected: &[S]) -> KpiReport {
        compute_kpis(&self.tables().metrics, self.energy_summary(), selected)
    }
}
