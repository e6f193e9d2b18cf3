//! Scenario comparison analysis for IoT security simulations.
//!
//! This module loads energy reports, FlowMonitor statistics and NetAnim
//! mobility traces, unifies them into tables keyed by scenario label, and
//! derives the comparative KPIs.

pub mod types;
pub mod energy;
pub mod flow_monitor;
pub mod netanim;
pub mod aggregate;
pub mod summary;
pub mod store;
pub mod report;

pub use types::*;
pub use aggregate::{load_all, UnifiedTables};
pub use store::DataStore;
pub use summary::{compute_kpis, energy_summary, EnergySummary, KpiReport};
pub use report::{
    write_json_report, write_table_csv, write_tables, write_text_report, AnalysisReport,
};
