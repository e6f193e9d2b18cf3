//! # IoTSec Metrics - Scenario comparison for IoT security simulations
//!
//! This library turns the output artifacts of a simulated IoT network into
//! comparative statistics. The network is simulated in two variants, with
//! and without a security mechanism, and each variant runs under two
//! conditions, baseline and under attack.
//!
//! ## Overview
//!
//! For each of the four scenarios the simulator leaves three files behind:
//!
//! - a per-node energy report (CSV)
//! - FlowMonitor statistics (XML)
//! - a NetAnim mobility trace (XML)
//!
//! The library parses them into four unified tables keyed by a scenario
//! label of the form `"Variant - Condition"` and derives KPIs such as the
//! energy saved by the security mechanism under attack.
//!
//! ## Key Features
//!
//! - **Per-packet statistics**: average delay, jitter and protocol overhead of
//!   the monitored flow, with a defined zero-packet policy
//! - **Histograms**: delay and jitter frequency bins per scenario
//! - **Dense mobility grid**: sparse node movements forward-filled onto every
//!   frame time, ready for stepwise animation
//! - **Best-effort loading**: a missing or malformed file drops that dataset
//!   only, never the whole run
//!
//! ## Architecture
//!
//! - `registry`: dataset keys and the immutable key-to-file mapping
//! - `utils`: duration normalization
//! - `analysis`: extractors, aggregator, KPIs, memoized store and reports
//! - `config` / `config_loader`: YAML configuration
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use iotsec_metrics::analysis::DataStore;
//! use iotsec_metrics::registry::FileRegistry;
//!
//! let store = DataStore::new(FileRegistry::new("simulation_results"));
//!
//! for row in store.energy_summary() {
//!     println!("{}: {:.3} J per node", row.scenario, row.mean_energy_j);
//! }
//!
//! let kpis = store.kpis(&store.scenarios());
//! if let Some(worst) = kpis.worst_average_delay {
//!     println!("Worst delay: {:.4} s in {}", worst.avg_delay_s, worst.scenario);
//! }
//! ```
//!
//! ## Error Handling
//!
//! Dataset loading never fails as a whole: every per-file problem becomes a
//! [`analysis::LoadError`] recorded next to the unified tables as a skipped
//! dataset. Application-level functions (configuration, report writing)
//! return `color_eyre::Result`.

pub mod config;
pub mod config_loader;
pub mod registry;
pub mod utils;
pub mod analysis;
