//! Scenario comparison CLI for IoT security simulations.
//!
//! Loads energy, FlowMonitor and NetAnim outputs of the four scenarios and
//! prints or writes the comparison.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{bail, Context, Result};

use iotsec_metrics::analysis::{
    self,
    netanim::{frame_times, motion_bounds},
    AnalysisReport, DataStore, HistogramMetric,
};
use iotsec_metrics::config_loader;
use iotsec_metrics::registry::{Role, Scenario};

/// Padding around node positions when reporting animation bounds
const MOTION_PADDING: f64 = 5.0;

#[derive(Parser)]
#[command(name = "iotsec-metrics")]
#[command(about = "Compare secured vs. unsecured IoT simulations, baseline vs. under attack")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the simulation output files
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Output directory for reports
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Reject scenario labels that name none of the four scenarios.
fn check_scenarios(labels: &[String]) -> Result<()> {
    for label in labels {
        if Scenario::from_label(label).is_none() {
            let known: Vec<String> = Scenario::ALL.iter().map(Scenario::label).collect();
            bail!("Unknown scenario '{}'; expected one of: {}", label, known.join(", "));
        }
    }
    Ok(())
}

#[derive(Clone, Copy, ValueEnum)]
enum MetricArg {
    Delay,
    Jitter,
}

impl From<MetricArg> for HistogramMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Delay => HistogramMetric::Delay,
            MetricArg::Jitter => HistogramMetric::Jitter,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Load everything and write JSON, text and CSV outputs
    Full,

    /// Show the per-scenario energy summary
    Energy,

    /// Show flow metrics
    Metrics {
        /// Restrict to these scenario labels (default: all)
        #[arg(long = "scenario")]
        scenarios: Vec<String>,
    },

    /// Show delay/jitter histogram bins
    Histograms {
        /// Only this histogram
        #[arg(long, value_enum)]
        metric: Option<MetricArg>,
    },

    /// Show animation frames and bounds per scenario
    Motion {
        /// Only this scenario label
        #[arg(long)]
        scenario: Option<String>,
    },

    /// Show KPIs for a scenario selection
    Kpi {
        /// Selected scenario labels (default: all)
        #[arg(long = "scenario")]
        scenarios: Vec<String>,
    },

    /// List dataset keys, their files and whether they exist
    Files,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    let mut config = config_loader::load_or_default(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(output) = cli.output {
        config.output_dir = output;
    }

    let store = DataStore::new(config.registry()?);

    match cli.command {
        Commands::Full => {
            let scenarios = store.scenarios();
            let report = AnalysisReport::from_store(&store, &scenarios);

            fs::create_dir_all(&config.output_dir).with_context(|| {
                format!("Failed to create output directory: {}", config.output_dir.display())
            })?;
            analysis::write_json_report(&report, &config.output_dir.join("report.json"))?;
            analysis::write_text_report(&report, &config.output_dir.join("report.txt"))?;
            analysis::write_tables(store.tables(), &config.output_dir)?;
            analysis::report::print_summary(&report);

            log::info!("Analysis complete. Reports written to {}", config.output_dir.display());
        }
        Commands::Energy => {
            let summary = store.energy_summary();
            if summary.is_empty() {
                println!("No energy data.");
            }
            for s in summary {
                println!(
                    "{:<26} mean {:>10.4} J   total {:>12.4} J   ({} nodes)",
                    s.scenario, s.mean_energy_j, s.total_energy_j, s.node_count
                );
            }
        }
        Commands::Metrics { scenarios } => {
            check_scenarios(&scenarios)?;
            let metrics = &store.tables().metrics;
            let selected = if scenarios.is_empty() { metrics.scenario_labels() } else { scenarios };
            let filtered = metrics.filter_scenarios(&selected);

            if filtered.is_empty() {
                println!("No data for the selected scenarios.");
            }
            for m in &filtered {
                println!(
                    "{:<26} avg delay {:.6} s   avg jitter {:.6} s   {:.1} B/pkt   rx {}   lost {}",
                    m.scenario,
                    m.avg_delay_s,
                    m.avg_jitter_s,
                    m.bytes_per_packet,
                    m.rx_packets,
                    m.lost_packets
                );
            }
        }
        Commands::Histograms { metric } => {
            let wanted = metric.map(HistogramMetric::from);
            let bins = store
                .tables()
                .histograms
                .filter(|b| wanted.map_or(true, |w| b.metric == w));

            if bins.is_empty() {
                println!("No histogram data.");
            }
            for b in &bins {
                println!(
                    "{:<26} {:<6} [{:.6}, {:.6}) s   {}",
                    b.scenario,
                    b.metric.to_string(),
                    b.start_s,
                    b.start_s + b.width_s,
                    b.count
                );
            }
        }
        Commands::Motion { scenario } => {
            check_scenarios(scenario.as_slice())?;
            let motion = &store.tables().motion;
            let labels = match scenario {
                Some(label) => vec![label],
                None => motion.scenario_labels(),
            };

            if motion.is_empty() {
                println!("No animation data.");
            }
            for label in labels {
                let frames = frame_times(motion, &label);
                match motion_bounds(motion, &label, MOTION_PADDING) {
                    Some(b) => println!(
                        "{:<26} {} frames   x [{:.1}, {:.1}]   y [{:.1}, {:.1}]",
                        label,
                        frames.len(),
                        b.min_x,
                        b.max_x,
                        b.min_y,
                        b.max_y
                    ),
                    None => println!("{:<26} no motion samples", label),
                }
            }
        }
        Commands::Kpi { scenarios } => {
            check_scenarios(&scenarios)?;
            let selected = if scenarios.is_empty() { store.scenarios() } else { scenarios };
            let kpis = store.kpis(&selected);
            println!("{}", serde_json::to_string_pretty(&kpis)?);
        }
        Commands::Files => {
            let registry = store.registry();
            for role in Role::ALL {
                for (key, path) in registry.entries(role) {
                    let status = if path.exists() { "ok" } else { "missing" };
                    println!("{:<18} {:<8} {}", key.to_string(), status, path.display());
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["iotsec-metrics", "--data-dir", "results", "full"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("results")));
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Commands::Full));
    }

    #[test]
    fn test_kpi_scenarios() {
        let cli = Cli::parse_from([
            "iotsec-metrics",
            "kpi",
            "--scenario",
            "Secured - UnderAttack",
            "--scenario",
            "Unsecured - UnderAttack",
        ]);
        match cli.command {
            Commands::Kpi { scenarios } => assert_eq!(scenarios.len(), 2),
            _ => panic!("expected kpi command"),
        }
    }

    #[test]
    fn test_scenario_labels_checked() {
        let valid = vec!["Secured - Baseline".to_string(), "Unsecured - UnderAttack".to_string()];
        assert!(check_scenarios(&valid).is_ok());
        assert!(check_scenarios(&[]).is_ok());

        let typo = vec!["Secured-Baseline".to_string()];
        let err = check_scenarios(&typo).unwrap_err().to_string();
        assert!(err.contains("Unknown scenario 'Secured-Baseline'"));
        assert!(err.contains("Unsecured - UnderAttack"));
    }

    #[test]
    fn test_histogram_metric_arg() {
        let cli = Cli::parse_from(["iotsec-metrics", "histograms", "--metric", "jitter"]);
        match cli.command {
            Commands::Histograms { metric } => {
                assert_eq!(metric.map(HistogramMetric::from), Some(HistogramMetric::Jitter))
            }
            _ => panic!("expected histograms command"),
        }
    }
}
