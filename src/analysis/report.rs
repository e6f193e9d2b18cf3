//! Report generation for the scenario comparison.
//!
//! Generates a JSON report, a human-readable text report and CSV exports of
//! the unified tables.

use std::fs::{self, File};
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use super::aggregate::UnifiedTables;
use super::store::DataStore;
use super::summary::{EnergySummary, KpiReport};
use super::types::*;

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub analysis_timestamp: String,
    pub data_dir: String,
    pub energy_rows: usize,
    pub metrics_rows: usize,
    pub histogram_bins: usize,
    pub motion_samples: usize,
    pub skipped_datasets: usize,
}

/// Complete comparison report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    pub energy_summary: Vec<EnergySummary>,
    pub metrics: MetricsTable,
    pub kpis: KpiReport,
    pub skipped: Vec<SkippedDataset>,
}

impl AnalysisReport {
    /// Build a report from a store for a scenario selection.
    pub fn from_store<S: AsRef<str>>(store: &DataStore, selected: &[S]) -> Self {
        let tables = store.tables();
        Self {
            metadata: metadata(store.registry().data_dir(), tables),
            energy_summary: store.energy_summary().to_vec(),
            metrics: tables.metrics.filter_scenarios(selected),
            kpis: store.kpis(selected),
            skipped: tables.skipped.clone(),
        }
    }
}

fn metadata(data_dir: &Path, tables: &UnifiedTables) -> ReportMetadata {
    ReportMetadata {
        analysis_timestamp: chrono::Utc::now().to_rfc3339(),
        data_dir: data_dir.display().to_string(),
        energy_rows: tables.energy.len(),
        metrics_rows: tables.metrics.len(),
        histogram_bins: tables.histograms.len(),
        motion_samples: tables.motion.len(),
        skipped_datasets: tables.skipped.len(),
    }
}

/// Generate JSON report
pub fn write_json_report(report: &AnalysisReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

/// Write any unified table as CSV. The header row is written even when the
/// table has no rows.
pub fn write_table_csv<R: TableRow>(table: &Table<R>, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer
        .write_record(table.columns())
        .context("Failed to write CSV header")?;
    for row in table {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write CSV row to {}", output_path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", output_path.display()))?;

    log::info!("{} rows written to {}", table.len(), output_path.display());
    Ok(())
}

/// Export all four unified tables into `output_dir`.
pub fn write_tables(tables: &UnifiedTables, output_dir: &Path) -> Result<()> {
    write_table_csv(&tables.energy, &output_dir.join("energy.csv"))?;
    write_table_csv(&tables.metrics, &output_dir.join("metrics.csv"))?;
    write_table_csv(&tables.histograms, &output_dir.join("histograms.csv"))?;
    write_table_csv(&tables.motion, &output_dir.join("motion.csv"))?;
    Ok(())
}

fn fmt_opt(value: Option<f64>, precision: usize, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.*}{}", precision, v, unit),
        None => "N/A".to_string(),
    }
}

fn fmt_count(value: Option<u64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn section(lines: &mut Vec<String>, title: &str) {
    lines.push("=".repeat(80));
    lines.push(format!("{:^80}", title));
    lines.push("=".repeat(80));
    lines.push(String::new());
}

/// Render the human-readable report
pub fn render_text_report(report: &AnalysisReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    section(&mut lines, "IOT SECURITY SCENARIO COMPARISON");

    lines.push(format!("Analysis Date: {}", report.metadata.analysis_timestamp));
    lines.push(format!("Data Directory: {}", report.metadata.data_dir));
    lines.push(format!("Energy rows: {}", report.metadata.energy_rows));
    lines.push(format!("Metrics rows: {}", report.metadata.metrics_rows));
    lines.push(format!("Histogram bins: {}", report.metadata.histogram_bins));
    lines.push(format!("Motion samples: {}", report.metadata.motion_samples));
    lines.push(String::new());

    section(&mut lines, "KEY PERFORMANCE INDICATORS");
    let kpis = &report.kpis;
    match &kpis.energy_saved_under_attack {
        Some(saved) => lines.push(format!(
            "Energy saved under attack (Secured vs Unsecured): {:.2} J ({})",
            saved.saved_j,
            fmt_opt(saved.percent, 1, "%")
        )),
        None => lines.push("Energy saved under attack: N/A (missing attack data)".to_string()),
    }
    lines.push(format!(
        "Lost packets under attack: Unsecured {}, Secured {}",
        fmt_count(kpis.lost_packets_unsecured_attack),
        fmt_count(kpis.lost_packets_secured_attack)
    ));
    match &kpis.worst_average_delay {
        Some(worst) => lines.push(format!(
            "Worst average delay: {:.4} s ({})",
            worst.avg_delay_s, worst.scenario
        )),
        None => lines.push("Worst average delay: N/A".to_string()),
    }
    lines.push(format!(
        "Security overhead at baseline: {}",
        fmt_opt(kpis.baseline_overhead_bytes, 0, " bytes/packet")
    ));
    lines.push(format!(
        "Baseline energy cost of security: {}",
        fmt_opt(kpis.baseline_energy_cost_percent, 1, "%")
    ));
    lines.push(format!(
        "Energy growth under attack: Unsecured {}, Secured {}",
        fmt_opt(kpis.attack_amplification_unsecured, 1, "x"),
        fmt_opt(kpis.attack_amplification_secured, 1, "x")
    ));
    lines.push(String::new());

    section(&mut lines, "ENERGY CONSUMPTION");
    if report.energy_summary.is_empty() {
        lines.push("No energy data.".to_string());
    }
    for s in &report.energy_summary {
        lines.push(format!(
            "  {:<26} mean {:>10.4} J   total {:>12.4} J   ({} nodes)",
            s.scenario, s.mean_energy_j, s.total_energy_j, s.node_count
        ));
    }
    lines.push(String::new());

    section(&mut lines, "FLOW METRICS (FLOW 1)");
    if report.metrics.is_empty() {
        lines.push("No data for the selected scenarios.".to_string());
    }
    for m in &report.metrics {
        lines.push(format!("{}:", m.scenario));
        lines.push(format!(
            "  Delay: total {:.4} s, average {:.6} s",
            m.delay_sum_s, m.avg_delay_s
        ));
        lines.push(format!(
            "  Jitter: total {:.4} s, average {:.6} s",
            m.jitter_sum_s, m.avg_jitter_s
        ));
        lines.push(format!(
            "  Packets: {} received, {} lost; {:.1} bytes/packet",
            m.rx_packets, m.lost_packets, m.bytes_per_packet
        ));
    }
    lines.push(String::new());

    if !report.skipped.is_empty() {
        section(&mut lines, "SKIPPED DATASETS");
        for skip in &report.skipped {
            lines.push(format!("  {} ({}): {}", skip.key, skip.path, skip.reason));
        }
        lines.push(String::new());
    }

    lines.push("=".repeat(80));
    lines.join("\n")
}

/// Generate human-readable text report
pub fn write_text_report(report: &AnalysisReport, output_path: &Path) -> Result<()> {
    fs::write(output_path, render_text_report(report))
        .with_context(|| format!("Failed to write text report to {}", output_path.display()))?;

    log::info!("Text report written to {}", output_path.display());
    Ok(())
}

/// Print a summary to stdout
pub fn print_summary(report: &AnalysisReport) {
    println!("\n=== IOT SECURITY COMPARISON SUMMARY ===\n");
    println!("Energy rows: {}", report.metadata.energy_rows);
    println!("Metrics rows: {}", report.metadata.metrics_rows);
    println!("Histogram bins: {}", report.metadata.histogram_bins);
    println!("Motion samples: {}", report.metadata.motion_samples);

    if let Some(ref saved) = report.kpis.energy_saved_under_attack {
        println!("\nEnergy saved under attack: {:.2} J", saved.saved_j);
        if let Some(pct) = saved.percent {
            println!("  Effectiveness: {:.1}%", pct);
        }
    }

    if let Some(ref worst) = report.kpis.worst_average_delay {
        println!("\nWorst average delay: {:.4} s ({})", worst.avg_delay_s, worst.scenario);
    }

    if !report.skipped.is_empty() {
        println!("\nSkipped datasets: {}", report.skipped.len());
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FileRegistry;

    #[test]
    fn test_empty_table_csv_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("histograms.csv");
        write_table_csv(&HistogramTable::empty(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), "scenario,metric,start_s,width_s,count");
    }

    #[test]
    fn test_report_on_empty_data() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(FileRegistry::new(dir.path()));
        let report = AnalysisReport::from_store(&store, &store.scenarios());

        let text = render_text_report(&report);
        assert!(text.contains("No energy data."));
        assert!(text.contains("Worst average delay: N/A"));
        assert!(text.contains("S_BASE_ENERGIA"));

        let json_path = dir.path().join("report.json");
        write_json_report(&report, &json_path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(value["metadata"]["skipped_datasets"], 12);
        assert!(value["kpis"]["worst_average_delay"].is_null());
    }
}
