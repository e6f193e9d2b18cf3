//! Cross-scenario summaries and KPIs.
//!
//! Every KPI is an `Option`: `None` means a referenced scenario has no rows
//! (or a ratio would divide by zero) and the figure is unavailable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::*;
use crate::registry::{Condition, Scenario, Variant};

/// Energy statistics of one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySummary {
    pub scenario: String,
    pub variant: Variant,
    pub condition: Condition,
    pub mean_energy_j: f64,
    pub total_energy_j: f64,
    pub node_count: usize,
}

/// Mean and total energy per scenario, ordered by scenario label.
pub fn energy_summary(energy: &EnergyTable) -> Vec<EnergySummary> {
    let mut groups: BTreeMap<&str, (Variant, Condition, f64, usize)> = BTreeMap::new();
    for row in energy {
        let entry = groups
            .entry(row.scenario.as_str())
            .or_insert((row.variant, row.condition, 0.0, 0));
        entry.2 += row.energy_j;
        entry.3 += 1;
    }

    groups
        .into_iter()
        .map(|(scenario, (variant, condition, total, count))| EnergySummary {
            scenario: scenario.to_string(),
            variant,
            condition,
            mean_energy_j: total / count as f64,
            total_energy_j: total,
            node_count: count,
        })
        .collect()
}

/// Summary row for `scenario`, if it had any energy rows.
pub fn summary_for<'a>(
    summary: &'a [EnergySummary],
    scenario: Scenario,
) -> Option<&'a EnergySummary> {
    let label = scenario.label();
    summary.iter().find(|s| s.scenario == label)
}

fn mean_energy(summary: &[EnergySummary], variant: Variant, condition: Condition) -> Option<f64> {
    summary_for(summary, Scenario::new(variant, condition)).map(|s| s.mean_energy_j)
}

/// Energy the security mechanism saves per node under attack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergySavings {
    /// Unsecured mean minus secured mean (J)
    pub saved_j: f64,
    /// `saved_j` as a percentage of the unsecured mean; `None` when that mean is zero
    pub percent: Option<f64>,
}

/// Energy saved under attack by the secured variant.
pub fn energy_saved_under_attack(summary: &[EnergySummary]) -> Option<EnergySavings> {
    let unsecured = mean_energy(summary, Variant::Unsecured, Condition::UnderAttack)?;
    let secured = mean_energy(summary, Variant::Secured, Condition::UnderAttack)?;
    let saved_j = unsecured - secured;

    Some(EnergySavings {
        saved_j,
        percent: percent_of(saved_j, unsecured),
    })
}

fn percent_of(value: f64, reference: f64) -> Option<f64> {
    (reference != 0.0).then(|| value / reference * 100.0)
}

/// Highest average delay among the selected scenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorstDelay {
    pub scenario: String,
    pub avg_delay_s: f64,
}

/// Worst average delay among the rows of `selected` scenarios. Ties go to the
/// first row in table order.
pub fn worst_average_delay<S: AsRef<str>>(
    metrics: &MetricsTable,
    selected: &[S],
) -> Option<WorstDelay> {
    metrics
        .filter_scenarios(selected)
        .iter()
        .fold(None, |worst: Option<&MetricsRecord>, row| match worst {
            Some(w) if w.avg_delay_s >= row.avg_delay_s => Some(w),
            _ => Some(row),
        })
        .map(|row| WorstDelay {
            scenario: row.scenario.clone(),
            avg_delay_s: row.avg_delay_s,
        })
}

/// Lost packets reported for `scenario`, `None` without a metrics row.
pub fn lost_packets(metrics: &MetricsTable, scenario: &str) -> Option<u64> {
    let rows = metrics.for_scenario(scenario);
    if rows.is_empty() {
        return None;
    }
    Some(rows.iter().map(|r| r.lost_packets).sum())
}

fn mean_bytes_per_packet(metrics: &MetricsTable, scenario: Scenario) -> Option<f64> {
    let rows = metrics.for_scenario(&scenario.label());
    if rows.is_empty() {
        return None;
    }
    Some(rows.iter().map(|r| r.bytes_per_packet).sum::<f64>() / rows.len() as f64)
}

/// Extra bytes per packet the secured variant sends at baseline.
pub fn baseline_overhead_bytes(metrics: &MetricsTable) -> Option<f64> {
    let secured =
        mean_bytes_per_packet(metrics, Scenario::new(Variant::Secured, Condition::Baseline))?;
    let unsecured =
        mean_bytes_per_packet(metrics, Scenario::new(Variant::Unsecured, Condition::Baseline))?;
    Some(secured - unsecured)
}

/// Percentage increase of mean node energy caused by security at baseline.
pub fn baseline_energy_cost_percent(summary: &[EnergySummary]) -> Option<f64> {
    let secured = mean_energy(summary, Variant::Secured, Condition::Baseline)?;
    let unsecured = mean_energy(summary, Variant::Unsecured, Condition::Baseline)?;
    percent_of(secured - unsecured, unsecured)
}

/// How many times the mean node energy of `variant` grows under attack.
pub fn attack_amplification(summary: &[EnergySummary], variant: Variant) -> Option<f64> {
    let base = mean_energy(summary, variant, Condition::Baseline)?;
    let attack = mean_energy(summary, variant, Condition::UnderAttack)?;
    (base != 0.0).then(|| attack / base)
}

/// Every KPI for one scenario selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiReport {
    pub selected_scenarios: Vec<String>,
    pub energy_saved_under_attack: Option<EnergySavings>,
    pub worst_average_delay: Option<WorstDelay>,
    pub lost_packets_unsecured_attack: Option<u64>,
    pub lost_packets_secured_attack: Option<u64>,
    pub baseline_overhead_bytes: Option<f64>,
    pub baseline_energy_cost_percent: Option<f64>,
    pub attack_amplification_secured: Option<f64>,
    pub attack_amplification_unsecured: Option<f64>,
}

/// Compute all KPIs. Comparisons between fixed scenarios use the full
/// tables; only the worst delay honours `selected`.
pub fn compute_kpis<S: AsRef<str>>(
    metrics: &MetricsTable,
    summary: &[EnergySummary],
    selected: &[S],
) -> KpiReport {
    let attack_label = |variant| Scenario::new(variant, Condition::UnderAttack).label();

    KpiReport {
        selected_scenarios: selected.iter().map(|s| s.as_ref().to_string()).collect(),
        energy_saved_under_attack: energy_saved_under_attack(summary),
        worst_average_delay: worst_average_delay(metrics, selected),
        lost_packets_unsecured_attack: lost_packets(metrics, &attack_label(Variant::Unsecured)),
        lost_packets_secured_attack: lost_packets(metrics, &attack_label(Variant::Secured)),
        baseline_overhead_bytes: baseline_overhead_bytes(metrics),
        baseline_energy_cost_percent: baseline_energy_cost_percent(summary),
        attack_amplification_secured: attack_amplification(summary, Variant::Secured),
        attack_amplification_unsecured: attack_amplification(summary, Variant::Unsecured),
    }
}
