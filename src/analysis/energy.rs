//! Per-node energy report loading.
//!
//! Each energy report is a CSV with one row per node. The node id and the
//! consumed energy (Joules) are located by header name, falling back to the
//! first two columns when the header uses a different spelling.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::types::*;
use crate::registry::Scenario;

/// Header names accepted for the node id column
const NODE_ID_HEADERS: &[&str] = &["nodo_id", "node_id", "nodeid", "node"];

/// Header names accepted for the energy column
const ENERGY_HEADERS: &[&str] = &[
    "energia_consumida(j)",
    "energy_consumed(j)",
    "energy_j",
    "energy",
];

/// Index of the first header matching one of `names`, case-insensitively.
fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.trim().to_ascii_lowercase();
        names.iter().any(|n| *n == h)
    })
}

/// Column found by name, else `fallback` when the header is wide enough and
/// the other column does not already own it.
fn resolve_column(
    by_name: Option<usize>,
    fallback: usize,
    taken: Option<usize>,
    width: usize,
    what: &str,
) -> Result<usize, LoadError> {
    match by_name {
        Some(idx) => Ok(idx),
        None if fallback < width && taken != Some(fallback) => {
            log::debug!("No '{}' header, using column {}", what, fallback);
            Ok(fallback)
        }
        None => Err(LoadError::MissingColumn(what.to_string())),
    }
}

/// Parse an energy report from any reader and tag rows with `scenario`.
pub fn parse_energy<R: Read>(reader: R, scenario: Scenario) -> Result<EnergyTable, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let width = headers.len();
    let node_by_name = find_column(&headers, NODE_ID_HEADERS);
    let energy_by_name = find_column(&headers, ENERGY_HEADERS);

    let node_col = resolve_column(node_by_name, 0, energy_by_name, width, "node id")?;
    let energy_col =
        resolve_column(energy_by_name, 1, Some(node_col), width, "energy consumed (J)")?;

    let label = scenario.label();
    let mut rows = Vec::new();

    for record in rdr.records() {
        let record = record?;
        let node_raw = record.get(node_col).unwrap_or("");
        let energy_raw = record.get(energy_col).unwrap_or("");

        if node_raw.is_empty() {
            return Err(LoadError::invalid("node id", node_raw));
        }
        let energy_j: f64 = energy_raw
            .parse()
            .map_err(|_| LoadError::invalid("energy consumed (J)", energy_raw))?;

        rows.push(EnergyRecord {
            node_id: node_raw.to_string(),
            energy_j,
            variant: scenario.variant,
            condition: scenario.condition,
            scenario: label.clone(),
        });
    }

    Ok(Table::new(rows))
}

/// Load one energy report from disk.
pub fn load_energy_file(path: &Path, scenario: Scenario) -> Result<EnergyTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::Missing {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let table = parse_energy(file, scenario)?;
    log::debug!(
        "Loaded {} energy rows for {} from {}",
        table.len(),
        scenario,
        path.display()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Condition, Variant};

    const SECURED_BASE: Scenario = Scenario::new(Variant::Secured, Condition::Baseline);

    #[test]
    fn test_parse_named_columns() {
        let csv = "Nodo_ID,Energia_Consumida(J)\n1,0.5\n2,1.5\n";
        let table = parse_energy(csv.as_bytes(), SECURED_BASE).unwrap();

        assert_eq!(table.len(), 2);
        let first = &table.rows()[0];
        assert_eq!(first.node_id, "1");
        assert_eq!(first.energy_j, 0.5);
        assert_eq!(first.variant, Variant::Secured);
        assert_eq!(first.condition, Condition::Baseline);
        assert_eq!(first.scenario, "Secured - Baseline");
    }

    #[test]
    fn test_parse_reordered_and_extra_columns() {
        let csv = "Tiempo,Energia_Consumida(J),Nodo_ID\n10, 2.25 ,7\n";
        let table = parse_energy(csv.as_bytes(), SECURED_BASE).unwrap();
        assert_eq!(table.rows()[0].node_id, "7");
        assert_eq!(table.rows()[0].energy_j, 2.25);
    }

    #[test]
    fn test_parse_positional_fallback() {
        let csv = "id,joules\n4.0,3.5\n";
        let table = parse_energy(csv.as_bytes(), SECURED_BASE).unwrap();
        assert_eq!(table.rows()[0].node_id, "4.0");
        assert_eq!(table.rows()[0].energy_j, 3.5);
    }

    #[test]
    fn test_fallback_never_reuses_named_column() {
        // Energy header unknown, its fallback column already holds the node id
        let csv = "Consumo(J),Nodo_ID\n0.5,7\n1.5,8\n";
        assert!(matches!(
            parse_energy(csv.as_bytes(), SECURED_BASE),
            Err(LoadError::MissingColumn(ref c)) if c == "energy consumed (J)"
        ));

        // Node header unknown, its fallback column already holds the energy
        let csv = "Energy,Tiempo\n0.5,10\n";
        assert!(matches!(
            parse_energy(csv.as_bytes(), SECURED_BASE),
            Err(LoadError::MissingColumn(ref c)) if c == "node id"
        ));
    }

    #[test]
    fn test_node_ids_kept_verbatim() {
        let csv = "Nodo_ID,Energia_Consumida(J)\nn1,0.5\ngateway,1.5\n";
        let table = parse_energy(csv.as_bytes(), SECURED_BASE).unwrap();
        let ids: Vec<&str> = table.iter().map(|r| r.node_id.as_str()).collect();
        assert_eq!(ids, vec!["n1", "gateway"]);

        let blank = "Nodo_ID,Energia_Consumida(J)\n,0.5\n";
        assert!(matches!(
            parse_energy(blank.as_bytes(), SECURED_BASE),
            Err(LoadError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_parse_errors() {
        let bad_energy = "Nodo_ID,Energia_Consumida(J)\n1,lots\n";
        assert!(matches!(
            parse_energy(bad_energy.as_bytes(), SECURED_BASE),
            Err(LoadError::InvalidValue { .. })
        ));

        let one_column = "something\n1\n";
        assert!(matches!(
            parse_energy(one_column.as_bytes(), SECURED_BASE),
            Err(LoadError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_header_only_is_empty() {
        let csv = "Nodo_ID,Energia_Consumida(J)\n";
        let table = parse_energy(csv.as_bytes(), SECURED_BASE).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let result = load_energy_file(Path::new("/nonexistent/energy.csv"), SECURED_BASE);
        assert!(matches!(result, Err(LoadError::Missing { .. })));
    }
}
