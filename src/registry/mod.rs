//! # Dataset Registry Module
//!
//! This module maps the logical dataset keys of a comparison run to the
//! simulator output files that back them. The keys encode a two-axis
//! taxonomy:
//!
//! - **Variant**: whether the simulated network runs the security mechanism
//!   (`Secured`, key prefix `S_`) or not (`Unsecured`, key prefix `NS_`)
//! - **Condition**: unperturbed (`Baseline`, `BASE`) or under adversarial
//!   load (`UnderAttack`, `ATTK`)
//!
//! and a third axis naming the file role:
//!
//! - **Energy** (`ENERGIA`): per-node energy report (CSV)
//! - **Metrics** (`METRICAS`): FlowMonitor statistics (XML)
//! - **Animation** (`ANIM`): NetAnim node mobility trace (XML)
//!
//! ## Default Layout
//!
//! ```text
//! <data_dir>/
//! |-- S_reporte_energia.csv          # S_BASE_ENERGIA
//! |-- NS_reporte_energia.csv         # NS_BASE_ENERGIA
//! |-- S_reporte_energia_ATTK.csv     # S_ATTK_ENERGIA
//! |-- NS_reporte_energia_ATTK.csv    # NS_ATTK_ENERGIA
//! |-- S_metricas.xml                 # S_BASE_METRICAS
//! |-- NS_metricas.xml                # NS_BASE_METRICAS
//! |-- S_metricas-ATTK.xml            # S_ATTK_METRICAS
//! |-- NS_metrica-ATTK.xml            # NS_ATTK_METRICAS
//! |-- S_iot-animacion.xml            # S_BASE_ANIM
//! |-- NS_iot-animacion.xml           # NS_BASE_ANIM
//! |-- S_iot-animacion-ATTK.xml       # S_ATTK_ANIM
//! \-- NS_iot-animacion_ATTK.xml      # NS_ATTK_ANIM
//! ```
//!
//! The registry is built once at startup and handed to the aggregator by
//! reference. It is never mutated after construction.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Whether the simulated network runs the security mechanism
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Variant {
    Secured,
    Unsecured,
}

impl Variant {
    fn key_prefix(self) -> &'static str {
        match self {
            Variant::Secured => "S",
            Variant::Unsecured => "NS",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Secured => write!(f, "Secured"),
            Variant::Unsecured => write!(f, "Unsecured"),
        }
    }
}

/// Whether the scenario ran unperturbed or under attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Condition {
    Baseline,
    UnderAttack,
}

impl Condition {
    fn key_part(self) -> &'static str {
        match self {
            Condition::Baseline => "BASE",
            Condition::UnderAttack => "ATTK",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Baseline => write!(f, "Baseline"),
            Condition::UnderAttack => write!(f, "UnderAttack"),
        }
    }
}

/// The kind of simulator artifact a dataset key points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Per-node energy report (CSV)
    Energy,
    /// FlowMonitor statistics (XML)
    Metrics,
    /// NetAnim mobility trace (XML)
    Animation,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Energy, Role::Metrics, Role::Animation];

    fn key_suffix(self) -> &'static str {
        match self {
            Role::Energy => "ENERGIA",
            Role::Metrics => "METRICAS",
            Role::Animation => "ANIM",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Energy => write!(f, "energy"),
            Role::Metrics => write!(f, "metrics"),
            Role::Animation => write!(f, "animation"),
        }
    }
}

/// A (variant, condition) pair. Its label is the join key shared by every
/// unified table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Scenario {
    pub variant: Variant,
    pub condition: Condition,
}

impl Scenario {
    /// Scenarios in aggregation order: conditions outer, variants inner.
    pub const ALL: [Scenario; 4] = [
        Scenario::new(Variant::Secured, Condition::Baseline),
        Scenario::new(Variant::Unsecured, Condition::Baseline),
        Scenario::new(Variant::Secured, Condition::UnderAttack),
        Scenario::new(Variant::Unsecured, Condition::UnderAttack),
    ];

    pub const fn new(variant: Variant, condition: Condition) -> Self {
        Self { variant, condition }
    }

    /// The "Variant - Condition" label, e.g. `Secured - Baseline`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.variant, self.condition)
    }

    /// Inverse of [`Scenario::label`].
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.variant, self.condition)
    }
}

/// One (variant, condition, role) triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DatasetKey {
    pub scenario: Scenario,
    pub role: Role,
}

impl DatasetKey {
    pub const fn new(variant: Variant, condition: Condition, role: Role) -> Self {
        Self {
            scenario: Scenario::new(variant, condition),
            role,
        }
    }

    pub fn variant(&self) -> Variant {
        self.scenario.variant
    }

    pub fn condition(&self) -> Condition {
        self.scenario.condition
    }

    /// All twelve keys, grouped by role, each group in scenario order.
    pub fn all() -> Vec<DatasetKey> {
        Role::ALL
            .into_iter()
            .flat_map(|role| {
                Scenario::ALL.into_iter().map(move |scenario| DatasetKey { scenario, role })
            })
            .collect()
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.scenario.variant.key_prefix(),
            self.scenario.condition.key_part(),
            self.role.key_suffix()
        )
    }
}

/// Error returned when a string is not one of the twelve dataset keys
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown dataset key: {0}")]
pub struct UnknownDatasetKey(pub String);

impl FromStr for DatasetKey {
    type Err = UnknownDatasetKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatasetKey::all()
            .into_iter()
            .find(|key| key.to_string() == s.trim())
            .ok_or_else(|| UnknownDatasetKey(s.to_string()))
    }
}

/// Default filename for each dataset key, as produced by the simulation scripts
fn default_filename(key: DatasetKey) -> &'static str {
    use Condition::*;
    use Role::*;
    use Variant::*;

    match (key.variant(), key.condition(), key.role) {
        (Secured, Baseline, Energy) => "S_reporte_energia.csv",
        (Unsecured, Baseline, Energy) => "NS_reporte_energia.csv",
        (Secured, UnderAttack, Energy) => "S_reporte_energia_ATTK.csv",
        (Unsecured, UnderAttack, Energy) => "NS_reporte_energia_ATTK.csv",
        (Secured, Baseline, Metrics) => "S_metricas.xml",
        (Unsecured, Baseline, Metrics) => "NS_metricas.xml",
        (Secured, UnderAttack, Metrics) => "S_metricas-ATTK.xml",
        (Unsecured, UnderAttack, Metrics) => "NS_metrica-ATTK.xml",
        (Secured, Baseline, Animation) => "S_iot-animacion.xml",
        (Unsecured, Baseline, Animation) => "NS_iot-animacion.xml",
        (Secured, UnderAttack, Animation) => "S_iot-animacion-ATTK.xml",
        (Unsecured, UnderAttack, Animation) => "NS_iot-animacion_ATTK.xml",
    }
}

/// Immutable mapping from dataset keys to file paths
#[derive(Debug, Clone, PartialEq)]
pub struct FileRegistry {
    data_dir: PathBuf,
    files: BTreeMap<DatasetKey, PathBuf>,
}

impl FileRegistry {
    /// Registry with the default filenames resolved against `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let files = DatasetKey::all()
            .into_iter()
            .map(|key| (key, data_dir.join(default_filename(key))))
            .collect();
        Self { data_dir, files }
    }

    /// Registry with some filenames replaced. Relative overrides resolve
    /// against `data_dir`, absolute ones are used as-is.
    pub fn with_overrides<I, P>(data_dir: impl Into<PathBuf>, overrides: I) -> Self
    where
        I: IntoIterator<Item = (DatasetKey, P)>,
        P: AsRef<Path>,
    {
        let mut registry = Self::new(data_dir);
        for (key, file) in overrides {
            let path = registry.data_dir.join(file.as_ref());
            registry.files.insert(key, path);
        }
        registry
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path backing `key`. Every key has an entry.
    pub fn path(&self, key: DatasetKey) -> &Path {
        // `new` populates all twelve keys and overrides only replace them
        self.files
            .get(&key)
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new(default_filename(key)))
    }

    /// Keys of one role in aggregation order, paired with their paths.
    pub fn entries(&self, role: Role) -> Vec<(DatasetKey, &Path)> {
        Scenario::ALL
            .into_iter()
            .map(|scenario| {
                let key = DatasetKey { scenario, role };
                (key, self.path(key))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_round_trip() {
        let names: Vec<String> = DatasetKey::all().iter().map(|k| k.to_string()).collect();
        assert_eq!(names.len(), 12);
        assert_eq!(names[0], "S_BASE_ENERGIA");
        assert_eq!(names[3], "NS_ATTK_ENERGIA");
        assert_eq!(names[5], "NS_BASE_METRICAS");
        assert_eq!(names[11], "NS_ATTK_ANIM");

        for name in &names {
            let key: DatasetKey = name.parse().unwrap();
            assert_eq!(&key.to_string(), name);
        }
        assert!("S_BASE_VIDEO".parse::<DatasetKey>().is_err());
    }

    #[test]
    fn test_scenario_labels() {
        let labels: Vec<String> = Scenario::ALL.iter().map(Scenario::label).collect();
        assert_eq!(
            labels,
            vec![
                "Secured - Baseline",
                "Unsecured - Baseline",
                "Secured - UnderAttack",
                "Unsecured - UnderAttack",
            ]
        );
        assert_eq!(
            Scenario::from_label("Unsecured - UnderAttack"),
            Some(Scenario::new(Variant::Unsecured, Condition::UnderAttack))
        );
        assert_eq!(Scenario::from_label("Secured-Baseline"), None);
    }

    #[test]
    fn test_default_registry() {
        let registry = FileRegistry::new("/data");
        let key = DatasetKey::new(Variant::Unsecured, Condition::UnderAttack, Role::Metrics);
        assert_eq!(registry.path(key), Path::new("/data/NS_metrica-ATTK.xml"));

        let energy = registry.entries(Role::Energy);
        assert_eq!(energy.len(), 4);
        assert_eq!(energy[0].1, Path::new("/data/S_reporte_energia.csv"));
        assert_eq!(energy[2].1, Path::new("/data/S_reporte_energia_ATTK.csv"));
    }

    #[test]
    fn test_overrides() {
        let key = DatasetKey::new(Variant::Secured, Condition::Baseline, Role::Animation);
        let energy = DatasetKey::new(Variant::Secured, Condition::Baseline, Role::Energy);
        let untouched = DatasetKey::new(Variant::Unsecured, Condition::Baseline, Role::Animation);
        let registry = FileRegistry::with_overrides(
            "/data",
            vec![(key, "anim/secure.xml"), (energy, "/abs/e.csv")],
        );
        assert_eq!(registry.path(key), Path::new("/data/anim/secure.xml"));
        assert_eq!(registry.path(energy), Path::new("/abs/e.csv"));
        assert_eq!(registry.path(untouched), Path::new("/data/NS_iot-animacion.xml"));
    }
}
