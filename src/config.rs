use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::registry::{DatasetKey, FileRegistry};

/// Analyzer configuration, loaded from YAML
///
/// ```yaml
/// data_dir: "results/run-42"
/// output_dir: "analysis_output"
/// files:
///   NS_ATTK_METRICAS: "NS_metricas-ATTK.xml"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Directory the dataset filenames resolve against
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory reports are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Filename overrides keyed by dataset key (e.g. `S_BASE_ENERGIA`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub files: BTreeMap<String, String>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("analysis_output")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            files: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (key, file) in &self.files {
            key.parse::<DatasetKey>()
                .map_err(|e| ValidationError::InvalidFiles(e.to_string()))?;
            if file.trim().is_empty() {
                return Err(ValidationError::InvalidFiles(format!(
                    "filename for {} cannot be empty",
                    key
                )));
            }
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(ValidationError::InvalidOutput(
                "output_dir cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Overrides as typed dataset keys. Call after [`Config::validate`].
    pub fn file_overrides(&self) -> Result<Vec<(DatasetKey, String)>, ValidationError> {
        self.files
            .iter()
            .map(|(key, file)| {
                let key = key
                    .parse::<DatasetKey>()
                    .map_err(|e| ValidationError::InvalidFiles(e.to_string()))?;
                Ok((key, file.trim().to_string()))
            })
            .collect()
    }

    /// Build the immutable file registry for this configuration
    pub fn registry(&self) -> Result<FileRegistry, ValidationError> {
        Ok(FileRegistry::with_overrides(
            self.data_dir.clone(),
            self.file_overrides()?,
        ))
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid files configuration: {0}")]
    InvalidFiles(String),
    #[error("Invalid output configuration: {0}")]
    InvalidOutput(String),
}
