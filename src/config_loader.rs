use crate::config::Config;
use color_eyre::eyre::Context;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .with_context(|| format!("Failed to open configuration '{}'", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .with_context(|| format!("Failed to parse configuration '{}'", config_path.display()))?;

    config.validate()?;

    if !config.files.is_empty() {
        info!("Configuration overrides {} dataset filenames", config.files.len());
    }

    Ok(config)
}

/// Load the configuration at `config_path`, or the defaults when none is given
pub fn load_or_default(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => load_config(path),
        None => {
            info!("No configuration file given, using default dataset layout");
            Ok(Config::default())
        }
    }
}
