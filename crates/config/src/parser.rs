use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<TickbookConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());
    parse_config(&content)
}

/// Parse YAML configuration text after environment variable substitution.
pub fn parse_config(content: &str) -> Result<TickbookConfig> {
    let substituted = substitution::substitute_env_vars(content);

    let config: TickbookConfig = serde_yaml::from_str(&substituted)
        .with_context(|| "Failed to parse YAML configuration")?;

    debug!(universe = %config.universe.name, "Configuration parsed");
    Ok(config)
}

#[instrument]
pub fn generate_default_config() -> TickbookConfig {
    TickbookConfig {
        universe: UniverseConfig {
            name: default_universe_name(),
            data_path: default_data_path(),
        },
        snapshot: SnapshotConfig::default(),
        surface: SurfaceConfig::default(),
        logging: LoggingConfig::default(),
    }
}

#[instrument(skip(config))]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &TickbookConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}
