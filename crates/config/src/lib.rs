use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TickbookConfig {
    pub universe: UniverseConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UniverseConfig {
    #[serde(default = "default_universe_name")]
    pub name: String,
    /// JSON file of tick rows. Relative paths resolve against the config file.
    pub data_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SnapshotConfig {
    /// Observation date to select; the earliest option date when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<chrono::NaiveDate>,
    /// Tick field published into each security's price quote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SurfaceConfig {
    #[serde(default = "default_surface_field")]
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underlying: Option<String>,
    #[serde(default)]
    pub prune_empty: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            field: default_surface_field(),
            right: None,
            underlying: None,
            prune_empty: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}

impl TickbookConfig {
    /// Tick data location, resolved against the directory of `config_path`.
    pub fn data_path(&self, config_path: &Path) -> PathBuf {
        let data_path = Path::new(&self.universe.data_path);
        if data_path.is_absolute() {
            return data_path.to_path_buf();
        }
        match config_path.parent() {
            Some(dir) => dir.join(data_path),
            None => data_path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
universe:
  data_path: "data/spy.json"
"#;
        let config: TickbookConfig = serde_yaml::from_str(yaml).expect("Failed to parse YAML");

        assert_eq!(config.universe.name, "default");
        assert_eq!(config.snapshot, SnapshotConfig::default());
        assert_eq!(config.surface.field, "implied_volatility");
        assert!(!config.surface.prune_empty);
        assert_eq!(config.logging.format, "compact");
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
universe:
  name: "spy-chain"
  data_path: "/var/data/spy.json"
snapshot:
  date: "2024-01-02"
  price_field: "close"
surface:
  field: "close"
  right: "put"
  underlying: "SPY"
  prune_empty: true
logging:
  format: "json"
"#;
        let config: TickbookConfig = serde_yaml::from_str(yaml).expect("Failed to parse YAML");

        assert_eq!(config.universe.name, "spy-chain");
        assert_eq!(
            config.snapshot.date,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        );
        assert_eq!(config.snapshot.price_field.as_deref(), Some("close"));
        assert_eq!(config.surface.right.as_deref(), Some("put"));
        assert_eq!(config.surface.underlying.as_deref(), Some("SPY"));
        assert!(config.surface.prune_empty);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_data_path_resolution() {
        let mut config = parser::generate_default_config();
        config.universe.data_path = "ticks/spy.json".to_string();
        assert_eq!(
            config.data_path(Path::new("conf/tickbook.yaml")),
            PathBuf::from("conf/ticks/spy.json")
        );

        config.universe.data_path = "/abs/spy.json".to_string();
        assert_eq!(
            config.data_path(Path::new("conf/tickbook.yaml")),
            PathBuf::from("/abs/spy.json")
        );
    }
}
