use crate::*;
use market_data::{OptionRight, TickField};
use observability::LogFormat;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Universe name is required")]
    MissingUniverseName,

    #[error("Universe data_path is required")]
    MissingDataPath,

    #[error("{field}: unknown tick field '{value}'")]
    UnknownTickField { field: String, value: String },

    #[error("Invalid option right: {0}. Must be one of: call, put")]
    InvalidRight(String),

    #[error("Invalid log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("Environment variable '{var}' is missing or invalid: {message}")]
    InvalidEnvVar { var: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

pub fn validate_config(config: &TickbookConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_universe(&config.universe, &mut report);
    validate_snapshot(&config.snapshot, &mut report);
    validate_surface(&config.surface, &mut report);
    validate_logging(&config.logging, &mut report);

    report
}

fn validate_universe(universe: &UniverseConfig, report: &mut ValidationReport) {
    if universe.name.trim().is_empty() {
        report.add_error(ValidationError::MissingUniverseName);
    }

    if universe.data_path.trim().is_empty() {
        report.add_error(ValidationError::MissingDataPath);
    }

    for var in unresolved_env_vars(&universe.data_path) {
        report.add_error(ValidationError::InvalidEnvVar {
            var,
            message: "universe.data_path still contains the placeholder".to_string(),
        });
    }
}

fn validate_tick_field(field: &str, value: &str, report: &mut ValidationReport) {
    if TickField::parse(value).is_none() {
        report.add_error(ValidationError::UnknownTickField {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

fn validate_snapshot(snapshot: &SnapshotConfig, report: &mut ValidationReport) {
    if snapshot.date.is_none() {
        report.add_warning(
            "snapshot.date",
            "No snapshot date set, the earliest option observation date will be used",
        );
        report.add_default("snapshot.date", "earliest option date");
    }

    if let Some(price_field) = &snapshot.price_field {
        validate_tick_field("snapshot.price_field", price_field, report);
    }
}

fn validate_surface(surface: &SurfaceConfig, report: &mut ValidationReport) {
    validate_tick_field("surface.field", &surface.field, report);

    if let Some(right) = &surface.right {
        if OptionRight::parse(right).is_none() {
            report.add_error(ValidationError::InvalidRight(right.clone()));
        }
    }

    if matches!(&surface.underlying, Some(u) if u.trim().is_empty()) {
        report.add_warning(
            "surface.underlying",
            "Empty underlying filter matches no options",
        );
    }
}

fn validate_logging(logging: &LoggingConfig, report: &mut ValidationReport) {
    if LogFormat::parse(&logging.format).is_none() {
        report.add_error(ValidationError::InvalidLogFormat(logging.format.clone()));
    }
}
