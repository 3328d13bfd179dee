//! Tickbook CLI Binary
//!
//! Loads a universe of tick rows named by a configuration file, selects a
//! snapshot date and prints snapshot reports or surfaces as JSON on stdout.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use cli::{Cli, Commands};
use config::{
    generate_default_config, load_config, save_config, validate_config, TickbookConfig,
};
use market_data::{
    OptionRight, SelectionSummary, SnapshotCoordinator, SnapshotRow, SurfaceBuilder, TickField,
    TickRow, Universe,
};
use observability::{init_logging, LogFormat};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

#[derive(Serialize)]
struct SnapshotOutput {
    summary: SelectionSummary,
    securities: Vec<SnapshotRow>,
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let loaded = cli.command.config_path().map(load_config);
    let format = cli
        .log_format
        .map(|f| f.as_str().to_string())
        .or_else(|| match &loaded {
            Some(Ok(config)) => Some(config.logging.format.clone()),
            _ => None,
        })
        .and_then(|f| LogFormat::parse(&f))
        .unwrap_or_default();
    init_logging("tickbook", format)?;
    debug!(?cli, "CLI arguments parsed");

    match cli.command {
        Commands::Snapshot { config, date } => {
            info!("Executing 'snapshot' command");
            let settings = loaded_config(loaded)?;
            snapshot_command(&settings, &config, date)
        }
        Commands::Surface {
            config,
            date,
            prune,
        } => {
            info!("Executing 'surface' command");
            let settings = loaded_config(loaded)?;
            surface_command(&settings, &config, date, prune)
        }
        Commands::Validate { config } => {
            info!("Executing 'validate' command");
            let settings = loaded_config(loaded)?;
            validate_command(&settings, &config)
        }
        Commands::Init { output } => {
            info!("Executing 'init' command");
            init_command(output)
        }
    }
}

fn loaded_config(loaded: Option<Result<TickbookConfig>>) -> Result<TickbookConfig> {
    loaded.context("Command does not take a configuration file")?
}

/// Refuse to run on a configuration with errors.
fn check_config(config: &TickbookConfig) -> Result<()> {
    let report = validate_config(config);

    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message);
    }

    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot run due to configuration errors");
    }
    Ok(())
}

fn load_universe(config: &TickbookConfig, config_path: &Path) -> Result<Universe> {
    let data_path = config.data_path(config_path);
    info!(?data_path, "Loading tick rows");

    let content = fs::read_to_string(&data_path)
        .with_context(|| format!("Failed to read tick data: {:?}", data_path))?;
    let rows: Vec<TickRow> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse tick rows: {:?}", data_path))?;

    Universe::from_rows(config.universe.name.clone(), rows)
        .with_context(|| format!("Invalid tick data in {:?}", data_path))
}

fn select_snapshot(
    config: &TickbookConfig,
    universe: &mut Universe,
    date: Option<NaiveDate>,
) -> Result<SelectionSummary> {
    let mut coordinator = SnapshotCoordinator::new();
    if let Some(field) = &config.snapshot.price_field {
        coordinator = coordinator.with_price_field(field.parse::<TickField>()?);
    }

    match date.or(config.snapshot.date) {
        Some(date) => Ok(coordinator.select(universe, date)),
        None => coordinator
            .select_earliest(universe)
            .context("No snapshot date given and no option has any tick history"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn snapshot_command(
    config: &TickbookConfig,
    config_path: &Path,
    date: Option<NaiveDate>,
) -> Result<()> {
    check_config(config)?;
    let mut universe = load_universe(config, config_path)?;
    let summary = select_snapshot(config, &mut universe, date)?;

    print_json(&SnapshotOutput {
        summary,
        securities: universe.snapshot_rows(),
    })
}

fn surface_command(
    config: &TickbookConfig,
    config_path: &Path,
    date: Option<NaiveDate>,
    prune: bool,
) -> Result<()> {
    check_config(config)?;
    let mut universe = load_universe(config, config_path)?;
    let summary = select_snapshot(config, &mut universe, date)?;

    let mut builder = SurfaceBuilder::new().field(config.surface.field.parse::<TickField>()?);
    if let Some(right) = config.surface.right.as_deref().and_then(OptionRight::parse) {
        builder = builder.right(right);
    }
    if let Some(underlying) = &config.surface.underlying {
        builder = builder.underlying(underlying.clone());
    }

    let mut surface = builder.build(&universe);
    if prune || config.surface.prune_empty {
        surface.prune_empty();
    }
    info!(
        date = %summary.date,
        expiries = surface.expiries().len(),
        strikes = surface.strikes().len(),
        "Surface ready"
    );

    print_json(&surface)
}

fn validate_command(config: &TickbookConfig, config_path: &Path) -> Result<()> {
    let report = validate_config(config);

    println!("Validating: {:?}", config_path);
    println!();

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Universe: {}", config.universe.name);
    println!("Tick data: {:?}", config.data_path(config_path));
    match config.snapshot.date {
        Some(date) => println!("Snapshot date: {}", date),
        None => println!("Snapshot date: earliest option date"),
    }
    println!("Surface field: {}", config.surface.field);

    Ok(())
}

fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!("  1. Point universe.data_path at a JSON file of tick rows");
    println!(
        "  2. Run 'tickbook validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  3. Run 'tickbook surface --config {:?}' to build a surface",
        output_path
    );

    Ok(())
}
