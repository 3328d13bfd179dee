use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tickbook")]
#[command(about = "Tickbook - point-in-time option universes and surfaces")]
#[command(version)]
pub struct Cli {
    /// Log format, overriding the configuration file
    #[arg(long, global = true, value_enum, env = "TICKBOOK_LOG_FORMAT")]
    pub log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Select a snapshot date and print every security's current tick
    Snapshot {
        /// Path to the configuration file
        #[arg(short, long, default_value = "tickbook.yaml")]
        config: PathBuf,

        /// Snapshot date (YYYY-MM-DD), overriding the configuration file
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Build an expiry x strike surface at a snapshot date
    Surface {
        /// Path to the configuration file
        #[arg(short, long, default_value = "tickbook.yaml")]
        config: PathBuf,

        /// Snapshot date (YYYY-MM-DD), overriding the configuration file
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Drop rows and columns with no data
        #[arg(long)]
        prune: bool,
    },

    /// Validate configuration without loading tick data
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "tickbook.yaml")]
        config: PathBuf,
    },

    /// Initialize a new configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "tickbook.yaml")]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormatArg {
    Pretty,
    Json,
    Compact,
}

impl LogFormatArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormatArg::Pretty => "pretty",
            LogFormatArg::Json => "json",
            LogFormatArg::Compact => "compact",
        }
    }
}

impl Commands {
    /// Configuration file the command reads, if any
    pub fn config_path(&self) -> Option<&PathBuf> {
        match self {
            Commands::Snapshot { config, .. }
            | Commands::Surface { config, .. }
            | Commands::Validate { config } => Some(config),
            Commands::Init { .. } => None,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
