//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// IncidentMap - linked incident list and map
#[derive(Parser)]
#[command(
    name = "im",
    about = "Browse geolocated incident records as a linked card list and map",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Dataset file (overrides data.path in the config)
    #[arg(short, long, global = true, help = "Dataset file (.json, .yaml or .yml)")]
    pub data: Option<PathBuf>,

    /// Record to select when the TUI starts
    #[arg(short, long, help = "Record to select when the TUI starts")]
    pub select: Option<i64>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the loaded records
    Records {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Drive the engine headlessly and print the resulting view-models
    Snapshot {
        /// Record ids to activate in order (spaced beyond the debounce window)
        #[arg(short, long = "select", value_name = "ID", allow_negative_numbers = true)]
        select: Vec<i64>,

        /// Which view the activations come from
        #[arg(long, default_value = "list")]
        source: SourceArg,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Activation source for `snapshot`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceArg {
    #[default]
    List,
    Map,
}

impl std::str::FromStr for SourceArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "SourceArg::from_str: called");
        match s.to_lowercase().as_str() {
            "list" | "card" => Ok(Self::List),
            "map" | "marker" => Ok(Self::Map),
            _ => Err(format!("Unknown source: {}. Use: list or map", s)),
        }
    }
}

/// Output format for records/snapshot commands
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => {
                debug!(%s, "OutputFormat::from_str: unknown format");
                Err(format!("Unknown format: {}. Use: text or json", s))
            }
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("incidentmap")
        .join("logs")
        .join("incidentmap.log");
    debug!(?path, "get_log_path: returning path");
    path
}
