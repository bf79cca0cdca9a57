//! IncidentMap - linked incident list and map
//!
//! CLI entry point for browsing and inspecting incident datasets.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use incidentmap::cli::{Cli, Command, OutputFormat, SourceArg, get_log_path};
use incidentmap::config::Config;
use incidentmap::domain::{FieldKind, RecordStore};
use incidentmap::host::HostCall;
use incidentmap::loader::load_or_fallback;
use incidentmap::selection::{SelectOutcome, Source};
use incidentmap::snapshot::run_snapshot;
use incidentmap::tui;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Logging goes to a file so it never draws over the TUI
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(data) = cli.data.clone() {
        config.data.path = Some(data);
    }
    config.validate().context("Invalid configuration")?;

    let store = load_or_fallback(config.data.path.as_deref()).context("Failed to load dataset")?;
    info!(records = store.len(), max_capacity = store.max_capacity(), "Dataset ready");
    let store = Arc::new(store);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Records { format }) => cmd_records(&store, format),
        Some(Command::Snapshot { select, source, format }) => cmd_snapshot(store, &config, &select, source, format),
        None => {
            debug!("main: no command specified, launching TUI");
            tui::run_with_engine(store, &config, cli.select).await
        }
    }
}

/// Print the loaded records
fn cmd_records(store: &RecordStore, format: OutputFormat) -> Result<()> {
    debug!(%format, "cmd_records: called");
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(store.records())?);
        }
        OutputFormat::Text => {
            if store.is_empty() {
                println!("{}", "No records".dimmed());
                return Ok(());
            }
            for record in store.iter() {
                println!(
                    "{} {} {}",
                    format!("[{}]", record.id).yellow(),
                    record.title.bold(),
                    record.coordinate.to_string().dimmed()
                );
                for field in &record.fields {
                    let value = match field.kind {
                        FieldKind::NumericEmphasis => field.value.bold().yellow(),
                        FieldKind::Link => field.value.blue().underline(),
                        FieldKind::Date => field.value.cyan(),
                        FieldKind::Text => field.value.normal(),
                    };
                    println!("    {}: {}", field.label.dimmed(), value);
                }
            }
            println!(
                "\n{} records, max capacity {}",
                store.len().to_string().green(),
                store.max_capacity()
            );
        }
    }
    Ok(())
}

/// Drive the engine headlessly and print what the host would show
fn cmd_snapshot(
    store: Arc<RecordStore>,
    config: &Config,
    select: &[i64],
    source: SourceArg,
    format: OutputFormat,
) -> Result<()> {
    debug!(?select, ?source, %format, "cmd_snapshot: called");
    let source = match source {
        SourceArg::List => Source::List,
        SourceArg::Map => Source::Map,
    };
    let snapshot = run_snapshot(store, config, select, source);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("{}", "Events:".bold());
    for event in &snapshot.events {
        let outcome = match event.outcome {
            SelectOutcome::Changed(_) => "changed".green(),
            SelectOutcome::NoOp { reason } => format!("no-op ({reason})").yellow(),
        };
        println!("  {} {} -> {}", event.source, event.identifier, outcome);
    }

    println!("{}", "Cards:".bold());
    for card in &snapshot.cards {
        let marker = if card.highlighted { "▶".red() } else { " ".normal() };
        println!("  {} [{}] {}", marker, card.id, card.title);
    }

    println!("{}", "Markers:".bold());
    for marker in &snapshot.markers {
        println!(
            "  [{}] {} r={:.2} {:?}",
            marker.id, marker.coordinate, marker.radius, marker.color
        );
    }

    println!("{}", "Viewport commands:".bold());
    let mut any = false;
    for call in &snapshot.calls {
        if let HostCall::SetMapViewport { lat, lon, zoom } = call {
            any = true;
            println!("  set_map_viewport({lat:.4}, {lon:.4}, {zoom})");
        }
    }
    if !any {
        println!("  {}", "none".dimmed());
    }

    match snapshot.selected {
        Some(id) => println!("\nSelected: {}", id.to_string().green()),
        None => println!("\nSelected: {}", "none".dimmed()),
    }
    Ok(())
}
