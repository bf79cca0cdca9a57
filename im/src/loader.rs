//! Dataset loading
//!
//! Turns a JSON or YAML incident dataset into a `RecordStore`. Rows whose
//! `coordinates` column does not parse to an in-range `(lat, lon)` pair are
//! dropped with a warning. Surviving rows get ids `0..N-1` in file order.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{Coordinate, DisplayField, Record, RecordId, RecordStore, StoreError};

/// File names searched in the working directory when no path is configured
pub const DEFAULT_DATASET_FILES: &[&str] = &["incidents.json", "incidents.yaml", "incidents.yml"];

static LAT_LON: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*\(\s*([-+]?[\d.]+)\s*,\s*([-+]?[\d.]+)\s*\)").ok());

/// Errors raised while loading a dataset
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported dataset format: {0} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(PathBuf),

    #[error("Invalid JSON dataset: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML dataset: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Dataset violates store invariants: {0}")]
    Store(#[from] StoreError),
}

/// Dataset file encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Json,
    Yaml,
}

impl DatasetFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("json") => Some(Self::Json),
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// One row of the incident dataset, as written on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DatasetRow {
    pub location: String,
    /// `"(lat, lon)"`
    pub coordinates: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub application: Option<String>,
    #[serde(default)]
    pub cause: Option<String>,
    #[serde(default)]
    pub capacity_mwh: Option<f64>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Parse `"(36.5786, -121.6954)"` into a coordinate
///
/// Returns `None` for anything that does not match or is out of range.
pub fn parse_lat_lon(raw: &str) -> Option<Coordinate> {
    let caps = LAT_LON.as_ref()?.captures(raw)?;
    let lat = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let lon = caps.get(2)?.as_str().parse::<f64>().ok()?;
    Some(Coordinate::new(lat, lon)).filter(Coordinate::is_valid)
}

/// Normalize a date cell to `YYYY-MM-DD` when it parses as a date
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    // Spreadsheet exports often carry a midnight timestamp
    let date_part = raw.split_whitespace().next().unwrap_or(raw);
    ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
}

fn format_capacity(capacity: f64) -> String {
    if capacity.fract() == 0.0 {
        format!("{capacity:.0} MWh")
    } else {
        format!("{capacity:.1} MWh")
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Classify a row's columns into display fields
pub fn display_fields(row: &DatasetRow) -> Vec<DisplayField> {
    let mut fields = Vec::new();

    if let Some(date) = non_empty(&row.event_date) {
        fields.push(match normalize_date(date) {
            Some(normalized) => DisplayField::date("Date", normalized),
            None => DisplayField::text("Date", date),
        });
    }
    if let Some(application) = non_empty(&row.application) {
        fields.push(DisplayField::text("Application", application));
    }
    if let Some(cause) = non_empty(&row.cause) {
        fields.push(DisplayField::text("Cause", cause));
    }
    if let Some(country) = non_empty(&row.country) {
        fields.push(DisplayField::text("Country", country));
    }
    if let Some(capacity) = row.capacity_mwh.filter(|c| c.is_finite() && *c >= 0.0) {
        fields.push(DisplayField::numeric("Capacity", format_capacity(capacity)));
    }
    for source in row.sources.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        fields.push(DisplayField::link("Source", source));
    }
    for image in row.images.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        fields.push(DisplayField::link("Image", image));
    }

    fields
}

/// Build a store from dataset rows, dropping rows with unusable coordinates
pub fn build_store(rows: Vec<DatasetRow>) -> Result<RecordStore, LoadError> {
    debug!(rows = rows.len(), "build_store: called");
    let total = rows.len();
    let mut records = Vec::with_capacity(total);

    for (row_number, row) in rows.into_iter().enumerate() {
        let Some(coordinate) = parse_lat_lon(&row.coordinates) else {
            warn!(
                row = row_number,
                location = %row.location,
                coordinates = %row.coordinates,
                "Dropping row with invalid or missing coordinates"
            );
            continue;
        };

        let id = RecordId::new(records.len());
        let mut record = Record::new(id, row.location.trim(), coordinate).with_fields(display_fields(&row));
        if let Some(capacity) = row.capacity_mwh.filter(|c| c.is_finite() && *c >= 0.0) {
            record = record.with_capacity(capacity);
        }
        records.push(record);
    }

    if records.len() < total {
        warn!(dropped = total - records.len(), total, "Some dataset rows were dropped");
    }
    info!(records = records.len(), "Final dataset");
    Ok(RecordStore::new(records)?)
}

/// Parse dataset content in the given format
pub fn parse_rows(content: &str, format: DatasetFormat) -> Result<Vec<DatasetRow>, LoadError> {
    debug!(?format, bytes = content.len(), "parse_rows: called");
    let rows = match format {
        DatasetFormat::Json => serde_json::from_str(content)?,
        DatasetFormat::Yaml => serde_yaml::from_str(content)?,
    };
    Ok(rows)
}

/// Load a dataset file into a store
pub fn load_dataset(path: &Path) -> Result<RecordStore, LoadError> {
    debug!(?path, "load_dataset: called");
    let format = DatasetFormat::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = parse_rows(&content, format)?;
    info!("Loaded {} rows from {}", rows.len(), path.display());
    build_store(rows)
}

/// Load the configured dataset, or search the working directory, or fall back
///
/// An explicitly configured path must load; only the search falls back.
pub fn load_or_fallback(path: Option<&Path>) -> Result<RecordStore, LoadError> {
    if let Some(path) = path {
        return load_dataset(path);
    }

    if let Some(found) = DEFAULT_DATASET_FILES.iter().map(PathBuf::from).find(|p| p.exists()) {
        return load_dataset(&found);
    }

    warn!("No dataset file found, using built-in sample dataset");
    build_store(fallback_rows())
}

/// Built-in sample used when no dataset file is available
pub fn fallback_rows() -> Vec<DatasetRow> {
    let row = |location: &str, coordinates: &str, country: &str, date: &str, application: &str, cause: &str| {
        DatasetRow {
            location: location.to_string(),
            coordinates: coordinates.to_string(),
            country: Some(country.to_string()),
            event_date: Some(date.to_string()),
            application: Some(application.to_string()),
            cause: Some(cause.to_string()),
            ..Default::default()
        }
    };

    vec![
        row(
            "Moss Landing, CA",
            "(36.5786, -121.6954)",
            "USA",
            "2022-09-04",
            "Energy Storage",
            "Thermal Runaway",
        ),
        row(
            "Surprise, AZ",
            "(33.6391, -112.4128)",
            "USA",
            "2019-04-19",
            "Grid Support",
            "Overheating",
        ),
        row(
            "Escondido, CA",
            "(33.1192, -117.0864)",
            "USA",
            "2020-12-05",
            "Renewable Integration",
            "Battery Failure",
        ),
        row(
            "Liverpool, UK",
            "(53.4084, -2.9916)",
            "United Kingdom",
            "2021-02-15",
            "Energy Storage",
            "Electrical Fault",
        ),
        row(
            "Tokyo, Japan",
            "(35.6762, 139.6503)",
            "Japan",
            "2023-03-10",
            "Backup Power",
            "Unknown",
        ),
    ]
}
