//! IncidentMap configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::camera::{DEFAULT_FOCUS_ZOOM, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_INTERVAL};
use crate::render::RadiusScale;
use crate::selection::DEFAULT_DEBOUNCE;

/// Main IncidentMap configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Dataset location
    pub data: DataConfig,

    /// Selection controller settings
    pub selection: SelectionConfig,

    /// Marker sizing
    pub markers: MarkerConfig,

    /// Camera controller settings
    pub camera: CameraConfig,

    /// Terminal UI settings
    pub tui: TuiConfig,
}

impl Config {
    /// Reject settings that would break the engine's invariants
    pub fn validate(&self) -> Result<()> {
        if self.markers.min_radius < 0.0 || self.markers.min_radius > self.markers.max_radius {
            return Err(eyre::eyre!(
                "markers.min-radius ({}) must be non-negative and not exceed markers.max-radius ({})",
                self.markers.min_radius,
                self.markers.max_radius
            ));
        }
        if self.markers.emphasis_factor <= 0.0 {
            return Err(eyre::eyre!(
                "markers.emphasis-factor must be positive, got {}",
                self.markers.emphasis_factor
            ));
        }
        if self.camera.retry_interval_ms == 0 {
            return Err(eyre::eyre!("camera.retry-interval-ms must be greater than zero"));
        }
        if self.tui.tick_rate_ms == 0 {
            return Err(eyre::eyre!("tui.tick-rate-ms must be greater than zero"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .incidentmap.yml
        let local_config = PathBuf::from(".incidentmap.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/incidentmap/incidentmap.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("incidentmap").join("incidentmap.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Errors are swallowed here; `load` reports them once logging is up.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates: Vec<PathBuf> = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(".incidentmap.yml")];
                if let Some(config_dir) = dirs::config_dir() {
                    paths.push(config_dir.join("incidentmap").join("incidentmap.yml"));
                }
                paths
            }
        };

        candidates
            .iter()
            .find(|p| p.exists())
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Self>(&content).ok())
            .and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Dataset location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// JSON or YAML dataset; when unset the loader searches the working directory
    pub path: Option<PathBuf>,
}

/// Selection controller settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Minimum time between accepted selections in milliseconds
    #[serde(rename = "debounce-ms")]
    pub debounce_ms: u64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl SelectionConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Marker sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Radius for records with no or zero capacity
    #[serde(rename = "min-radius")]
    pub min_radius: f64,

    /// Radius for the record with the largest capacity
    #[serde(rename = "max-radius")]
    pub max_radius: f64,

    /// Multiplier applied to the selected marker
    #[serde(rename = "emphasis-factor")]
    pub emphasis_factor: f64,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        let scale = RadiusScale::default();
        Self {
            min_radius: scale.min_radius,
            max_radius: scale.max_radius,
            emphasis_factor: scale.emphasis,
        }
    }
}

impl MarkerConfig {
    pub fn scale(&self) -> RadiusScale {
        RadiusScale::new(self.min_radius, self.max_radius, self.emphasis_factor)
    }
}

/// Camera controller settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Zoom level used when focusing a selected record
    #[serde(rename = "focus-zoom")]
    pub focus_zoom: u8,

    /// Delay between viewport readiness checks in milliseconds
    #[serde(rename = "retry-interval-ms")]
    pub retry_interval_ms: u64,

    /// Readiness checks before a camera move is dropped
    #[serde(rename = "max-retries")]
    pub max_retries: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            focus_zoom: DEFAULT_FOCUS_ZOOM,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL.as_millis() as u64,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl CameraConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

/// Terminal UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Event poll / redraw interval in milliseconds
    #[serde(rename = "tick-rate-ms")]
    pub tick_rate_ms: u64,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 33 }
    }
}

impl TuiConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.selection.debounce_ms, 300);
        assert_eq!(config.markers.min_radius, 5.0);
        assert_eq!(config.markers.max_radius, 20.0);
        assert_eq!(config.markers.emphasis_factor, 1.5);
        assert_eq!(config.camera.focus_zoom, 8);
        assert_eq!(config.camera.retry_interval_ms, 100);
        assert_eq!(config.camera.max_retries, 50);
        assert!(config.data.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug

data:
  path: incidents.yaml

selection:
  debounce-ms: 150

markers:
  min-radius: 3
  max-radius: 12
  emphasis-factor: 2.0

camera:
  focus-zoom: 6
  retry-interval-ms: 50
  max-retries: 10
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.data.path, Some(PathBuf::from("incidents.yaml")));
        assert_eq!(config.selection.debounce(), Duration::from_millis(150));
        assert_eq!(config.markers.scale(), RadiusScale::new(3.0, 12.0, 2.0));
        assert_eq!(config.camera.focus_zoom, 6);
        assert_eq!(config.camera.retry_interval(), Duration::from_millis(50));
        assert_eq!(config.camera.max_retries, 10);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
camera:
  focus-zoom: 10
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.camera.focus_zoom, 10);
        assert_eq!(config.camera.max_retries, 50);
        assert_eq!(config.selection.debounce_ms, 300);
        assert_eq!(config.tui.tick_rate_ms, 33);
    }

    #[test]
    fn test_validate_rejects_inverted_radii() {
        let mut config = Config::default();
        config.markers.min_radius = 30.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_retry_interval() {
        let mut config = Config::default();
        config.camera.retry_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "selection:\n  debounce-ms: 500\nlog-level: warn").unwrap();
        let path = file.path().to_path_buf();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.selection.debounce_ms, 500);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let path = PathBuf::from("/nonexistent/incidentmap.yml");
        assert!(Config::load(Some(&path)).is_err());
    }
}
