//! Dashboard Configuration
//! Built-in defaults, optionally overridden by a JSON file and a CSV path argument.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::metrics::DEFAULT_START_YEAR;

/// Population table read when nothing else is configured.
pub const DEFAULT_CSV_FILE: &str = "ca_population_by_race_annual_cdph.csv";

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "POPDASH_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub csv_path: PathBuf,
    /// Preferred start of the initial year range (clamped to the data).
    pub default_start_year: i32,
    pub window_width: f32,
    pub window_height: f32,
    /// Size of exported PNG charts in pixels.
    pub export_width: u32,
    pub export_height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_FILE),
            default_start_year: DEFAULT_START_YEAR,
            window_width: 1400.0,
            window_height: 800.0,
            export_width: 1000,
            export_height: 600,
        }
    }
}

impl DashboardConfig {
    /// Parse a JSON config file. Fields left out keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the effective configuration.
    ///
    /// An explicitly named config file must exist; the default `dashboard.json`
    /// is optional. A CSV path argument wins over both.
    pub fn resolve(
        explicit_config: Option<PathBuf>,
        csv_arg: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match explicit_config {
            Some(path) => Self::from_file(&path)?,
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };

        if let Some(csv) = csv_arg {
            config.csv_path = PathBuf::from(csv);
        }

        info!(csv = %config.csv_path.display(), "Configuration resolved");
        Ok(config)
    }
}
