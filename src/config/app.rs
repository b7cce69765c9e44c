//! Application configuration loaded from `config.toml`.
//!
//! Every section is optional. A missing file yields the defaults; a file that
//! exists but cannot be read or parsed is a configuration error.

use crate::errors::{Error, Result};
use chrono::Weekday;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Calendar presentation settings
    pub calendar: CalendarConfig,
    /// Persistence settings
    pub storage: StorageConfig,
}

/// `[calendar]` section
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// First column of the month grid, any English weekday name ("monday", "sun")
    pub week_start: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            week_start: "monday".to_string(),
        }
    }
}

impl CalendarConfig {
    /// Parses `week_start` into a weekday.
    pub fn week_start(&self) -> Result<Weekday> {
        self.week_start.trim().parse().map_err(|_| Error::Config {
            message: format!("Unknown week_start '{}'", self.week_start),
        })
    }
}

/// `[storage]` section
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides `DATABASE_URL` when set
    pub database_url: Option<String>,
}

impl AppConfig {
    /// Database URL from `[storage]`, falling back to the environment/default.
    #[must_use]
    pub fn database_url(&self) -> String {
        self.storage
            .database_url
            .clone()
            .unwrap_or_else(super::database::get_database_url)
    }
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads `./config.toml` if present, otherwise returns the defaults.
pub fn load_default_config() -> Result<AppConfig> {
    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        load_config(DEFAULT_CONFIG_PATH)
    } else {
        info!("No {} found, using default configuration", DEFAULT_CONFIG_PATH);
        Ok(AppConfig::default())
    }
}
