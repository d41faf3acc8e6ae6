//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from a TOML file and environment variables.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::utils::errors::{Result, TrekError};

/// Main application configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    pub storage: StorageConfig,
    pub booking: BookingConfig,
    pub logging: LoggingConfig,
    pub features: FeaturesConfig,
}

/// Flat-file storage configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding the four data files
    pub data_dir: PathBuf,
    /// Write the default attractions and guides when their files are missing
    pub seed_defaults: bool,
}

/// Booking defaults
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BookingConfig {
    /// Capacity given to attractions whose record does not carry one
    pub default_capacity: u32,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for the daily rolling log file; stdout only when unset
    pub file_path: Option<PathBuf>,
    pub json: bool,
}

/// Feature flags configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FeaturesConfig {
    /// Persist affected collections after every successful mutation
    pub auto_persist: bool,
}

impl Settings {
    /// Load settings from defaults, `trekdesk.toml` and `TREKDESK__*` variables
    pub fn new() -> Result<Self> {
        Self::from_file("trekdesk")
    }

    /// Load settings with an explicit config file base name
    pub fn from_file(name: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name(name).required(false))
            .add_source(
                config::Environment::with_prefix("TREKDESK")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        super::validation::validate_settings(self)
    }

    /// Render the effective settings as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| TrekError::Config(e.to_string()))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_dir: PathBuf::from("data"),
                seed_defaults: true,
            },
            booking: BookingConfig {
                default_capacity: crate::models::attraction::DEFAULT_CAPACITY,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                json: false,
            },
            features: FeaturesConfig {
                auto_persist: true,
            },
        }
    }
}
