//! Configuration file loading and parsing
//!
//! Settings may come from a TOML file instead of (or in addition to)
//! command-line flags; explicit flags win over file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Application configuration (loaded from config.toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub device: DeviceConfig,
}

/// The `[device]` table
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// I2C address as a base-2 literal, e.g. "0b1001000"
    pub address: String,
    /// ADC resolution bits (AD7991 = 12, AD7995 = 10, AD7999 = 8)
    pub bits: u32,
    /// Reference voltage; omit to disable voltage display
    #[serde(default)]
    pub reference_voltage: Option<f64>,
}

/// Load and parse a configuration file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}
