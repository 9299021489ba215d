//! Configuration file handling for ota-upload

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Device address of the stock access point
pub const DEFAULT_SERVER: &str = "http://192.168.4.1";

/// Update type used when neither the command line nor the file names one
pub const DEFAULT_UPDATE_TYPE: &str = "firmware";

/// Configuration for the CLI tool
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default device URL
    pub server: Option<String>,
    /// Disable colored output
    pub no_color: Option<bool>,
    /// Default update type
    pub update_type: Option<String>,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("ota-upload");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(&self, server: Option<&str>, no_color: bool) -> MergedConfig {
        MergedConfig {
            server: server
                .map(String::from)
                .or_else(|| self.server.clone())
                .unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            no_color: no_color || self.no_color.unwrap_or(false),
            update_type: self
                .update_type
                .clone()
                .unwrap_or_else(|| DEFAULT_UPDATE_TYPE.to_string()),
        }
    }
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub server: String,
    pub no_color: bool,
    pub update_type: String,
}
