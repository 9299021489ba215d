//! Uploader configuration with YAML support

use serde::{Deserialize, Serialize};
use std::path::Path;

use ota_core::{UpdateType, DATA_ENDPOINT, FIRMWARE_ENDPOINT, UPLOAD_FIELD};

/// Uploader configuration
///
/// Can be loaded from YAML or JSON, or constructed programmatically.
///
/// ```yaml
/// connection:
///   base_url: "http://192.168.4.1"
///
/// endpoints:
///   firmware: "/update/firmware"
///   data: "/update/data"
///
/// upload:
///   field_name: "update"
///   chunk_size: 16384
///
/// timeouts:
///   connect_ms: 10000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploaderConfig {
    /// Connection settings
    pub connection: ConnectionConfig,

    /// Endpoint paths
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Multipart body settings
    #[serde(default)]
    pub upload: UploadConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

/// Connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Base URL of the device
    pub base_url: String,
}

/// Endpoint paths for the two update types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Firmware image endpoint
    #[serde(default = "default_firmware_path")]
    pub firmware: String,

    /// Data image endpoint
    #[serde(default = "default_data_path")]
    pub data: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            firmware: default_firmware_path(),
            data: default_data_path(),
        }
    }
}

impl EndpointsConfig {
    /// Path receiving the given update type
    pub fn path_for(&self, update_type: UpdateType) -> &str {
        match update_type {
            UpdateType::Firmware => &self.firmware,
            UpdateType::Data => &self.data,
        }
    }
}

fn default_firmware_path() -> String {
    FIRMWARE_ENDPOINT.to_string()
}

fn default_data_path() -> String {
    DATA_ENDPOINT.to_string()
}

/// Multipart body settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Form field carrying the file (default: update)
    #[serde(default = "default_field_name")]
    pub field_name: String,

    /// Body chunk size in bytes; one progress event per chunk (default: 16 KiB)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            field_name: default_field_name(),
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_field_name() -> String {
    UPLOAD_FIELD.to_string()
}

fn default_chunk_size() -> usize {
    16 * 1024
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    /// Connect timeout in milliseconds (default: 10s)
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,

    /// Whole-request timeout in milliseconds. Uploads are unbounded when unset.
    #[serde(default)]
    pub request_ms: Option<u64>,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_timeout(),
            request_ms: None,
        }
    }
}

fn default_connect_timeout() -> u64 {
    10_000 // 10 seconds
}

impl UploaderConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Serialize configuration to YAML
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Create a builder for programmatic configuration
    pub fn builder(base_url: impl Into<String>) -> UploaderConfigBuilder {
        UploaderConfigBuilder::new(base_url)
    }
}

/// Builder for UploaderConfig
pub struct UploaderConfigBuilder {
    config: UploaderConfig,
}

impl UploaderConfigBuilder {
    /// Create a new builder with the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            config: UploaderConfig {
                connection: ConnectionConfig {
                    base_url: base_url.into(),
                },
                endpoints: EndpointsConfig::default(),
                upload: UploadConfig::default(),
                timeouts: TimeoutsConfig::default(),
            },
        }
    }

    /// Set the firmware endpoint path
    pub fn firmware_path(mut self, path: impl Into<String>) -> Self {
        self.config.endpoints.firmware = path.into();
        self
    }

    /// Set the data endpoint path
    pub fn data_path(mut self, path: impl Into<String>) -> Self {
        self.config.endpoints.data = path.into();
        self
    }

    /// Set the multipart field name
    pub fn field_name(mut self, name: impl Into<String>) -> Self {
        self.config.upload.field_name = name.into();
        self
    }

    /// Set the body chunk size in bytes
    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.config.upload.chunk_size = bytes;
        self
    }

    /// Set connect timeout in milliseconds
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.connect_ms = ms;
        self
    }

    /// Set whole-request timeout in milliseconds
    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.request_ms = Some(ms);
        self
    }

    /// Build the configuration
    pub fn build(self) -> UploaderConfig {
        self.config
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
