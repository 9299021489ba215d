//! Device server configuration (TOML)

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::state::{DeviceState, DEFAULT_MAX_UPLOAD_BYTES};
use crate::target::{DirectoryTarget, MemoryTarget, UpdateTarget};

/// Device server configuration
///
/// ```toml
/// version = "1.4.2"
///
/// [server]
/// host = "0.0.0.0"
/// port = 8080
///
/// [storage]
/// dir = "/var/lib/ota"
///
/// [limits]
/// max_upload_bytes = 16777216
///
/// [ota]
/// progress_interval_ms = 1000
/// restart_after_firmware = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Version reported on /api/version (default: crate version)
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub ota: OtaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Where images are written. Without a directory images are kept in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtaConfig {
    /// Minimum time between progress log lines
    #[serde(default = "default_progress_interval")]
    pub progress_interval_ms: u64,

    /// Shut the server down after a successful firmware update so that a
    /// supervisor restarts it on the new image
    #[serde(default)]
    pub restart_after_firmware: bool,
}

impl Default for OtaConfig {
    fn default() -> Self {
        Self {
            progress_interval_ms: default_progress_interval(),
            restart_after_firmware: false,
        }
    }
}

fn default_progress_interval() -> u64 {
    1_000
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),
}

impl DeviceConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Address to listen on
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(format!("{}:{}", self.server.host, self.server.port).parse()?)
    }

    /// Build the update target described by the storage section
    pub fn target(&self) -> Arc<dyn UpdateTarget> {
        match &self.storage.dir {
            Some(dir) => Arc::new(DirectoryTarget::new(dir)),
            None => Arc::new(MemoryTarget::new()),
        }
    }

    /// Build the handler state
    pub fn build_state(&self) -> DeviceState {
        let mut state = DeviceState::new(self.target())
            .with_progress_interval(Duration::from_millis(self.ota.progress_interval_ms))
            .with_max_upload_bytes(self.limits.max_upload_bytes)
            .with_restart_after_firmware(self.ota.restart_after_firmware);
        if let Some(version) = &self.version {
            state = state.with_version(version);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DeviceConfig::from_toml("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.limits.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(config.ota.progress_interval_ms, 1000);
        assert!(!config.ota.restart_after_firmware);
        assert!(config.storage.dir.is_none());
        assert_eq!(config.listen_addr().unwrap().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
version = "2.0.1"

[server]
host = "127.0.0.1"
port = 9000

[storage]
dir = "/tmp/ota"

[limits]
max_upload_bytes = 1024

[ota]
progress_interval_ms = 250
restart_after_firmware = true
"#;
        let config = DeviceConfig::from_toml(toml).unwrap();
        assert_eq!(config.listen_addr().unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(config.storage.dir, Some(PathBuf::from("/tmp/ota")));

        let state = config.build_state();
        assert_eq!(&*state.version, "2.0.1");
        assert_eq!(state.max_upload_bytes, 1024);
        assert!(state.restart_after_firmware);
    }

    #[test]
    fn test_invalid_host() {
        let config = DeviceConfig::from_toml("[server]\nhost = \"not an ip\"\n").unwrap();
        assert!(matches!(config.listen_addr(), Err(ConfigError::Address(_))));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            DeviceConfig::from_toml("[server]\nport = \"eighty\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}
