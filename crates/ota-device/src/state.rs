//! Application state for the device server

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::monitor::OtaMonitor;
use crate::target::UpdateTarget;

/// Default request body limit (16 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct DeviceState {
    pub target: Arc<dyn UpdateTarget>,
    pub monitor: Arc<OtaMonitor>,
    pub version: Arc<str>,
    pub max_upload_bytes: usize,
    pub restart_after_firmware: bool,
    restart: Arc<Notify>,
}

impl DeviceState {
    pub fn new(target: Arc<dyn UpdateTarget>) -> Self {
        Self {
            target,
            monitor: Arc::new(OtaMonitor::default()),
            version: Arc::from(env!("CARGO_PKG_VERSION")),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            restart_after_firmware: false,
            restart: Arc::new(Notify::new()),
        }
    }

    pub fn with_version(mut self, version: impl AsRef<str>) -> Self {
        self.version = Arc::from(version.as_ref());
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.monitor = Arc::new(OtaMonitor::new(interval));
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Request a restart after every successful firmware update
    pub fn with_restart_after_firmware(mut self, enabled: bool) -> Self {
        self.restart_after_firmware = enabled;
        self
    }

    /// Notified when a restart was requested
    pub fn restart_signal(&self) -> Arc<Notify> {
        Arc::clone(&self.restart)
    }

    pub(crate) fn request_restart(&self) {
        tracing::info!("Restart requested");
        self.restart.notify_one();
    }
}
