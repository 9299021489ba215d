//! Update lifecycle monitor
//!
//! Tracks the device-side [`OtaStatus`] and logs start, progress and end of
//! each received image. Progress is reported at most once per interval.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{error, info};

use ota_core::{OtaStatus, UpdateType};

/// Default minimum time between two progress reports
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct MonitorState {
    status: OtaStatus,
    last_report: Option<Instant>,
}

/// Shared update monitor
#[derive(Debug)]
pub struct OtaMonitor {
    interval: Duration,
    state: Mutex<MonitorState>,
}

impl Default for OtaMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL)
    }
}

impl OtaMonitor {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: Mutex::new(MonitorState {
                status: OtaStatus::Idle,
                last_report: None,
            }),
        }
    }

    /// Current status
    pub fn status(&self) -> OtaStatus {
        self.state.lock().status.clone()
    }

    pub fn on_start(&self, update_type: UpdateType, file_name: &str) {
        info!(update_type = %update_type, file_name, "OTA: update started");
        let mut state = self.state.lock();
        state.status = OtaStatus::InProgress {
            update_type,
            percent: 0,
        };
        state.last_report = None;
    }

    /// Record `current` of `total` bytes received. Returns the reported
    /// percentage, or `None` when throttled or the total is unknown.
    pub fn on_progress(&self, update_type: UpdateType, current: u64, total: Option<u64>) -> Option<u8> {
        let total = total.filter(|t| *t > 0)?;
        let mut state = self.state.lock();

        let now = Instant::now();
        if let Some(last) = state.last_report {
            if now.duration_since(last) < self.interval {
                return None;
            }
        }
        state.last_report = Some(now);

        let percent = ((current as f64 / total as f64) * 100.0).min(100.0) as u8;
        info!("OTA progress {}%: {}/{} bytes", percent, current, total);
        state.status = OtaStatus::InProgress {
            update_type,
            percent,
        };
        Some(percent)
    }

    pub fn on_end(&self, update_type: UpdateType, result: Result<u64, &str>) {
        let mut state = self.state.lock();
        match result {
            Ok(bytes) => {
                info!(update_type = %update_type, bytes, "OTA update finished successfully");
                state.status = OtaStatus::Complete { update_type };
            }
            Err(message) => {
                error!(update_type = %update_type, %message, "OTA update failed");
                state.status = OtaStatus::Failed {
                    update_type,
                    message: message.to_string(),
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let monitor = OtaMonitor::new(Duration::ZERO);
        assert_eq!(monitor.status(), OtaStatus::Idle);

        monitor.on_start(UpdateType::Firmware, "fw.bin");
        assert_eq!(
            monitor.status(),
            OtaStatus::InProgress {
                update_type: UpdateType::Firmware,
                percent: 0
            }
        );

        assert_eq!(monitor.on_progress(UpdateType::Firmware, 50, Some(200)), Some(25));
        monitor.on_end(UpdateType::Firmware, Ok(200));
        assert_eq!(
            monitor.status(),
            OtaStatus::Complete {
                update_type: UpdateType::Firmware
            }
        );
    }

    #[test]
    fn test_progress_is_throttled() {
        let monitor = OtaMonitor::new(Duration::from_secs(3600));
        monitor.on_start(UpdateType::Data, "fs.bin");

        // First report goes through, the next ones are within the interval
        assert_eq!(monitor.on_progress(UpdateType::Data, 10, Some(100)), Some(10));
        assert_eq!(monitor.on_progress(UpdateType::Data, 90, Some(100)), None);
        assert_eq!(
            monitor.status(),
            OtaStatus::InProgress {
                update_type: UpdateType::Data,
                percent: 10
            }
        );

        // A new update resets the throttle
        monitor.on_start(UpdateType::Data, "fs.bin");
        assert_eq!(monitor.on_progress(UpdateType::Data, 20, Some(100)), Some(20));
    }

    #[test]
    fn test_unknown_total() {
        let monitor = OtaMonitor::new(Duration::ZERO);
        monitor.on_start(UpdateType::Data, "fs.bin");
        assert_eq!(monitor.on_progress(UpdateType::Data, 10, None), None);
        assert_eq!(monitor.on_progress(UpdateType::Data, 10, Some(0)), None);
    }

    #[test]
    fn test_failure() {
        let monitor = OtaMonitor::default();
        monitor.on_start(UpdateType::Firmware, "fw.bin");
        monitor.on_end(UpdateType::Firmware, Err("Write failed: disk full"));
        assert_eq!(
            monitor.status(),
            OtaStatus::Failed {
                update_type: UpdateType::Firmware,
                message: "Write failed: disk full".into()
            }
        );
    }
}
