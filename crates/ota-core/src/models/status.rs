//! Device-side update status

use serde::{Deserialize, Serialize};

use super::UpdateType;

/// Update status as reported by the device on `GET /api/ota`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OtaStatus {
    /// No update received since start
    #[default]
    Idle,
    /// Image is being received
    InProgress {
        update_type: UpdateType,
        /// 0-100, based on the request's content length
        percent: u8,
    },
    /// Last image was written completely
    Complete { update_type: UpdateType },
    /// Last image could not be written
    Failed {
        update_type: UpdateType,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_json() {
        let status = OtaStatus::InProgress {
            update_type: UpdateType::Firmware,
            percent: 42,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "in_progress");
        assert_eq!(json["update_type"], "firmware");
        assert_eq!(json["percent"], 42);

        let idle: OtaStatus = serde_json::from_str(r#"{"state":"idle"}"#).unwrap();
        assert_eq!(idle, OtaStatus::Idle);
    }
}
