//! Update type and endpoint mapping

use serde::{Deserialize, Serialize};

use crate::protocol::{DATA_ENDPOINT, FIRMWARE_ENDPOINT};

/// What kind of image is being uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    /// Application firmware image
    Firmware,
    /// Data (filesystem) image
    Data,
}

impl UpdateType {
    /// Map a selector value to an update type.
    ///
    /// Only `"firmware"` selects a firmware update; every other value,
    /// including unknown ones, selects a data update.
    pub fn from_selector(value: &str) -> Self {
        if value == "firmware" {
            Self::Firmware
        } else {
            Self::Data
        }
    }

    /// Default endpoint path for this update type
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Firmware => FIRMWARE_ENDPOINT,
            Self::Data => DATA_ENDPOINT,
        }
    }

    /// Selector value for this update type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Firmware => "firmware",
            Self::Data => "data",
        }
    }
}

impl std::fmt::Display for UpdateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_mapping() {
        assert_eq!(UpdateType::from_selector("firmware"), UpdateType::Firmware);
        assert_eq!(UpdateType::from_selector("data"), UpdateType::Data);
        // Anything that isn't exactly "firmware" is a data update
        assert_eq!(UpdateType::from_selector("Firmware"), UpdateType::Data);
        assert_eq!(UpdateType::from_selector(""), UpdateType::Data);
        assert_eq!(UpdateType::from_selector("spiffs"), UpdateType::Data);
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(UpdateType::Firmware.endpoint(), "/update/firmware");
        assert_eq!(UpdateType::Data.endpoint(), "/update/data");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&UpdateType::Firmware).unwrap();
        assert_eq!(json, "\"firmware\"");
        let parsed: UpdateType = serde_json::from_str("\"data\"").unwrap();
        assert_eq!(parsed, UpdateType::Data);
    }
}
