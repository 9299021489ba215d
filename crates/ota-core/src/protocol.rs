//! Wire-level constants shared by the uploader and the device

/// Endpoint receiving firmware images
pub const FIRMWARE_ENDPOINT: &str = "/update/firmware";

/// Endpoint receiving data (filesystem) images
pub const DATA_ENDPOINT: &str = "/update/data";

/// Multipart field carrying the file
pub const UPLOAD_FIELD: &str = "update";

/// Plain-text firmware version
pub const VERSION_ENDPOINT: &str = "/api/version";

/// JSON view of the device-side update status
pub const OTA_STATUS_ENDPOINT: &str = "/api/ota";

/// Liveness probe
pub const HEALTH_ENDPOINT: &str = "/health";
