//! ota-core - Shared types for OTA uploads
//!
//! Types used by both sides of an over-the-air update: the update type and
//! its endpoint mapping, the uploaded file, and the upload panel state that
//! a client renders while a transfer is running.

pub mod models;
pub mod protocol;

pub use models::*;
pub use protocol::{DATA_ENDPOINT, FIRMWARE_ENDPOINT, UPLOAD_FIELD};
