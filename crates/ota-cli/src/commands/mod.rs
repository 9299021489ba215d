//! Command implementations for ota-upload

pub mod upload;
pub mod version;

pub use upload::upload;
pub use version::version;
