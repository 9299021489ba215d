//! Shared data models for OTA uploads

mod file;
mod panel;
mod status;
mod update;

pub use file::*;
pub use panel::*;
pub use status::*;
pub use update::*;
