//! OTA Client Library
//!
//! Uploads firmware or data images to a device as multipart form data and
//! reports progress and outcome through a pluggable view.
//!
//! # Example
//!
//! ```rust,no_run
//! use ota_client::{NullView, OtaClient, SelectedFile, UploadController, UploadForm};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = OtaClient::new("http://192.168.4.1")?;
//!     let controller = UploadController::from_client(client, NullView);
//!
//!     let image = std::fs::read("firmware.bin")?;
//!     let file = SelectedFile::new("firmware.bin", image);
//!
//!     // "firmware" posts to /update/firmware, anything else to /update/data
//!     controller.submit(UploadForm::new(Some(file), "firmware")).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! The `testing` module provides a recording view and a server harness:
//!
//! ```rust,ignore
//! use ota_client::testing::{RecordingView, TestServer};
//!
//! let server = TestServer::start(router).await?;
//! let controller = UploadController::new(server.client.clone(), RecordingView::new());
//! ```

mod client;
pub mod config;
mod controller;
mod error;
pub mod testing;
pub mod transport;
mod view;

pub use client::OtaClient;
pub use config::{ConfigError, EndpointsConfig, UploaderConfig};
pub use controller::{UploadController, UploadForm};
pub use error::{Result, UploadError};
pub use transport::{TransferEvent, Transport, TransportError, TransportResponse, UploadRequest};
pub use view::{NullView, UploadView};

// Re-export core types for convenience
pub use ota_core::{
    OtaStatus, ProgressState, SelectedFile, StatusKind, StatusMessage, UiPhase, UpdateType,
    UploadPanel,
};
