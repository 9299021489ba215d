//! ota-device - OTA receiver
//!
//! HTTP endpoints accepting firmware and data images as multipart uploads,
//! as served by a device's web interface. Images are streamed into an
//! [`UpdateTarget`]; the update lifecycle is tracked by an [`OtaMonitor`].
//!
//! # Usage
//!
//! ```ignore
//! use ota_device::{create_router, DeviceState, DirectoryTarget};
//!
//! let state = DeviceState::new(Arc::new(DirectoryTarget::new("/var/lib/ota")));
//! let router = create_router(state);
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod monitor;
pub mod state;
pub mod target;

pub use config::DeviceConfig;
pub use error::DeviceError;
pub use monitor::OtaMonitor;
pub use state::DeviceState;
pub use target::{
    DirectoryTarget, MemoryTarget, StoredImage, TargetError, UpdateSession, UpdateTarget,
};

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use ota_core::protocol::{HEALTH_ENDPOINT, OTA_STATUS_ENDPOINT, VERSION_ENDPOINT};
use ota_core::{DATA_ENDPOINT, FIRMWARE_ENDPOINT};

/// Create the device router with the given state
pub fn create_router(state: DeviceState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(HEALTH_ENDPOINT, get(|| async { "OK" }))
        .route(VERSION_ENDPOINT, get(handlers::version))
        .route(OTA_STATUS_ENDPOINT, get(handlers::ota_status))
        .route(FIRMWARE_ENDPOINT, post(handlers::upload_firmware))
        .route(DATA_ENDPOINT, post(handlers::upload_data))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
