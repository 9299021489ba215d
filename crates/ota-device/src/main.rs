//! ota-device - OTA receiver daemon
//!
//! Serves `/update/firmware` and `/update/data` for multipart image uploads.
//!
//! If no storage directory is configured, images are kept in memory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ota_device::{create_router, DeviceConfig};

#[derive(Parser)]
#[command(name = "ota-device")]
#[command(author, version, about = "OTA update receiver")]
struct Args {
    /// Configuration file (TOML)
    #[arg(env = "OTA_DEVICE_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory receiving firmware.bin / data.bin (overrides the config file)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Exit after a successful firmware update
    #[arg(long)]
    restart_after_firmware: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ota_device=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ota-device");

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("Loading config from: {}", path.display());
            DeviceConfig::from_toml_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?
        }
        None => {
            tracing::info!("No config file provided, using defaults");
            DeviceConfig::default()
        }
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = args.dir {
        config.storage.dir = Some(dir);
    }
    if args.restart_after_firmware {
        config.ota.restart_after_firmware = true;
    }

    match &config.storage.dir {
        Some(dir) => tracing::info!("Storing images in {}", dir.display()),
        None => tracing::info!("No storage directory configured, keeping images in memory"),
    }

    let state = config.build_state();
    let restart = state.restart_signal();
    let app = create_router(state);

    let addr = config.listen_addr()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = restart.notified() => {
                    tracing::info!("Firmware updated, shutting down for restart");
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted, shutting down");
                }
            }
        })
        .await?;

    Ok(())
}
