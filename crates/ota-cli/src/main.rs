//! ota-upload - Command-line tool for OTA updates
//!
//! Uploads a firmware or data image to a device and follows the transfer
//! with a progress bar.

mod commands;
mod config;
mod output;
mod view;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ota_client::OtaClient;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;
use crate::output::OutputContext;

#[derive(Parser)]
#[command(name = "ota-upload")]
#[command(author, version, about = "OTA firmware and data uploader")]
#[command(propagate_version = true)]
struct Cli {
    /// Device URL [default: http://192.168.4.1]
    #[arg(short, long, env = "OTA_SERVER")]
    server: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "OTA_CONFIG")]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image to the device
    Upload {
        /// Image file path
        file: Option<PathBuf>,

        /// Update type: "firmware", anything else is sent as data
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        update_type: Option<String>,
    },

    /// Show the firmware version reported by the device
    Version,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    let merged = config.merge_with_args(cli.server.as_deref(), cli.no_color);
    let ctx = OutputContext::new(merged.no_color, cli.quiet);
    let client = create_client(&merged.server)?;

    let outcome = match &cli.command {
        Commands::Upload { file, update_type } => {
            let update_type = update_type.as_deref().unwrap_or(&merged.update_type);
            commands::upload(client, file.as_deref(), update_type, &ctx).await
        }
        Commands::Version => commands::version(&client, &ctx).await.map(|()| true),
    };

    // Upload failures were already rendered by the terminal view
    match outcome {
        Ok(true) => Ok(ExitCode::SUCCESS),
        Ok(false) => Ok(ExitCode::FAILURE),
        Err(e) => {
            ctx.error(&format!("{:#}", e));
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Create an OTA client for the given device URL
fn create_client(server: &str) -> Result<OtaClient> {
    OtaClient::new(server).context("Failed to create OTA client")
}
