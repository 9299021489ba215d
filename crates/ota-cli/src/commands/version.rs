//! Version command - show the device firmware version

use anyhow::{Context, Result};
use ota_client::OtaClient;

use crate::output::OutputContext;

pub async fn version(client: &OtaClient, ctx: &OutputContext) -> Result<()> {
    let version = client
        .version()
        .await
        .context("Failed to query device version")?;
    ctx.print_kv("Version", &version);
    Ok(())
}
