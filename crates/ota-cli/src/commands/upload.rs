//! Upload command - send a firmware or data image

use std::path::Path;

use anyhow::{Context, Result};
use ota_client::{OtaClient, SelectedFile, UpdateType, UploadController, UploadForm};

use crate::output::OutputContext;
use crate::view::TerminalView;

/// Upload `file_path` to the device.
///
/// Returns `Ok(false)` when the upload failed; the failure has then already
/// been shown on the terminal.
pub async fn upload(
    client: OtaClient,
    file_path: Option<&Path>,
    update_type: &str,
    ctx: &OutputContext,
) -> Result<bool> {
    let file = file_path.map(read_image).transpose()?;

    if let Some(file) = &file {
        ctx.info(&format!(
            "Uploading {} ({} bytes) as {}",
            file.name,
            file.len(),
            UpdateType::from_selector(update_type)
        ));
    }

    let controller = UploadController::from_client(client, TerminalView::new(ctx.quiet));
    let result = controller.submit(UploadForm::new(file, update_type)).await;

    if let Err(e) = &result {
        tracing::debug!(error = %e, "Upload did not complete");
    }
    Ok(result.is_ok())
}

/// Read an image from disk, keeping its file name for the upload
fn read_image(path: &Path) -> Result<SelectedFile> {
    let content = std::fs::read(path)
        .with_context(|| format!("Failed to read image file: {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "update.bin".to_string());
    Ok(SelectedFile::new(name, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ota_client::testing::TestServer;
    use ota_device::{create_router, DeviceState, MemoryTarget};

    #[test]
    fn test_read_image_keeps_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app-1.4.0.bin");
        std::fs::write(&path, [0xE9, 0x03]).unwrap();

        let file = read_image(&path).unwrap();
        assert_eq!(file.name, "app-1.4.0.bin");
        assert_eq!(file.len(), 2);

        assert!(read_image(&dir.path().join("missing.bin")).is_err());
    }

    #[tokio::test]
    async fn test_upload_to_device() {
        let target = MemoryTarget::new();
        let server = TestServer::start(create_router(DeviceState::new(Arc::new(target.clone()))))
            .await
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("littlefs.bin");
        std::fs::write(&path, vec![0u8; 4096]).unwrap();

        let ctx = OutputContext::new(true, true);
        let ok = upload(server.client.clone(), Some(&path), "data", &ctx)
            .await
            .unwrap();

        assert!(ok);
        assert_eq!(
            target.image(UpdateType::Data).unwrap().file_name,
            "littlefs.bin"
        );
    }

    #[tokio::test]
    async fn test_failures_are_reported_as_false() {
        let server = TestServer::start(create_router(DeviceState::new(Arc::new(
            MemoryTarget::failing("disk full"),
        ))))
        .await
        .unwrap();
        let ctx = OutputContext::new(true, true);

        // Nothing selected
        let ok = upload(server.client.clone(), None, "firmware", &ctx)
            .await
            .unwrap();
        assert!(!ok);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fw.bin");
        std::fs::write(&path, b"fw").unwrap();
        let ok = upload(server.client.clone(), Some(&path), "firmware", &ctx)
            .await
            .unwrap();
        assert!(!ok);
    }
}
