//! Integration tests for ota-client
//!
//! These tests spin up a real device router and upload through the client,
//! keeping both sides of the multipart contract in sync.

use std::sync::Arc;

use ota_client::testing::{unused_local_addr, RecordingView, TestServer};
use ota_client::{
    OtaClient, OtaStatus, SelectedFile, StatusKind, UpdateType, UploadController, UploadError,
    UploadForm, UploaderConfig,
};
use ota_device::{create_router, DeviceState, DirectoryTarget, MemoryTarget};

async fn device(target: MemoryTarget) -> TestServer {
    let state = DeviceState::new(Arc::new(target)).with_version("9.9.9");
    TestServer::start(create_router(state)).await.unwrap()
}

fn image(name: &str, len: usize) -> SelectedFile {
    let content: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    SelectedFile::new(name, content)
}

// =============================================================================
// Uploads
// =============================================================================

#[tokio::test]
async fn test_firmware_upload_succeeds() {
    let target = MemoryTarget::new();
    let server = device(target.clone()).await;
    let controller = UploadController::from_client(server.client.clone(), RecordingView::new());

    let file = image("esp32-app.bin", 40_000);
    controller
        .submit(UploadForm::new(Some(file.clone()), "firmware"))
        .await
        .unwrap();

    let stored = target.image(UpdateType::Firmware).unwrap();
    assert_eq!(stored.file_name, "esp32-app.bin");
    assert_eq!(stored.content, file.content.to_vec());

    let panel = controller.panel();
    assert_eq!(panel.status.text, "Upload complete! Rebooting...");
    assert_eq!(panel.status.kind, StatusKind::Success);
    assert!(panel.progress_visible());
}

#[tokio::test]
async fn test_other_selector_goes_to_data_endpoint() {
    let target = MemoryTarget::new();
    let server = device(target.clone()).await;
    let controller = UploadController::from_client(server.client.clone(), RecordingView::new());

    controller
        .submit(UploadForm::new(Some(image("littlefs.bin", 512)), "filesystem"))
        .await
        .unwrap();

    assert!(target.image(UpdateType::Firmware).is_none());
    assert_eq!(
        target.image(UpdateType::Data).unwrap().file_name,
        "littlefs.bin"
    );
}

#[tokio::test]
async fn test_progress_reaches_full_bar() {
    let server = TestServer::start_with(
        create_router(DeviceState::new(Arc::new(MemoryTarget::new()))),
        |mut config| {
            config.upload.chunk_size = 1024;
            config
        },
    )
    .await
    .unwrap();
    let controller = UploadController::from_client(server.client.clone(), RecordingView::new());

    controller
        .submit(UploadForm::new(Some(image("fw.bin", 10 * 1024)), "firmware"))
        .await
        .unwrap();

    let frames = controller.view().frames();
    let first = frames.first().unwrap();
    assert!(first.progress_visible());
    assert_eq!(first.progress.percent, 0.0);

    let percents: Vec<f64> = frames.iter().map(|f| f.progress.percent).collect();
    assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{:?}", percents);
    assert_eq!(*percents.last().unwrap(), 100.0);
    // One frame per chunk between start and the terminal frame
    assert_eq!(frames.len(), 1 + 10 + 1);
}

#[tokio::test]
async fn test_empty_file_fills_bar() {
    let target = MemoryTarget::new();
    let server = device(target.clone()).await;
    let controller = UploadController::from_client(server.client.clone(), RecordingView::new());

    controller
        .submit(UploadForm::new(Some(image("empty.bin", 0)), "data"))
        .await
        .unwrap();

    let frames = controller.view().frames();
    assert_eq!(frames.len(), 3); // start, envelope sent, success
    assert_eq!(frames[1].progress.label(), "100%");

    let panel = controller.panel();
    assert_eq!(panel.status.text, "Upload complete! Rebooting...");
    assert_eq!(panel.progress.percent, 100.0);
    assert!(target.image(UpdateType::Data).unwrap().content.is_empty());
}

#[tokio::test]
async fn test_device_error_body_is_shown() {
    let server = device(MemoryTarget::failing("disk full")).await;
    let controller = UploadController::from_client(server.client.clone(), RecordingView::new());

    let result = controller
        .submit(UploadForm::new(Some(image("fs.bin", 4096)), "data"))
        .await;

    match result {
        Err(UploadError::Rejected { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("disk full"));
        }
        other => panic!("expected rejection, got {:?}", other),
    }

    let panel = controller.panel();
    assert!(panel.status.text.starts_with("Upload failed! "));
    assert!(panel.status.text.contains("disk full"));
    assert!(panel.form_visible());
    assert!(!panel.progress_visible());
}

#[tokio::test]
async fn test_network_failure_reverts_to_form() {
    let addr = unused_local_addr().await.unwrap();
    let config = UploaderConfig::builder(format!("http://{}", addr))
        .connect_timeout_ms(1_000)
        .build();
    let client = OtaClient::with_config(config).unwrap();
    let controller = UploadController::from_client(client, RecordingView::new());

    let result = controller
        .submit(UploadForm::new(Some(image("fw.bin", 128)), "firmware"))
        .await;

    assert!(matches!(result, Err(UploadError::Network(_))));

    let frames = controller.view().frames();
    assert!(frames.first().unwrap().progress_visible());
    let last = frames.last().unwrap();
    assert_eq!(last.status.text, "Upload failed! A network error occurred.");
    assert_eq!(last.status.kind, StatusKind::Error);
    assert!(last.form_visible());
}

#[tokio::test]
async fn test_missing_file_never_reaches_device() {
    let target = MemoryTarget::new();
    let server = device(target.clone()).await;
    let controller = UploadController::from_client(server.client.clone(), RecordingView::new());

    let result = controller.submit(UploadForm::new(None, "firmware")).await;

    assert!(matches!(result, Err(UploadError::NoFileSelected)));
    assert_eq!(controller.panel().status.text, "Please select a file!");
    assert_eq!(server.client.ota_status().await.unwrap(), OtaStatus::Idle);
    assert!(target.image(UpdateType::Firmware).is_none());
}

#[tokio::test]
async fn test_directory_target_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let state = DeviceState::new(Arc::new(DirectoryTarget::new(dir.path())));
    let server = TestServer::start(create_router(state)).await.unwrap();
    let controller = UploadController::from_client(server.client.clone(), RecordingView::new());

    let file = image("fw.bin", 3000);
    controller
        .submit(UploadForm::new(Some(file.clone()), "firmware"))
        .await
        .unwrap();

    let written = std::fs::read(dir.path().join("firmware.bin")).unwrap();
    assert_eq!(written, file.content.to_vec());
}

// =============================================================================
// Device info
// =============================================================================

#[tokio::test]
async fn test_version_and_health() {
    let server = device(MemoryTarget::new()).await;

    assert_eq!(server.client.version().await.unwrap(), "9.9.9");
    assert_eq!(server.client.health().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_ota_status_after_upload() {
    let server = device(MemoryTarget::new()).await;
    let controller = UploadController::from_client(server.client.clone(), RecordingView::new());

    controller
        .submit(UploadForm::new(Some(image("fs.bin", 64)), "data"))
        .await
        .unwrap();

    assert_eq!(
        server.client.ota_status().await.unwrap(),
        OtaStatus::Complete {
            update_type: UpdateType::Data
        }
    );
    server.shutdown().await;
}
