//! Test utilities for ota-client
//!
//! Provides a view that records every rendered frame and a server harness
//! for running uploads against an in-process axum router.

use std::net::SocketAddr;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::net::TcpListener;

use ota_core::UploadPanel;

use crate::config::UploaderConfig;
use crate::view::UploadView;
use crate::{OtaClient, Result};

/// View that stores a copy of every rendered panel
#[derive(Debug, Default)]
pub struct RecordingView {
    frames: Mutex<Vec<UploadPanel>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// All frames rendered so far, oldest first
    pub fn frames(&self) -> Vec<UploadPanel> {
        self.frames.lock().clone()
    }

    /// Most recently rendered frame
    pub fn last(&self) -> Option<UploadPanel> {
        self.frames.lock().last().cloned()
    }
}

impl UploadView for RecordingView {
    fn render(&self, panel: &UploadPanel) {
        self.frames.lock().push(panel.clone());
    }
}

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: OtaClient,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Create a new test server from an axum Router
    ///
    /// # Example
    ///
    /// ```ignore
    /// use ota_client::testing::TestServer;
    /// use ota_device::{create_router, DeviceState, MemoryTarget};
    ///
    /// let state = DeviceState::new(Arc::new(MemoryTarget::new()));
    /// let server = TestServer::start(create_router(state)).await?;
    ///
    /// let version = server.client.version().await?;
    /// ```
    pub async fn start<S>(router: axum::Router<S>) -> Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
    {
        Self::start_with(router, |config| config).await
    }

    /// Create a new test server, adjusting the client configuration first
    pub async fn start_with<S, F>(router: axum::Router<S>, configure: F) -> Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
        F: FnOnce(UploaderConfig) -> UploaderConfig,
    {
        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let router: axum::Router = router.into();

        // Spawn the server
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        let base_url = format!("http://{}", addr);
        let config = configure(
            UploaderConfig::builder(&base_url)
                .connect_timeout_ms(2_000)
                .request_timeout_ms(10_000)
                .build(),
        );
        let client = OtaClient::with_config(config)?;

        Ok(Self {
            addr,
            client,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal if not already done
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        // Abort the task if still running
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Address on the loopback interface with nothing listening on it
pub async fn unused_local_addr() -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}
