//! HTTP client for OTA devices

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Body, Client};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};
use url::Url;

use ota_core::protocol::{HEALTH_ENDPOINT, OTA_STATUS_ENDPOINT, VERSION_ENDPOINT};
use ota_core::OtaStatus;

use crate::config::UploaderConfig;
use crate::error::{Result, UploadError};
use crate::transport::{
    chunked_body, TransferEvent, Transport, TransportError, TransportResponse, UploadRequest,
};

/// HTTP client for a single OTA device
///
/// Implements [`Transport`] with multipart uploads whose body is streamed in
/// chunks so that send progress can be reported.
#[derive(Debug, Clone)]
pub struct OtaClient {
    client: Client,
    base_url: Url,
    config: UploaderConfig,
}

impl OtaClient {
    /// Create a client for the device at `base_url` with default settings
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(UploaderConfig::builder(base_url).build())
    }

    /// Create a client from configuration
    pub fn with_config(config: UploaderConfig) -> Result<Self> {
        let mut builder =
            Client::builder().connect_timeout(Duration::from_millis(config.timeouts.connect_ms));
        if let Some(ms) = config.timeouts.request_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder.build()?;

        let base_url = Url::parse(&config.connection.base_url)?;
        for path in [&config.endpoints.firmware, &config.endpoints.data] {
            base_url.join(path)?;
        }

        info!("OTA client created for {}", base_url);

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Create a client from a YAML config file
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Self::with_config(UploaderConfig::from_yaml_file(path)?)
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the configuration
    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Check device health
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<String> {
        let url = self.base_url.join(HEALTH_ENDPOINT)?;
        let response = self.client.get(url).send().await?;
        self.handle_text(response).await
    }

    /// Read the firmware version reported by the device
    #[instrument(skip(self))]
    pub async fn version(&self) -> Result<String> {
        let url = self.base_url.join(VERSION_ENDPOINT)?;
        debug!("Reading version from {}", url);

        let response = self.client.get(url).send().await?;
        self.handle_text(response).await.map(|v| v.trim().to_string())
    }

    /// Read the device-side update status
    #[instrument(skip(self))]
    pub async fn ota_status(&self) -> Result<OtaStatus> {
        let url = self.base_url.join(OTA_STATUS_ENDPOINT)?;
        let response = self.client.get(url).send().await?;

        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| UploadError::ParseError(e.to_string()))
        } else {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| format!("HTTP {}", status));
            Err(UploadError::server_error(status.as_u16(), message))
        }
    }

    async fn handle_text(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(UploadError::server_error(status.as_u16(), body))
        }
    }

    fn build_form(&self, request: &UploadRequest, sent_tx: mpsc::UnboundedSender<u64>) -> Form {
        let total = request.file.len() as u64;
        let body = Body::wrap_stream(chunked_body(
            request.file.content.clone(),
            self.config.upload.chunk_size,
            sent_tx,
        ));
        let part = Part::stream_with_length(body, total).file_name(request.file.name.clone());

        Form::new().part(self.config.upload.field_name.clone(), part)
    }
}

#[async_trait]
impl Transport for OtaClient {
    #[instrument(skip(self, request, events), fields(path = %request.path, size = request.file.len()))]
    async fn send(
        &self,
        request: UploadRequest,
        events: &(dyn Fn(TransferEvent) + Send + Sync),
    ) -> std::result::Result<TransportResponse, TransportError> {
        let url = self.base_url.join(&request.path)?;
        let total = request.file.len() as u64;

        let (sent_tx, mut sent_rx) = mpsc::unbounded_channel();
        let form = self.build_form(&request, sent_tx);
        let http_request = self.client.post(url.clone()).multipart(form).build()?;
        let body_len = content_length(&http_request);

        info!(
            "Uploading {} ({} bytes) to {}",
            request.file.name, total, url
        );
        events(TransferEvent::Started);

        let send = self.client.execute(http_request);
        tokio::pin!(send);

        let result = loop {
            tokio::select! {
                biased;
                Some(sent) = sent_rx.recv() => {
                    events(TransferEvent::Progress { sent, total: Some(total) });
                }
                result = &mut send => break result,
            }
        };

        // Chunks pulled right before the response arrived
        while let Ok(sent) = sent_rx.try_recv() {
            events(TransferEvent::Progress {
                sent,
                total: Some(total),
            });
        }

        let response = result?;

        // An empty file sends only the multipart envelope, which has no
        // chunks to report; the response means all of it went out
        if total == 0 {
            if let Some(len) = body_len {
                events(TransferEvent::Progress {
                    sent: len,
                    total: Some(len),
                });
            }
        }

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, "Upload response received");

        Ok(TransportResponse { status, body })
    }
}

fn content_length(request: &reqwest::Request) -> Option<u64> {
    request
        .headers()
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
