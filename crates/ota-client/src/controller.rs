//! Upload controller
//!
//! Drives one upload per submission and keeps an [`UploadPanel`] in sync
//! with the request lifecycle:
//!
//! | Event           | Panel effect                                          |
//! |-----------------|-------------------------------------------------------|
//! | no file         | error status, form stays                              |
//! | started         | progress view shown, status cleared, bar at 0%        |
//! | progress        | bar set to sent / total (only when total is known)    |
//! | 200 response    | success status, progress view stays                   |
//! | other status    | error status with the raw body, back to the form      |
//! | no response     | generic network error, back to the form               |
//!
//! Overlapping submissions are not prevented; hiding the form while an
//! upload runs is the only deterrent.

use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use ota_core::{SelectedFile, UpdateType, UploadPanel};

use crate::client::OtaClient;
use crate::config::EndpointsConfig;
use crate::error::{Result, UploadError};
use crate::transport::{TransferEvent, Transport, UploadRequest};
use crate::view::UploadView;

/// One user submission: the picked file (if any) and the raw type selector
#[derive(Debug, Clone)]
pub struct UploadForm {
    pub file: Option<SelectedFile>,
    /// Selector value; `"firmware"` picks the firmware endpoint, anything else the data endpoint
    pub update_type: String,
}

impl UploadForm {
    pub fn new(file: Option<SelectedFile>, update_type: impl Into<String>) -> Self {
        Self {
            file,
            update_type: update_type.into(),
        }
    }
}

/// Orchestrates uploads and reflects their outcome in a view
pub struct UploadController<T, V> {
    transport: T,
    view: V,
    endpoints: EndpointsConfig,
    panel: Mutex<UploadPanel>,
}

impl<V: UploadView> UploadController<OtaClient, V> {
    /// Controller using the client's configured endpoint paths
    pub fn from_client(client: OtaClient, view: V) -> Self {
        let endpoints = client.config().endpoints.clone();
        Self::new(client, view).with_endpoints(endpoints)
    }
}

impl<T: Transport, V: UploadView> UploadController<T, V> {
    /// Create a controller with the default `/update/firmware` and `/update/data` endpoints
    pub fn new(transport: T, view: V) -> Self {
        Self {
            transport,
            view,
            endpoints: EndpointsConfig::default(),
            panel: Mutex::new(UploadPanel::new()),
        }
    }

    /// Override the endpoint paths
    pub fn with_endpoints(mut self, endpoints: EndpointsConfig) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Snapshot of the current panel
    pub fn panel(&self) -> UploadPanel {
        self.panel.lock().clone()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Build the request a submission with `selector` would send
    pub fn request_for(&self, selector: &str, file: SelectedFile) -> UploadRequest {
        let update_type = UpdateType::from_selector(selector);
        UploadRequest {
            update_type,
            path: self.endpoints.path_for(update_type).to_string(),
            file,
        }
    }

    /// Handle one submission.
    ///
    /// Every outcome is rendered before this returns; the returned error
    /// mirrors what the panel shows.
    #[instrument(skip(self, form), fields(update_type = %form.update_type))]
    pub async fn submit(&self, form: UploadForm) -> Result<()> {
        let Some(file) = form.file else {
            warn!("Submission without a file");
            self.apply(UploadPanel::reject_missing_file);
            return Err(UploadError::NoFileSelected);
        };

        let request = self.request_for(&form.update_type, file);
        info!(
            "Submitting {} update: {} ({} bytes) -> {}",
            request.update_type,
            request.file.name,
            request.file.len(),
            request.path
        );

        let on_event = |event: TransferEvent| match event {
            TransferEvent::Started => self.apply(UploadPanel::begin_upload),
            TransferEvent::Progress {
                sent,
                total: Some(total),
            } => self.apply(|panel| panel.update_progress(sent, total)),
            TransferEvent::Progress { total: None, .. } => {}
        };

        match self.transport.send(request, &on_event).await {
            Ok(response) if response.status == 200 => {
                info!("Upload accepted");
                self.apply(UploadPanel::complete);
                Ok(())
            }
            Ok(response) => {
                warn!(status = response.status, body = %response.body, "Upload rejected");
                self.apply(|panel| panel.fail_with_response(&response.body));
                Err(UploadError::Rejected {
                    status: response.status,
                    body: response.body,
                })
            }
            Err(e) => {
                warn!(error = %e, "Upload failed without response");
                self.apply(UploadPanel::fail_network);
                Err(UploadError::Network(e))
            }
        }
    }

    fn apply(&self, update: impl FnOnce(&mut UploadPanel)) {
        let mut panel = self.panel.lock();
        update(&mut panel);
        debug!(phase = ?panel.phase, percent = panel.progress.percent, "Panel updated");
        self.view.render(&panel);
    }
}
