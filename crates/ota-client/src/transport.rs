//! Upload transport abstraction
//!
//! A transport sends one multipart upload and reports its lifecycle through
//! [`TransferEvent`]s. Terminal outcomes are the return value: a response
//! with any status code, or a [`TransportError`] when no response arrived.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, Stream};
use tokio::sync::mpsc;

use ota_core::{SelectedFile, UpdateType};

/// One upload as handed to a transport
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Update type the request was built for
    pub update_type: UpdateType,
    /// Endpoint path, relative to the device base URL
    pub path: String,
    /// File sent as the single multipart entry
    pub file: SelectedFile,
}

/// Non-terminal lifecycle events of an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEvent {
    /// Request is about to be sent. Emitted exactly once per request.
    Started,
    /// Cumulative bytes handed to the connection
    Progress {
        sent: u64,
        /// Payload size, when known
        total: Option<u64>,
    },
}

/// Raw response of an upload request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// Response body as text, uninterpreted
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// The request did not produce a response
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

/// Sends uploads to a device
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one upload.
    ///
    /// `events` receives [`TransferEvent::Started`] once, before anything is
    /// sent, then zero or more progress events. It is never called after
    /// this future resolves.
    async fn send(
        &self,
        request: UploadRequest,
        events: &(dyn Fn(TransferEvent) + Send + Sync),
    ) -> Result<TransportResponse, TransportError>;
}

/// Split `content` into `chunk_size` pieces, reporting the cumulative byte
/// count on `sent_tx` as each piece is pulled by the HTTP body writer.
pub(crate) fn chunked_body(
    content: Bytes,
    chunk_size: usize,
    sent_tx: mpsc::UnboundedSender<u64>,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
    let chunk_size = chunk_size.max(1);
    let len = content.len();
    let mut sent = 0u64;

    stream::iter((0..len).step_by(chunk_size).map(move |start| {
        let end = (start + chunk_size).min(len);
        let chunk = content.slice(start..end);
        sent += chunk.len() as u64;
        // Receiver is gone once the upload finished; nothing left to report
        let _ = sent_tx.send(sent);
        Ok(chunk)
    }))
}
