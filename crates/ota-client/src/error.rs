//! Error types for OTA upload operations

use thiserror::Error;

use crate::config::ConfigError;
use crate::transport::TransportError;

/// Result type alias for OTA client operations
pub type Result<T> = std::result::Result<T, UploadError>;

/// Errors that can occur while uploading
#[derive(Error, Debug)]
pub enum UploadError {
    /// Submission had no file attached
    #[error("Please select a file!")]
    NoFileSelected,

    /// Device answered with a non-200 status
    #[error("Upload rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// No response was received
    #[error("Network error: {0}")]
    Network(#[from] TransportError),

    /// HTTP client could not be built or a request failed outside an upload
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Device answered a non-upload request with an error
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl UploadError {
    /// Create a server error from status code and message
    pub fn server_error(status: u16, message: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            message: message.into(),
        }
    }
}
