//! Device error types and conversions

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::target::TargetError;

/// Errors returned by the upload endpoints
///
/// Bodies are plain text: uploaders show them to the user verbatim.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// 400 Bad Request
    #[error("{0}")]
    BadRequest(String),

    /// Malformed or oversized multipart body (status taken from the parser)
    #[error("{0}")]
    Multipart(#[from] MultipartError),

    /// 500 Internal Server Error
    #[error("{0}")]
    Target(#[from] TargetError),
}

impl IntoResponse for DeviceError {
    fn into_response(self) -> Response {
        let status = match &self {
            DeviceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            DeviceError::Multipart(e) => e.status(),
            DeviceError::Target(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match self {
            DeviceError::Multipart(e) => e.body_text(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(%message, "Upload error");
        } else {
            tracing::debug!(%message, "Upload client error");
        }

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let response = DeviceError::BadRequest("No file uploaded".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response =
            DeviceError::from(TargetError::Write("disk full".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
