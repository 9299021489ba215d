//! Update and status handlers

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap};
use axum::Json;

use ota_core::{OtaStatus, UpdateType, UPLOAD_FIELD};

use crate::error::DeviceError;
use crate::state::DeviceState;
use crate::target::UpdateSession;

/// POST /update/firmware
/// Receive a firmware image
pub async fn upload_firmware(
    State(state): State<DeviceState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<&'static str, DeviceError> {
    let result = receive_update(&state, UpdateType::Firmware, &headers, multipart).await;

    if result.is_ok() && state.restart_after_firmware {
        state.request_restart();
    }
    result
}

/// POST /update/data
/// Receive a data (filesystem) image
pub async fn upload_data(
    State(state): State<DeviceState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<&'static str, DeviceError> {
    receive_update(&state, UpdateType::Data, &headers, multipart).await
}

/// GET /api/ota
/// Current update status
pub async fn ota_status(State(state): State<DeviceState>) -> Json<OtaStatus> {
    Json(state.monitor.status())
}

/// GET /api/version
pub async fn version(State(state): State<DeviceState>) -> String {
    state.version.to_string()
}

/// Find the upload field and stream it into a new target session.
///
/// The multipart body is always read to the end, also after a failed write,
/// so the uploader receives the response instead of a reset connection.
async fn receive_update(
    state: &DeviceState,
    update_type: UpdateType,
    headers: &HeaderMap,
    mut multipart: Multipart,
) -> Result<&'static str, DeviceError> {
    let total = content_length(headers);
    let mut outcome = None;

    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) if outcome.is_none() => return Err(e.into()),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring trailing multipart error");
                break;
            }
        };

        if outcome.is_some() || field.name() != Some(UPLOAD_FIELD) {
            tracing::debug!(name = ?field.name(), "Skipping form field");
            continue;
        }

        outcome = Some(store_field(state, update_type, total, &mut field).await);
    }

    outcome.unwrap_or_else(|| Err(DeviceError::BadRequest("No file uploaded".to_string())))
}

async fn store_field(
    state: &DeviceState,
    update_type: UpdateType,
    total: Option<u64>,
    field: &mut Field<'_>,
) -> Result<&'static str, DeviceError> {
    let file_name = field.file_name().unwrap_or("update.bin").to_string();
    state.monitor.on_start(update_type, &file_name);

    let mut session = match state.target.begin(update_type, &file_name).await {
        Ok(session) => session,
        Err(e) => {
            state.monitor.on_end(update_type, Err(&e.to_string()));
            return Err(e.into());
        }
    };

    let received = match copy_field(state, update_type, total, field, session.as_mut()).await {
        Ok(received) => received,
        Err(e) => {
            session.abort().await;
            state.monitor.on_end(update_type, Err(&e.to_string()));
            return Err(e);
        }
    };

    match session.finish().await {
        Ok(written) => {
            tracing::info!(
                update_type = %update_type,
                file_name = %file_name,
                received,
                written,
                "Image stored"
            );
            state.monitor.on_end(update_type, Ok(written));
            Ok("OK")
        }
        Err(e) => {
            state.monitor.on_end(update_type, Err(&e.to_string()));
            Err(e.into())
        }
    }
}

async fn copy_field(
    state: &DeviceState,
    update_type: UpdateType,
    total: Option<u64>,
    field: &mut Field<'_>,
    session: &mut dyn UpdateSession,
) -> Result<u64, DeviceError> {
    let mut received = 0u64;

    while let Some(chunk) = field.chunk().await? {
        session.write(&chunk).await.map_err(DeviceError::from)?;
        received += chunk.len() as u64;
        state.monitor.on_progress(update_type, received, total);
    }

    Ok(received)
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_content_length() {
        let mut headers = HeaderMap::new();
        assert_eq!(content_length(&headers), None);

        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("1234"));
        assert_eq!(content_length(&headers), Some(1234));

        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("n/a"));
        assert_eq!(content_length(&headers), None);
    }
}
