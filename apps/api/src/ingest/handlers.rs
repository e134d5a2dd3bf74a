use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::ingest::normalize::normalize_payload;
use crate::ingest::upload::ResumeUpload;
use crate::ingest::IngestError;
use crate::session::Session;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub session: Session,
    pub detected_sections: Vec<String>,
    pub completed_sections: Vec<String>,
}

/// POST /api/v1/sessions/upload
/// Multipart field `file`. Streams the file through the extraction service and
/// opens a session from the normalized result.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let max_bytes = state.config.max_upload_bytes;
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?;
        upload = Some(ResumeUpload::new(file_name, content_type, bytes, max_bytes)?);
        break;
    }
    let upload = upload.ok_or(IngestError::EmptyFile)?;

    let outcome = state.extraction.extract(upload).await?;
    info!(
        "Extraction finished: {} of {} detected section(s) completed",
        outcome.completed_sections.len(),
        outcome.detected_sections.len()
    );

    let record = normalize_payload(&outcome.payload);
    let session = state.sessions.create(record).await;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            session,
            detected_sections: outcome.detected_sections,
            completed_sections: outcome.completed_sections,
        }),
    ))
}

/// A body cut off by the upload limit reads as an oversized file.
fn multipart_error(err: MultipartError, max_bytes: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        IngestError::file_too_large(max_bytes).into()
    } else {
        AppError::Validation(err.body_text())
    }
}
