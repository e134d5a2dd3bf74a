use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::render::docx::{self, document_file_name, DOCX_MIME};
use crate::render::preview::{self, PreviewTree};
use crate::state::AppState;

/// Bytes escaped in `filename*`: everything except alphanumerics and `-._~`.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// GET /api/v1/sessions/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PreviewTree>, AppError> {
    let record = state.sessions.snapshot(id).await?;
    let tree = tokio::task::spawn_blocking(move || preview::render(&record))
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(Json(tree))
}

/// GET /api/v1/sessions/:id/document
/// Builds the DOCX from a snapshot of the session's record.
pub async fn handle_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let record = state.sessions.snapshot(id).await?;
    let file_name = document_file_name(&record);

    // CPU-bound: packaging runs off the async executor.
    let bytes = tokio::task::spawn_blocking(move || docx::build(&record))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;
    info!("Generated {file_name} ({} bytes) for session {id}", bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&file_name)),
        ],
        bytes,
    )
        .into_response())
}

/// `attachment` disposition with an ASCII `filename` and a UTF-8 `filename*`.
fn content_disposition(file_name: &str) -> String {
    let ascii: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let encoded = utf8_percent_encode(file_name, ATTR_CHAR);
    format!("attachment; filename=\"{ascii}\"; filename*=UTF-8''{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_ascii_name() {
        assert_eq!(
            content_disposition("Ada Lovelace.docx"),
            "attachment; filename=\"Ada Lovelace.docx\"; filename*=UTF-8''Ada%20Lovelace.docx"
        );
    }

    #[test]
    fn test_content_disposition_replaces_unsafe_characters() {
        let value = content_disposition("José \"JJ\".docx");
        assert!(value.starts_with("attachment; filename=\"Jos_ _JJ_.docx\";"));
        assert!(value.ends_with("filename*=UTF-8''Jos%C3%A9%20%22JJ%22.docx"));
    }

    #[test]
    fn test_content_disposition_encodes_control_characters() {
        let value = content_disposition("Ada\u{000C}Lovelace~v2.docx");
        assert_eq!(
            value,
            "attachment; filename=\"Ada_Lovelace~v2.docx\"; filename*=UTF-8''Ada%0CLovelace~v2.docx"
        );
        assert!(header::HeaderValue::from_str(&value).is_ok());
    }
}
