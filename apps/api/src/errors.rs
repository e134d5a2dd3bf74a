use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::edit::EditError;
use crate::ingest::IngestError;
use crate::render::docx::DocumentError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Edit rejected: {0}")]
    Edit(#[from] EditError),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Generation error: {0}")]
    Generation(#[from] DocumentError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<IngestError> for AppError {
    fn from(e: IngestError) -> Self {
        if e.is_client_error() {
            AppError::Validation(e.to_string())
        } else {
            AppError::Ingestion(e.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Edit(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EDIT_REJECTED",
                e.to_string(),
            ),
            AppError::Ingestion(msg) => {
                tracing::error!("Ingestion error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "INGESTION_ERROR",
                    format!("Resume processing failed: {msg}"),
                )
            }
            AppError::Generation(e) => {
                tracing::error!("Document generation error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "GENERATION_ERROR",
                    "Error generating Word document. Please try again.".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_problems_map_to_validation() {
        let err: AppError = IngestError::InvalidFileType.into();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_extraction_failures_map_to_ingestion() {
        let err: AppError = IngestError::Upstream("model timeout".into()).into();
        assert!(matches!(err, AppError::Ingestion(ref m) if m.contains("model timeout")));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_generation_failure_status() {
        let err = AppError::Generation(DocumentError::Package("disk full".into()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
