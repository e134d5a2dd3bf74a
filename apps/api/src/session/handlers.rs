use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::edit::RecordEdit;
use crate::errors::AppError;
use crate::ingest::normalize::{normalize_payload, IngestPayload};
use crate::models::{MissingPointsCounts, MissingPointsReport};
use crate::session::Session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub edits: Vec<RecordEdit>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingPointsResponse {
    pub missing_points: Option<MissingPointsReport>,
    pub counts: Option<MissingPointsCounts>,
}

/// POST /api/v1/sessions
/// Opens a session from an already-extracted `final_data` payload.
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(payload): Json<IngestPayload>,
) -> Result<(StatusCode, Json<Session>), AppError> {
    let record = normalize_payload(&payload);
    let session = state.sessions.create(record).await;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(state.sessions.get(id).await?))
}

/// PATCH /api/v1/sessions/:id
pub async fn handle_edit_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EditRequest>,
) -> Result<Json<Session>, AppError> {
    if req.edits.is_empty() {
        return Err(AppError::Validation("edits must not be empty".to_string()));
    }
    Ok(Json(state.sessions.apply_edits(id, &req.edits).await?))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sessions/:id/missing-points
/// Forwards the ingestion report unchanged, with per-category counts.
pub async fn handle_missing_points(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MissingPointsResponse>, AppError> {
    let record = state.sessions.snapshot(id).await?;
    let counts = record.missing_points.as_ref().map(MissingPointsReport::counts);
    Ok(Json(MissingPointsResponse {
        missing_points: record.missing_points,
        counts,
    }))
}
