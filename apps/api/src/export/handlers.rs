use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::jobs::ExportJobView;
use crate::export::{ExportFormat, FormatInfo};
use crate::extract::ApiJson;
use crate::render::DateLocale;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartExportRequest {
    pub format: ExportFormat,
    /// Overrides the configured date locale for this export only.
    #[serde(default)]
    pub locale: Option<DateLocale>,
}

/// POST /api/v1/sessions/:id/exports
///
/// Validation happens before the job is created, so a payload problem or a missing
/// conversion service is an immediate error response rather than a failed job.
pub async fn handle_start_export(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    ApiJson(req): ApiJson<StartExportRequest>,
) -> Result<(StatusCode, Json<ExportJobView>), AppError> {
    let snapshot = state
        .sessions
        .read(session_id, |session| session.export_snapshot())
        .await
        .ok_or_else(|| AppError::session_not_found(session_id))?;

    let prepared = state.bridge.prepare(snapshot, req.format, req.locale)?;
    let job = state
        .exports
        .start(session_id, state.bridge.clone(), prepared)
        .await;
    Ok((StatusCode::ACCEPTED, Json(job)))
}

/// GET /api/v1/exports/:job_id
pub async fn handle_get_export(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ExportJobView>, AppError> {
    let job = state
        .exports
        .get(job_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Export job {job_id} not found")))?;
    Ok(Json(job))
}

/// DELETE /api/v1/exports/:job_id
pub async fn handle_cancel_export(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ExportJobView>, AppError> {
    let job = state
        .exports
        .cancel(job_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Export job {job_id} not found")))?;
    Ok(Json(job))
}

/// GET /api/v1/export/formats
pub async fn handle_export_formats(State(state): State<AppState>) -> Json<Vec<FormatInfo>> {
    Json(state.bridge.supported_formats())
}
