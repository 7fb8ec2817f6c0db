use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::document::{CVDocument, EditCommand};
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::render::{
    DateLocale, InlineCommit, MonthYearFormatter, PreviewFrame, RenderMode, TemplateId,
};
use crate::sections::{Section, SectionRegistry};
use crate::session::{EditSession, SessionView};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateSessionRequest {
    pub document: Option<CVDocument>,
    pub template: Option<TemplateId>,
    pub sections: Option<Vec<Section>>,
}

/// A single command, or a batch applied as one undo step.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EditRequest {
    Batch(Vec<EditCommand>),
    Single(EditCommand),
}

impl EditRequest {
    fn into_commands(self) -> Vec<EditCommand> {
        match self {
            EditRequest::Batch(commands) => commands,
            EditRequest::Single(command) => vec![command],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Deserialize)]
pub struct TemplateRequest {
    pub template: TemplateId,
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    pub mode: Option<RenderMode>,
    pub locale: Option<DateLocale>,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let registry = req
        .sections
        .map(SectionRegistry::from_entries)
        .unwrap_or_default();
    let session = EditSession::new(
        req.document.unwrap_or_default(),
        req.template.unwrap_or(state.config.default_template),
        registry,
        state.config.history_limit,
    );
    let view = session.view();
    state.sessions.insert(session).await;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .read(id, EditSession::view)
        .await
        .ok_or_else(|| AppError::session_not_found(id))?;
    Ok(Json(view))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(id).await {
        return Err(AppError::session_not_found(id));
    }
    state.exports.remove_session(id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/edits
pub async fn handle_apply_edits(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<EditRequest>,
) -> Result<Json<SessionView>, AppError> {
    let commands = req.into_commands();
    let view = state
        .sessions
        .write(id, |session| {
            session.apply(&commands);
            session.view()
        })
        .await
        .ok_or_else(|| AppError::session_not_found(id))?;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/undo
pub async fn handle_undo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .write(id, |session| {
            session.undo();
            session.view()
        })
        .await
        .ok_or_else(|| AppError::session_not_found(id))?;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/redo
pub async fn handle_redo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .write(id, |session| {
            session.redo();
            session.view()
        })
        .await
        .ok_or_else(|| AppError::session_not_found(id))?;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/sections/reorder
pub async fn handle_reorder_sections(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<ReorderRequest>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .write(id, |session| {
            session.reorder_sections(req.from, req.to);
            session.view()
        })
        .await
        .ok_or_else(|| AppError::session_not_found(id))?;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/sections/:section/toggle
pub async fn handle_toggle_section(
    State(state): State<AppState>,
    Path((id, section)): Path<(Uuid, String)>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .write(id, |session| {
            session.toggle_section(&section).map(|_| session.view())
        })
        .await
        .ok_or_else(|| AppError::session_not_found(id))?
        .ok_or_else(|| AppError::NotFound(format!("Section '{section}' not found")))?;
    Ok(Json(view))
}

/// PUT /api/v1/sessions/:id/template
pub async fn handle_set_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<TemplateRequest>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .write(id, |session| {
            if session.set_template(req.template) {
                info!(session_id = %id, template = %req.template, "template changed");
            }
            session.view()
        })
        .await
        .ok_or_else(|| AppError::session_not_found(id))?;
    Ok(Json(view))
}

/// GET /api/v1/sessions/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiQuery(query): ApiQuery<PreviewQuery>,
) -> Result<Json<PreviewFrame>, AppError> {
    let locale = query.locale.unwrap_or(state.config.date_locale);
    let dates = MonthYearFormatter::new(locale);
    let mode = query.mode.unwrap_or_default();
    let frame = state
        .sessions
        .read(id, |session| {
            session.preview(mode, &dates, locale.language_tag())
        })
        .await
        .ok_or_else(|| AppError::session_not_found(id))?;
    Ok(Json(frame))
}

/// GET /api/v1/sessions/:id/preview/cover-letter
pub async fn handle_cover_letter_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiQuery(query): ApiQuery<PreviewQuery>,
) -> Result<Json<PreviewFrame>, AppError> {
    let locale = query.locale.unwrap_or(state.config.date_locale);
    let dates = MonthYearFormatter::new(locale);
    let mode = query.mode.unwrap_or_default();
    let frame = state
        .sessions
        .read(id, |session| {
            session.cover_letter_preview(mode, &dates, locale.language_tag())
        })
        .await
        .ok_or_else(|| AppError::session_not_found(id))?;
    Ok(Json(frame))
}

/// POST /api/v1/sessions/:id/preview/commit
pub async fn handle_inline_commit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(commit): ApiJson<InlineCommit>,
) -> Result<Json<SessionView>, AppError> {
    let command = commit.into_command();
    let view = state
        .sessions
        .write(id, |session| {
            session.apply(std::slice::from_ref(&command));
            session.view()
        })
        .await
        .ok_or_else(|| AppError::session_not_found(id))?;
    Ok(Json(view))
}
