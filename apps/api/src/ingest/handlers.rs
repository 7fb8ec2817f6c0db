use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::ingest::{import_file, ImportError};
use crate::render::TemplateId;
use crate::sections::SectionRegistry;
use crate::session::{EditSession, SessionView};
use crate::state::AppState;

fn multipart_error(e: MultipartError) -> AppError {
    AppError::Validation(e.body_text())
}

/// POST /api/v1/sessions/import
///
/// Multipart form with a `file` part (.pdf, .docx or .txt) and an optional
/// `template` part. The parsed CV becomes the starting document of a new session.
pub async fn handle_import(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut template: Option<TemplateId> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                upload = Some((filename, bytes.to_vec()));
            }
            "template" => {
                let raw = field.text().await.map_err(multipart_error)?;
                let parsed = raw
                    .trim()
                    .parse::<TemplateId>()
                    .map_err(|e| AppError::Validation(format!("invalid template: {e}")))?;
                template = Some(parsed);
            }
            _ => {}
        }
    }

    let (filename, bytes) = upload
        .ok_or_else(|| AppError::Validation("multipart field 'file' is required".into()))?;
    if bytes.is_empty() {
        return Err(ImportError::Empty.into());
    }

    let document = import_file(&filename, bytes).await?;
    let session = EditSession::new(
        document,
        template.unwrap_or(state.config.default_template),
        SectionRegistry::default(),
        state.config.history_limit,
    );
    let view = session.view();
    info!(session_id = %view.id, file = %filename, "session created from import");
    state.sessions.insert(session).await;
    Ok((StatusCode::CREATED, Json(view)))
}
