pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::export::handlers as exports;
use crate::ingest::handlers as imports;
use crate::session::handlers as sessions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let import_limit = DefaultBodyLimit::max(state.config.import_max_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/import",
            post(imports::handle_import).layer(import_limit),
        )
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_session).delete(sessions::handle_delete_session),
        )
        .route("/api/v1/sessions/:id/edits", post(sessions::handle_apply_edits))
        .route("/api/v1/sessions/:id/undo", post(sessions::handle_undo))
        .route("/api/v1/sessions/:id/redo", post(sessions::handle_redo))
        .route(
            "/api/v1/sessions/:id/sections/reorder",
            post(sessions::handle_reorder_sections),
        )
        .route(
            "/api/v1/sessions/:id/sections/:section/toggle",
            post(sessions::handle_toggle_section),
        )
        .route(
            "/api/v1/sessions/:id/template",
            put(sessions::handle_set_template),
        )
        // Preview
        .route("/api/v1/sessions/:id/preview", get(sessions::handle_preview))
        .route(
            "/api/v1/sessions/:id/preview/cover-letter",
            get(sessions::handle_cover_letter_preview),
        )
        .route(
            "/api/v1/sessions/:id/preview/commit",
            post(sessions::handle_inline_commit),
        )
        // Export
        .route("/api/v1/sessions/:id/exports", post(exports::handle_start_export))
        .route(
            "/api/v1/exports/:job_id",
            get(exports::handle_get_export).delete(exports::handle_cancel_export),
        )
        .route("/api/v1/export/formats", get(exports::handle_export_formats))
        .with_state(state)
}
