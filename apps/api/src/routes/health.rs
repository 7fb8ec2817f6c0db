use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and export backend status.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let sessions = state.sessions.len().await;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "cvgenius-api",
        "conversion_service": state.config.export_service_url.is_some(),
        "sessions": sessions,
    }))
}
