use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::export::ExportError;
use crate::ingest::ImportError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn session_not_found(id: uuid::Uuid) -> Self {
        AppError::NotFound(format!("Session {id} not found"))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Export(e) => {
                let (status, code) = match e {
                    ExportError::Validation(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "EXPORT_VALIDATION_ERROR")
                    }
                    ExportError::Rejected { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "EXPORT_REJECTED")
                    }
                    ExportError::Transport(_) => {
                        tracing::warn!("Export transport error: {e}");
                        (StatusCode::BAD_GATEWAY, "EXPORT_TRANSPORT_ERROR")
                    }
                    ExportError::Unavailable(_) => {
                        (StatusCode::SERVICE_UNAVAILABLE, "EXPORT_UNAVAILABLE")
                    }
                    ExportError::Cancelled => (StatusCode::CONFLICT, "EXPORT_CANCELLED"),
                };
                (status, code, e.to_string())
            }
            AppError::Import(e) => {
                let (status, code) = match e {
                    ImportError::UnsupportedFormat(_) => {
                        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "IMPORT_UNSUPPORTED_FORMAT")
                    }
                    ImportError::Unreadable(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "IMPORT_UNREADABLE")
                    }
                    ImportError::Empty => (StatusCode::UNPROCESSABLE_ENTITY, "IMPORT_EMPTY"),
                };
                (status, code, e.to_string())
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
    fn test_status_mapping() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::Export(ExportError::Validation("too big".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::Export(ExportError::Transport("down".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Export(ExportError::Unavailable("none".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (AppError::Export(ExportError::Cancelled), StatusCode::CONFLICT),
            (
                AppError::Import(ImportError::UnsupportedFormat("cv.odt".into())),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                AppError::Import(ImportError::Unreadable("bad xref".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AppError::Import(ImportError::Empty), StatusCode::UNPROCESSABLE_ENTITY),
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let response = AppError::NotFound("Session 1 not found".into()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Session 1 not found");
    }

    #[tokio::test]
    async fn test_json_rejection_uses_envelope() {
        use axum::{body::Body, extract::FromRequest, http::Request};

        let request = Request::post("/")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let rejection = Json::<serde_json::Value>::from_request(request, &())
            .await
            .unwrap_err();
        let response = AppError::from(rejection).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(!body["error"]["message"].as_str().unwrap().is_empty());
    }
}
