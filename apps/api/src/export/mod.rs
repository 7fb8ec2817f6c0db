//! Export Bridge: document → downloadable artifact.
//!
//! txt, html and json are produced in-process. pdf and docx are delegated to an
//! external conversion service through the pluggable [`ConversionBackend`]; when no
//! service is configured those formats report `Unavailable` instead of failing late.
//!
//! Every export first serializes the document and checks its size, so a payload
//! problem surfaces as `Validation` before any network call is attempted.

pub mod handlers;
pub mod jobs;
pub mod remote;
pub mod text;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use crate::document::CVDocument;
use crate::render::dates::{DateLocale, MonthYearFormatter};
use crate::render::html::{render, RenderMode, RenderOptions};
use crate::render::templates::TemplateId;
use crate::sections::SectionRegistry;

pub use jobs::ExportJobs;
pub use remote::HttpConversionBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Docx,
    Txt,
    Html,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Pdf,
        ExportFormat::Docx,
        ExportFormat::Txt,
        ExportFormat::Html,
        ExportFormat::Json,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Txt => "txt",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Txt => "text/plain; charset=utf-8",
            ExportFormat::Html => "text/html; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    /// Formats that need the external conversion service.
    pub fn is_remote(&self) -> bool {
        matches!(self, ExportFormat::Pdf | ExportFormat::Docx)
    }

    fn display_name(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "PDF",
            ExportFormat::Docx => "Word Document",
            ExportFormat::Txt => "Plain Text",
            ExportFormat::Html => "HTML",
            ExportFormat::Json => "JSON Data",
        }
    }

    fn features(&self) -> &'static [&'static str] {
        match self {
            ExportFormat::Pdf => &["print_ready", "professional", "styling", "pagination"],
            ExportFormat::Docx => &["editable", "microsoft_office", "styling"],
            ExportFormat::Txt => &["portable", "lightweight", "ats_friendly"],
            ExportFormat::Html => &["web_ready", "styling", "portable"],
            ExportFormat::Json => &["data_portable", "structured", "machine_readable"],
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("export validation failed: {0}")]
    Validation(String),

    #[error("conversion service unreachable: {0}")]
    Transport(String),

    #[error("conversion service rejected the document (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("{0}")]
    Unavailable(String),

    #[error("export was cancelled")]
    Cancelled,
}

impl ExportError {
    /// Stable tag reported in job status payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            ExportError::Validation(_) => "validation",
            ExportError::Transport(_) => "transport",
            ExportError::Rejected { .. } => "rejected",
            ExportError::Unavailable(_) => "unavailable",
            ExportError::Cancelled => "cancelled",
        }
    }
}

/// Owned copy of everything an export needs. Taken under the session lock, then
/// handed to the job so later edits cannot leak into a running export.
#[derive(Debug, Clone)]
pub struct ExportSnapshot {
    pub document: CVDocument,
    pub template: TemplateId,
    pub sections: SectionRegistry,
    pub revision: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
    pub revision: u64,
}

/// Payload sent to the conversion service.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionRequest {
    pub format: ExportFormat,
    pub template: TemplateId,
    pub filename: String,
    /// Fully rendered page, ready for HTML-to-PDF/DOCX conversion.
    pub html: String,
    pub document: serde_json::Value,
}

/// What the conversion service hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFile {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait ConversionBackend: Send + Sync {
    async fn convert(&self, request: &ConversionRequest) -> Result<ConvertedFile, ExportError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// A snapshot that passed validation and is ready to run.
#[derive(Debug, Clone)]
pub struct PreparedExport {
    pub snapshot: ExportSnapshot,
    pub format: ExportFormat,
    /// Month names used for dates in the artifact.
    pub locale: DateLocale,
    payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormatInfo {
    pub format: ExportFormat,
    pub name: &'static str,
    pub content_type: &'static str,
    pub available: bool,
    pub features: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

pub struct ExportBridge {
    backend: Option<Arc<dyn ConversionBackend>>,
    max_bytes: usize,
    locale: DateLocale,
}

impl ExportBridge {
    pub fn new(
        backend: Option<Arc<dyn ConversionBackend>>,
        max_bytes: usize,
        locale: DateLocale,
    ) -> Self {
        Self {
            backend,
            max_bytes,
            locale,
        }
    }

    pub fn supported_formats(&self) -> Vec<FormatInfo> {
        ExportFormat::ALL
            .iter()
            .map(|&format| {
                let available = !format.is_remote() || self.backend.is_some();
                FormatInfo {
                    format,
                    name: format.display_name(),
                    content_type: format.content_type(),
                    available,
                    features: format.features(),
                    error: (!available).then_some("no conversion service configured"),
                }
            })
            .collect()
    }

    /// Serializes and size-checks the snapshot, and confirms the format can be
    /// produced at all. Cheap enough to run inline before a job is spawned.
    /// `locale` overrides the configured date locale for this export.
    pub fn prepare(
        &self,
        snapshot: ExportSnapshot,
        format: ExportFormat,
        locale: Option<DateLocale>,
    ) -> Result<PreparedExport, ExportError> {
        let bytes = serde_json::to_vec(&snapshot.document)
            .map_err(|e| ExportError::Validation(format!("document is not serializable: {e}")))?;
        if bytes.len() > self.max_bytes {
            return Err(ExportError::Validation(format!(
                "document is {} bytes, the export limit is {} bytes",
                bytes.len(),
                self.max_bytes
            )));
        }
        if format.is_remote() && self.backend.is_none() {
            return Err(ExportError::Unavailable(format!(
                "{format} export requires a conversion service and none is configured"
            )));
        }
        let payload = serde_json::from_slice(&bytes)
            .map_err(|e| ExportError::Validation(format!("document is not serializable: {e}")))?;

        Ok(PreparedExport {
            snapshot,
            format,
            locale: locale.unwrap_or(self.locale),
            payload,
        })
    }

    /// Produces the artifact for a prepared export: locally for txt, html and json,
    /// through the conversion service for pdf and docx.
    pub async fn export_document(
        &self,
        prepared: PreparedExport,
    ) -> Result<ExportArtifact, ExportError> {
        let PreparedExport {
            snapshot,
            format,
            locale,
            payload,
        } = prepared;
        let dates = MonthYearFormatter::new(locale);
        let filename = export_filename(&snapshot.document, format);
        let options = RenderOptions {
            mode: RenderMode::Preview,
            dates: &dates,
            language: locale.language_tag(),
        };

        let (bytes, filename, content_type) = match format {
            ExportFormat::Txt => (
                text::render_text(&snapshot.document, &snapshot.sections, &dates).into_bytes(),
                filename,
                format.content_type().to_string(),
            ),
            ExportFormat::Html => (
                render_page(&snapshot, &options).into_bytes(),
                filename,
                format.content_type().to_string(),
            ),
            ExportFormat::Json => {
                let body = json!({
                    "cv_data": payload,
                    "export_metadata": {
                        "export_date": chrono::Utc::now().to_rfc3339(),
                        "export_format": "json",
                        "template": snapshot.template,
                        "sections": snapshot.sections,
                        "revision": snapshot.revision,
                        "version": "1.0",
                    }
                });
                let bytes = serde_json::to_vec_pretty(&body)
                    .map_err(|e| ExportError::Validation(e.to_string()))?;
                (bytes, filename, format.content_type().to_string())
            }
            ExportFormat::Pdf | ExportFormat::Docx => {
                let backend = self.backend.as_ref().ok_or_else(|| {
                    ExportError::Unavailable(format!(
                        "{format} export requires a conversion service and none is configured"
                    ))
                })?;
                let request = ConversionRequest {
                    format,
                    template: snapshot.template,
                    filename: filename.clone(),
                    html: render_page(&snapshot, &options),
                    document: payload,
                };
                debug!(backend = backend.name(), %format, "delegating export");
                let converted = backend.convert(&request).await?;
                if converted.bytes.is_empty() {
                    return Err(ExportError::Transport(
                        "conversion service returned an empty file".to_string(),
                    ));
                }
                (
                    converted.bytes,
                    converted.filename.unwrap_or(filename),
                    converted
                        .content_type
                        .unwrap_or_else(|| format.content_type().to_string()),
                )
            }
        };

        info!(
            %format,
            revision = snapshot.revision,
            size = bytes.len(),
            "export artifact ready"
        );

        Ok(ExportArtifact {
            filename,
            content_type,
            bytes,
            format,
            revision: snapshot.revision,
        })
    }

}

fn render_page(snapshot: &ExportSnapshot, options: &RenderOptions<'_>) -> String {
    render(
        &snapshot.document,
        snapshot.template,
        &snapshot.sections,
        options,
    )
    .into_string()
}

/// `John_Doe_CV.pdf`; `CV.pdf` when the name is blank.
pub fn export_filename(document: &CVDocument, format: ExportFormat) -> String {
    let stem: String = document
        .personal
        .full_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    if stem.is_empty() {
        format!("CV.{format}")
    } else {
        format!("{stem}_CV.{format}")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::document::models::PersonalField;
    use crate::sections::SectionRegistry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Conversion backend that returns a fixed result and counts calls.
    pub(crate) struct StubBackend {
        pub result: Result<ConvertedFile, ExportError>,
        pub calls: AtomicUsize,
        pub delay: Option<std::time::Duration>,
    }

    impl StubBackend {
        pub fn ok(bytes: &[u8]) -> Self {
            Self {
                result: Ok(ConvertedFile {
                    bytes: bytes.to_vec(),
                    filename: None,
                    content_type: None,
                }),
                calls: AtomicUsize::new(0),
                delay: None,
            }
        }

        pub fn failing(error: ExportError) -> Self {
            Self {
                result: Err(error),
                calls: AtomicUsize::new(0),
                delay: None,
            }
        }
    }

    #[async_trait]
    impl ConversionBackend for StubBackend {
        async fn convert(
            &self,
            _request: &ConversionRequest,
        ) -> Result<ConvertedFile, ExportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.result.clone()
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    pub(crate) fn snapshot(document: CVDocument) -> ExportSnapshot {
        ExportSnapshot {
            document,
            template: TemplateId::Modern,
            sections: SectionRegistry::default(),
            revision: 3,
        }
    }

    async fn run(
        bridge: &ExportBridge,
        document: CVDocument,
        format: ExportFormat,
    ) -> Result<ExportArtifact, ExportError> {
        let prepared = bridge.prepare(snapshot(document), format, None)?;
        bridge.export_document(prepared).await
    }

    fn john() -> CVDocument {
        CVDocument::default().set_personal_field(PersonalField::FullName, "John Doe")
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename(&john(), ExportFormat::Pdf), "John_Doe_CV.pdf");
        assert_eq!(export_filename(&CVDocument::default(), ExportFormat::Txt), "CV.txt");
        let odd = CVDocument::default().set_personal_field(PersonalField::FullName, "A/B  C");
        assert_eq!(export_filename(&odd, ExportFormat::Json), "AB_C_CV.json");
    }

    #[test]
    fn test_oversized_document_is_validation_error() {
        let bridge = ExportBridge::new(None, 64, DateLocale::En);
        let big = john().set_summary("x".repeat(500));
        let err = bridge
            .prepare(snapshot(big), ExportFormat::Txt, None)
            .unwrap_err();
        assert!(matches!(err, ExportError::Validation(_)));
    }

    #[test]
    fn test_remote_format_without_backend_is_unavailable() {
        let bridge = ExportBridge::new(None, 1 << 20, DateLocale::En);
        let err = bridge
            .prepare(snapshot(john()), ExportFormat::Pdf, None)
            .unwrap_err();
        assert_eq!(err.kind(), "unavailable");
        assert!(bridge
            .prepare(snapshot(john()), ExportFormat::Txt, None)
            .is_ok());
    }

    #[test]
    fn test_supported_formats_report_availability() {
        let bridge = ExportBridge::new(None, 1 << 20, DateLocale::En);
        let formats = bridge.supported_formats();
        assert_eq!(formats.len(), 5);
        let pdf = formats.iter().find(|f| f.format == ExportFormat::Pdf).unwrap();
        assert!(!pdf.available);
        let txt = formats.iter().find(|f| f.format == ExportFormat::Txt).unwrap();
        assert!(txt.available);

        let with_backend = ExportBridge::new(
            Some(Arc::new(StubBackend::ok(b"%PDF"))),
            1 << 20,
            DateLocale::En,
        );
        assert!(with_backend.supported_formats().iter().all(|f| f.available));
    }

    #[tokio::test]
    async fn test_local_exports() {
        let bridge = ExportBridge::new(None, 1 << 20, DateLocale::En);

        let txt = run(&bridge, john(), ExportFormat::Txt).await.unwrap();
        assert_eq!(txt.filename, "John_Doe_CV.txt");
        assert!(String::from_utf8(txt.bytes).unwrap().starts_with("JOHN DOE\n========"));
        assert_eq!(txt.revision, 3);

        let html = run(&bridge, john(), ExportFormat::Html).await.unwrap();
        assert!(String::from_utf8(html.bytes).unwrap().starts_with("<!DOCTYPE html>"));

        let json = run(&bridge, john(), ExportFormat::Json).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json.bytes).unwrap();
        assert_eq!(value["cv_data"]["personal"]["fullName"], "John Doe");
        assert_eq!(value["export_metadata"]["template"], "modern");
    }

    #[tokio::test]
    async fn test_remote_export_uses_backend_and_default_filename() {
        let backend = Arc::new(StubBackend::ok(b"%PDF-1.7"));
        let bridge = ExportBridge::new(Some(backend.clone()), 1 << 20, DateLocale::En);
        let artifact = run(&bridge, john(), ExportFormat::Pdf).await.unwrap();
        assert_eq!(artifact.bytes, b"%PDF-1.7");
        assert_eq!(artifact.filename, "John_Doe_CV.pdf");
        assert_eq!(artifact.content_type, "application/pdf");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_never_reaches_backend() {
        let backend = Arc::new(StubBackend::ok(b"%PDF"));
        let bridge = ExportBridge::new(Some(backend.clone()), 16, DateLocale::En);
        let err = run(&bridge, john(), ExportFormat::Pdf).await.unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_is_distinct_from_validation() {
        let backend = Arc::new(StubBackend::failing(ExportError::Transport(
            "connection refused".into(),
        )));
        let bridge = ExportBridge::new(Some(backend), 1 << 20, DateLocale::En);
        let err = run(&bridge, john(), ExportFormat::Docx).await.unwrap_err();
        assert_eq!(err.kind(), "transport");
    }

    #[tokio::test]
    async fn test_locale_override_applies_to_artifact() {
        let bridge = ExportBridge::new(None, 1 << 20, DateLocale::En);
        let doc = john()
            .add_experience()
            .update_experience(
                0,
                &crate::document::models::ExperiencePatch {
                    job_title: Some("Engineer".into()),
                    start_date: Some("2020-03".into()),
                    end_date: Some("2021-05".into()),
                    ..Default::default()
                },
            );

        let default = run(&bridge, doc.clone(), ExportFormat::Txt).await.unwrap();
        assert!(String::from_utf8(default.bytes).unwrap().contains("Mar 2020"));

        let prepared = bridge
            .prepare(snapshot(doc), ExportFormat::Html, Some(DateLocale::De))
            .unwrap();
        let german = bridge.export_document(prepared).await.unwrap();
        let html = String::from_utf8(german.bytes).unwrap();
        assert!(html.contains("März 2020"));
        assert!(html.contains("<html lang=\"de\">"));
    }
}
