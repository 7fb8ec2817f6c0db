// CV Import: an uploaded PDF, DOCX or plain-text CV becomes a starting document.
// Text extraction is blocking and runs inside tokio::task::spawn_blocking.

pub mod extract;
pub mod handlers;
pub mod parser;

use thiserror::Error;
use tracing::{debug, info};

use crate::document::CVDocument;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Could not read the uploaded file: {0}")]
    Unreadable(String),

    #[error("No CV content could be found in the uploaded file")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Docx,
    Txt,
}

impl SourceFormat {
    /// Picks the format from the file extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self, ImportError> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => Ok(SourceFormat::Pdf),
            "docx" => Ok(SourceFormat::Docx),
            "txt" => Ok(SourceFormat::Txt),
            _ => Err(ImportError::UnsupportedFormat(format!(
                "'{filename}' (expected .pdf, .docx or .txt)"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Pdf => "pdf",
            SourceFormat::Docx => "docx",
            SourceFormat::Txt => "txt",
        }
    }
}

/// Extracts text from the upload and parses it into a document.
pub async fn import_file(filename: &str, bytes: Vec<u8>) -> Result<CVDocument, ImportError> {
    let format = SourceFormat::from_filename(filename)?;
    let size = bytes.len();

    let text = tokio::task::spawn_blocking(move || extract::extract_text(format, &bytes))
        .await
        .map_err(|e| ImportError::Unreadable(format!("text extraction failed: {e}")))??;
    debug!(format = format.as_str(), size, chars = text.len(), "text extracted");

    let document = parser::parse_cv(&text);
    if is_blank(&document) {
        return Err(ImportError::Empty);
    }

    info!(
        format = format.as_str(),
        experience = document.experience.len(),
        education = document.education.len(),
        "CV imported"
    );
    Ok(document)
}

fn is_blank(document: &CVDocument) -> bool {
    let personal = &document.personal;
    personal.full_name.is_empty()
        && personal.email.is_empty()
        && personal.phone.is_empty()
        && personal.linkedin_url.is_none()
        && personal.github_url.is_none()
        && document.summary.is_empty()
        && document.experience.is_empty()
        && document.education.is_empty()
        && document.skills.is_empty()
}
