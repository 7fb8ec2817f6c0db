//! HTTP client for the external document conversion service (pdf, docx).
//!
//! Retries on connection errors, 429 and 5xx with exponential backoff. A 4xx other
//! than 429 is the service refusing the document and is reported as `Rejected`
//! without retrying.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::export::{ConversionBackend, ConversionRequest, ConvertedFile, ExportError};

const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_millis(500);

/// JSON response shape: the converted file as base64 plus optional metadata.
#[derive(Debug, Deserialize)]
struct ConversionResponse {
    file_base64: String,
    filename: Option<String>,
    content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(alias = "detail", alias = "message")]
    error: String,
}

#[derive(Clone)]
pub struct HttpConversionBackend {
    client: Client,
    endpoint: String,
    backoff: Duration,
}

impl HttpConversionBackend {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: endpoint.into(),
            backoff: BASE_BACKOFF,
        })
    }

    /// Overrides the first retry delay; later retries double it.
    #[cfg(test)]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    async fn read_success(response: reqwest::Response) -> Result<ConvertedFile, ExportError> {
        let headers = response.headers().clone();
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| ExportError::Transport(format!("failed to read response body: {e}")))?;

        let is_json = content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("application/json"));
        if is_json {
            let parsed: ConversionResponse = serde_json::from_slice(&body).map_err(|e| {
                ExportError::Transport(format!("malformed conversion response: {e}"))
            })?;
            let bytes = STANDARD.decode(parsed.file_base64.trim()).map_err(|e| {
                ExportError::Transport(format!("conversion response is not valid base64: {e}"))
            })?;
            return Ok(ConvertedFile {
                bytes,
                filename: parsed.filename,
                content_type: parsed.content_type,
            });
        }

        let filename = headers
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_filename);
        Ok(ConvertedFile {
            bytes: body.to_vec(),
            filename,
            content_type,
        })
    }
}

#[async_trait]
impl ConversionBackend for HttpConversionBackend {
    async fn convert(&self, request: &ConversionRequest) -> Result<ConvertedFile, ExportError> {
        let mut last_error: Option<ExportError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = self.backoff * (1 << (attempt - 1));
                warn!(
                    "conversion attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(&self.endpoint).json(request).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(ExportError::Transport(e.to_string()));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("conversion service returned {}: {}", status, body);
                last_error = Some(ExportError::Transport(format!(
                    "conversion service returned {status}"
                )));
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ServiceError>(&body)
                    .map(|e| e.error)
                    .unwrap_or(body);
                return Err(ExportError::Rejected {
                    status: status.as_u16(),
                    message,
                });
            }

            debug!(format = %request.format, attempt, "conversion succeeded");
            return Self::read_success(response).await;
        }

        Err(last_error.unwrap_or_else(|| {
            ExportError::Transport(format!("gave up after {MAX_RETRIES} attempts"))
        }))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Extracts `filename` from a `Content-Disposition` header value.
fn disposition_filename(value: &str) -> Option<String> {
    value.split(';').map(str::trim).find_map(|part| {
        let (key, raw) = part.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let name = raw.trim().trim_matches('"');
        // Never let the service choose a path.
        let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
        (!name.is_empty()).then(|| name.to_string())
    })
}
