use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::render::{DateLocale, TemplateId};

/// Application configuration loaded from environment variables.
/// Everything has a default; malformed values are startup errors.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Conversion service for pdf/docx. Unset means those formats are unavailable.
    pub export_service_url: Option<String>,
    pub export_timeout: Duration,
    pub export_max_bytes: usize,
    /// Snapshots kept per session; 0 keeps everything.
    pub history_limit: usize,
    pub default_template: TemplateId,
    pub date_locale: DateLocale,
    /// Sessions untouched for this long are dropped by the sweeper.
    pub session_ttl: Duration,
    /// How long a finished export job (and its artifact) stays downloadable.
    pub export_retention: Duration,
    pub import_max_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            export_service_url: None,
            export_timeout: Duration::from_secs(30),
            export_max_bytes: 5 * 1024 * 1024,
            history_limit: 100,
            default_template: TemplateId::Modern,
            date_locale: DateLocale::En,
            session_ttl: Duration::from_secs(2 * 60 * 60),
            export_retention: Duration::from_secs(15 * 60),
            import_max_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            port: parse_or(var("PORT"), defaults.port)
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or(defaults.rust_log),
            export_service_url: var("EXPORT_SERVICE_URL"),
            export_timeout: Duration::from_secs(
                parse_or(var("EXPORT_TIMEOUT_SECS"), defaults.export_timeout.as_secs())
                    .context("EXPORT_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            export_max_bytes: parse_or(var("EXPORT_MAX_BYTES"), defaults.export_max_bytes)
                .context("EXPORT_MAX_BYTES must be a byte count")?,
            history_limit: parse_or(var("HISTORY_LIMIT"), defaults.history_limit)
                .context("HISTORY_LIMIT must be a non-negative integer")?,
            default_template: parse_or(var("DEFAULT_TEMPLATE"), defaults.default_template)
                .context("DEFAULT_TEMPLATE is not a known template")?,
            date_locale: parse_or(var("DATE_LOCALE"), defaults.date_locale)
                .context("DATE_LOCALE must be one of en, de, fr, es")?,
            session_ttl: Duration::from_secs(
                parse_or(var("SESSION_TTL_SECS"), defaults.session_ttl.as_secs())
                    .context("SESSION_TTL_SECS must be a whole number of seconds")?,
            ),
            export_retention: Duration::from_secs(
                parse_or(var("EXPORT_RETENTION_SECS"), defaults.export_retention.as_secs())
                    .context("EXPORT_RETENTION_SECS must be a whole number of seconds")?,
            ),
            import_max_bytes: parse_or(var("IMPORT_MAX_BYTES"), defaults.import_max_bytes)
                .context("IMPORT_MAX_BYTES must be a byte count")?,
        })
    }
}

fn parse_or<T>(raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("invalid value '{raw}': {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.export_max_bytes, 5_242_880);
        assert_eq!(config.export_timeout, Duration::from_secs(30));
        assert_eq!(config.history_limit, 100);
        assert_eq!(config.default_template, TemplateId::Modern);
        assert!(config.export_service_url.is_none());
        assert_eq!(config.session_ttl, Duration::from_secs(7200));
        assert_eq!(config.export_retention, Duration::from_secs(900));
        assert_eq!(config.import_max_bytes, 10_485_760);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("EXPORT_SERVICE_URL", "http://converter:8000/convert"),
            ("HISTORY_LIMIT", "0"),
            ("DEFAULT_TEMPLATE", "Executive"),
            ("DATE_LOCALE", "de"),
            ("SESSION_TTL_SECS", "60"),
            ("EXPORT_RETENTION_SECS", "30"),
            ("IMPORT_MAX_BYTES", "1024"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.export_service_url.as_deref(),
            Some("http://converter:8000/convert")
        );
        assert_eq!(config.history_limit, 0);
        assert_eq!(config.default_template, TemplateId::Executive);
        assert_eq!(config.date_locale, DateLocale::De);
        assert_eq!(config.session_ttl, Duration::from_secs(60));
        assert_eq!(config.export_retention, Duration::from_secs(30));
        assert_eq!(config.import_max_bytes, 1024);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert!(config_from(&[("DEFAULT_TEMPLATE", "fancy")]).is_err());
        assert!(config_from(&[("EXPORT_MAX_BYTES", "-1")]).is_err());
        let err = config_from(&[("SESSION_TTL_SECS", "2h")]).unwrap_err();
        assert!(err.to_string().contains("SESSION_TTL_SECS"));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("EXPORT_SERVICE_URL", "  "), ("PORT", "")]).unwrap();
        assert!(config.export_service_url.is_none());
        assert_eq!(config.port, 8080);
    }
}
