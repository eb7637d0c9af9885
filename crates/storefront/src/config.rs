//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PAPERCLIP_API_URL` - Base URL of the storefront REST API
//!
//! ## Optional
//! - `PAPERCLIP_DATA_DIR` - Local storage directory (default: `.paperclip`)
//! - `PAPERCLIP_HTTP_TIMEOUT_SECS` - Request timeout (default: 30)
//! - `PAPERCLIP_CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `PAPERCLIP_CURRENCY` - Display currency (default: USD)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)

use std::path::PathBuf;
use std::time::Duration;

use paperclip_core::CurrencyCode;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the REST API (always ends with `/`)
    pub api_url: Url,
    /// Directory backing local storage
    pub data_dir: PathBuf,
    /// Per-request timeout
    pub http_timeout: Duration,
    /// How long catalog pages and product details stay cached
    pub catalog_cache_ttl: Duration,
    /// Currency used when printing prices
    pub currency: CurrencyCode,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Sentry settings. Error tracking is off when `dsn` is unset.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required values are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup("PAPERCLIP_API_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("PAPERCLIP_API_URL".to_string()))?;
        let api_url = parse_api_url(&raw_url)?;

        let data_dir = PathBuf::from(
            lookup("PAPERCLIP_DATA_DIR").unwrap_or_else(|| ".paperclip".to_string()),
        );
        let http_timeout = Duration::from_secs(parse_or_default(
            &lookup,
            "PAPERCLIP_HTTP_TIMEOUT_SECS",
            30u64,
        )?);
        let catalog_cache_ttl = Duration::from_secs(parse_or_default(
            &lookup,
            "PAPERCLIP_CATALOG_CACHE_TTL_SECS",
            300u64,
        )?);
        let currency = match lookup("PAPERCLIP_CURRENCY") {
            Some(raw) => raw
                .parse::<CurrencyCode>()
                .map_err(|e| ConfigError::InvalidEnvVar("PAPERCLIP_CURRENCY".to_string(), e))?,
            None => CurrencyCode::default(),
        };

        let sample_rate = parse_or_default(&lookup, "SENTRY_SAMPLE_RATE", 1.0f32)?;
        if !(0.0..=1.0).contains(&sample_rate) {
            return Err(ConfigError::InvalidEnvVar(
                "SENTRY_SAMPLE_RATE".to_string(),
                "must be between 0.0 and 1.0".to_string(),
            ));
        }
        let sentry = SentryConfig {
            dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            environment: lookup("SENTRY_ENVIRONMENT"),
            sample_rate,
        };

        Ok(Self {
            api_url,
            data_dir,
            http_timeout,
            catalog_cache_ttl,
            currency,
            sentry,
        })
    }

    /// Configuration pointing at `api_url` with every other value defaulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL is not an absolute http(s) URL.
    pub fn for_api(api_url: &str, data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            data_dir: data_dir.into(),
            http_timeout: Duration::from_secs(30),
            catalog_cache_ttl: Duration::from_secs(300),
            currency: CurrencyCode::default(),
            sentry: SentryConfig::default(),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API base URL, forcing a trailing slash so `Url::join` keeps the
/// path prefix (e.g. `/api/`).
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("PAPERCLIP_API_URL".to_string(), msg);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme: {}", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("URL must have a host".to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse an optional value, falling back to `default` when unset.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_api_url() {
        let err = StorefrontConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "PAPERCLIP_API_URL"));
    }

    #[test]
    fn test_defaults() {
        let config =
            StorefrontConfig::from_lookup(lookup_from(&[("PAPERCLIP_API_URL", "http://localhost:5000/api")]))
                .unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:5000/api/");
        assert_eq!(config.data_dir, PathBuf::from(".paperclip"));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.currency, CurrencyCode::USD);
        assert!(config.sentry.dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[
            ("PAPERCLIP_API_URL", "https://shop.example.com/api/"),
            ("PAPERCLIP_DATA_DIR", "/tmp/pc"),
            ("PAPERCLIP_HTTP_TIMEOUT_SECS", "5"),
            ("PAPERCLIP_CURRENCY", "eur"),
            ("SENTRY_DSN", ""),
        ]))
        .unwrap();
        assert_eq!(config.api_url.as_str(), "https://shop.example.com/api/");
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.currency, CurrencyCode::EUR);
        assert!(config.sentry.dsn.is_none());
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = StorefrontConfig::from_lookup(lookup_from(&[("PAPERCLIP_API_URL", "ftp://x.example")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_rejects_bad_timeout() {
        let err = StorefrontConfig::from_lookup(lookup_from(&[
            ("PAPERCLIP_API_URL", "http://localhost"),
            ("PAPERCLIP_HTTP_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "PAPERCLIP_HTTP_TIMEOUT_SECS"));
    }

    #[test]
    fn test_rejects_sample_rate_out_of_range() {
        let err = StorefrontConfig::from_lookup(lookup_from(&[
            ("PAPERCLIP_API_URL", "http://localhost"),
            ("SENTRY_SAMPLE_RATE", "1.5"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }
}
