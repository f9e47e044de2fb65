//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WIND_BACKEND_URL` - Base URL of the storefront backend
//!
//! ## Optional
//! - `WIND_STATE_DIR` - Directory for persisted client state (default: .wind)
//! - `WIND_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)
//! - `PAYPAL_CLIENT_ID` - Payment button client id
//! - `PAYPAL_CURRENCY` - Payment button currency (default: USD)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Environment name reported to Sentry

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::error::CheckoutError;

const DEFAULT_STATE_DIR: &str = ".wind";
const DEFAULT_TIMEOUT_SECS: &str = "30";
const DEFAULT_CURRENCY: &str = "USD";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Backend base URL, always ending in `/`
    pub backend_url: Url,
    /// Directory backing the persisted client store
    pub state_dir: PathBuf,
    /// Timeout applied to every backend request
    pub http_timeout: Duration,
    /// Payment button configuration
    pub payment: PaymentConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Environment name reported to Sentry
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("backend_url", &self.backend_url.as_str())
            .field("state_dir", &self.state_dir)
            .field("http_timeout", &self.http_timeout)
            .field("payment", &self.payment)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

/// Payment button configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfig {
    /// Provider client id; checkout cannot render the button without it
    pub client_id: Option<String>,
    /// ISO 4217 currency code
    pub currency: String,
}

impl PaymentConfig {
    /// The client id, unless it is missing or blank.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::PaymentNotConfigured` without a usable id.
    pub fn require_client_id(&self) -> Result<&str, CheckoutError> {
        self.client_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(CheckoutError::PaymentNotConfigured)
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            currency: DEFAULT_CURRENCY.to_string(),
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

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup("WIND_BACKEND_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("WIND_BACKEND_URL".to_string()))?;
        let backend_url = parse_base_url(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("WIND_BACKEND_URL".to_string(), e))?;

        let state_dir = PathBuf::from(
            lookup("WIND_STATE_DIR").unwrap_or_else(|| DEFAULT_STATE_DIR.to_string()),
        );

        let timeout_secs = lookup("WIND_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("WIND_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let payment = PaymentConfig {
            client_id: lookup("PAYPAL_CLIENT_ID").filter(|value| !value.is_empty()),
            currency: lookup("PAYPAL_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        };

        Ok(Self {
            backend_url,
            state_dir,
            http_timeout: Duration::from_secs(timeout_secs),
            payment,
            sentry_dsn: lookup("SENTRY_DSN").filter(|value| !value.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for a backend at `backend_url` with defaults elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL is not absolute.
    pub fn for_backend(backend_url: &str, state_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let state_dir = state_dir.into();
        Self::from_lookup(|key| match key {
            "WIND_BACKEND_URL" => Some(backend_url.to_string()),
            "WIND_STATE_DIR" => Some(state_dir.display().to_string()),
            _ => None,
        })
    }
}

/// Parse the backend base URL and make sure relative joins keep its path.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err("must be an absolute http(s) URL".to_string());
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_backend_url() {
        let result = StorefrontConfig::from_lookup(lookup(&[]));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingEnvVar("WIND_BACKEND_URL".to_string())
        );
    }

    #[test]
    fn test_invalid_backend_url() {
        let result = StorefrontConfig::from_lookup(lookup(&[("WIND_BACKEND_URL", "not a url")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_defaults() {
        let config =
            StorefrontConfig::from_lookup(lookup(&[("WIND_BACKEND_URL", "http://localhost:9000")]))
                .unwrap();
        assert_eq!(config.backend_url.as_str(), "http://localhost:9000/");
        assert_eq!(config.state_dir, PathBuf::from(".wind"));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.payment, PaymentConfig::default());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_base_path_is_preserved_for_joins() {
        let config = StorefrontConfig::from_lookup(lookup(&[(
            "WIND_BACKEND_URL",
            "https://shop.example/backend",
        )]))
        .unwrap();
        let joined = config.backend_url.join("api/cart").unwrap();
        assert_eq!(joined.as_str(), "https://shop.example/backend/api/cart");
    }

    #[test]
    fn test_optional_values() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("WIND_BACKEND_URL", "http://localhost:9000"),
            ("WIND_STATE_DIR", "/tmp/wind"),
            ("WIND_HTTP_TIMEOUT_SECS", "5"),
            ("PAYPAL_CLIENT_ID", "sb-client"),
            ("PAYPAL_CURRENCY", "EUR"),
        ]))
        .unwrap();
        assert_eq!(config.state_dir, PathBuf::from("/tmp/wind"));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.payment.client_id.as_deref(), Some("sb-client"));
        assert_eq!(config.payment.currency, "EUR");
    }

    #[test]
    fn test_invalid_timeout() {
        let result = StorefrontConfig::from_lookup(lookup(&[
            ("WIND_BACKEND_URL", "http://localhost:9000"),
            ("WIND_HTTP_TIMEOUT_SECS", "soon"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "WIND_HTTP_TIMEOUT_SECS"));
    }

    #[test]
    fn test_debug_redacts_sentry_dsn() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("WIND_BACKEND_URL", "http://localhost:9000"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
        ]))
        .unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("key@sentry.example"));
    }
}
