//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PLATEFUL_API_URL` - Base URL of the ordering backend
//!
//! ## Optional
//! - `PLATEFUL_API_TOKEN` - Bearer token sent with every backend request
//! - `PLATEFUL_DATA_DIR` - Directory for locally persisted state (default: .plateful)
//! - `PLATEFUL_HTTP_TIMEOUT_SECS` - Request timeout (default: 10)
//! - `PLATEFUL_MENU_CACHE_TTL_SECS` - Menu cache lifetime (default: 300)
//! - `PLATEFUL_CURRENCY` - Display currency (default: USD)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use plateful_core::CurrencyCode;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend API configuration
    pub api: ApiConfig,
    /// Directory holding the persisted key-value entries
    pub data_dir: PathBuf,
    /// Currency used when displaying prices
    pub currency: CurrencyCode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Backend API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto
    pub base_url: Url,
    /// Bearer token, if the backend requires one
    pub token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long menu responses stay cached
    pub menu_cache_ttl: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("menu_cache_ttl", &self.menu_cache_ttl)
            .finish()
    }
}

impl ApiConfig {
    /// Configuration for `base_url` with default timeout and cache TTL and no token.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            timeout: Duration::from_secs(10),
            menu_cache_ttl: Duration::from_secs(300),
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
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the API token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        let base_url = vars.required("PLATEFUL_API_URL")?;
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("PLATEFUL_API_URL".to_string(), e.to_string())
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "PLATEFUL_API_URL".to_string(),
                format!("unsupported scheme '{}'", base_url.scheme()),
            ));
        }

        let token = vars
            .optional("PLATEFUL_API_TOKEN")
            .map(|value| {
                validate_token(&value, "PLATEFUL_API_TOKEN")?;
                Ok::<_, ConfigError>(SecretString::from(value))
            })
            .transpose()?;

        let timeout = Duration::from_secs(vars.parsed_or("PLATEFUL_HTTP_TIMEOUT_SECS", 10)?);
        let menu_cache_ttl =
            Duration::from_secs(vars.parsed_or("PLATEFUL_MENU_CACHE_TTL_SECS", 300)?);
        let currency = vars.parsed_or("PLATEFUL_CURRENCY", CurrencyCode::USD)?;
        let data_dir = PathBuf::from(vars.or_default("PLATEFUL_DATA_DIR", ".plateful"));

        Ok(Self {
            api: ApiConfig {
                base_url,
                token,
                timeout,
                menu_cache_ttl,
            },
            data_dir,
            currency,
            sentry_dsn: vars.optional("SENTRY_DSN"),
            sentry_environment: vars.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Vars<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    /// Get an optional variable; empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

/// Reject tokens that are obviously copied from a template.
fn validate_token(token: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = token.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(**p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }
    Ok(())
}

/// Expose the token for an `Authorization` header.
pub(crate) fn bearer(token: &SecretString) -> String {
    format!("Bearer {}", token.expose_secret())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("PLATEFUL_API_URL", "http://localhost:4000/api/")]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:4000/api/");
        assert!(config.api.token.is_none());
        assert_eq!(config.api.timeout, Duration::from_secs(10));
        assert_eq!(config.api.menu_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.data_dir, PathBuf::from(".plateful"));
        assert_eq!(config.currency, CurrencyCode::USD);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_api_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "PLATEFUL_API_URL"));
    }

    #[test]
    fn test_invalid_api_url() {
        assert!(matches!(
            load(&[("PLATEFUL_API_URL", "not a url")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&[("PLATEFUL_API_URL", "ftp://menu.local")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PLATEFUL_API_URL", "https://api.plateful.test"),
            ("PLATEFUL_API_TOKEN", "k9Fq2LmZ81vXw0pR"),
            ("PLATEFUL_DATA_DIR", "/var/lib/plateful"),
            ("PLATEFUL_HTTP_TIMEOUT_SECS", "3"),
            ("PLATEFUL_MENU_CACHE_TTL_SECS", "0"),
            ("PLATEFUL_CURRENCY", "eur"),
        ])
        .unwrap();
        assert!(config.api.token.is_some());
        assert_eq!(config.api.timeout, Duration::from_secs(3));
        assert_eq!(config.api.menu_cache_ttl, Duration::ZERO);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/plateful"));
        assert_eq!(config.currency, CurrencyCode::EUR);
    }

    #[test]
    fn test_bad_number() {
        let err = load(&[
            ("PLATEFUL_API_URL", "https://api.plateful.test"),
            ("PLATEFUL_HTTP_TIMEOUT_SECS", "ten"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "PLATEFUL_HTTP_TIMEOUT_SECS"));
    }

    #[test]
    fn test_placeholder_token_rejected() {
        let err = load(&[
            ("PLATEFUL_API_URL", "https://api.plateful.test"),
            ("PLATEFUL_API_TOKEN", "your-token-here"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = load(&[
            ("PLATEFUL_API_URL", "https://api.plateful.test"),
            ("PLATEFUL_API_TOKEN", "k9Fq2LmZ81vXw0pR"),
        ])
        .unwrap();
        let debug = format!("{:?}", config.api);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("k9Fq2LmZ81vXw0pR"));
    }
}
