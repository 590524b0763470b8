//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `COMMERCE_API_URL` - GraphQL endpoint of the commerce API
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_PRICE_TYPE` - Price display mode, `gross` or `net` (default: gross)
//! - `COMMERCE_API_TOKEN` - App token sent with server-side API calls
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use tillpoint_core::PriceType;

/// Shortest app token the commerce API issues.
const MIN_APP_TOKEN_LEN: usize = 20;

/// Generated app tokens sit well above this; hand-typed values fall below.
const MIN_APP_TOKEN_ENTROPY: f64 = 3.3;

/// Values left over from `.env.example` files and setup guides.
const APP_TOKEN_PLACEHOLDERS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "app-token",
    "dummy",
    "xxx",
    "todo",
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Whether checkout lines show gross or net prices
    pub price_type: PriceType,
    /// Commerce API configuration
    pub commerce: CommerceApiConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g., production, staging)
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Commerce GraphQL API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct CommerceApiConfig {
    /// GraphQL endpoint URL
    pub api_url: Url,
    /// App token for server-side calls (customer calls use their own token)
    pub app_token: Option<SecretString>,
}

impl std::fmt::Debug for CommerceApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommerceApiConfig")
            .field("api_url", &self.api_url.as_str())
            .field(
                "app_token",
                &self.app_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let price_type = get_env_or_default("STOREFRONT_PRICE_TYPE", "gross")
            .parse::<PriceType>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_PRICE_TYPE".to_string(), e))?;

        let commerce = CommerceApiConfig::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            price_type,
            commerce,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl CommerceApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_url = parse_api_url(&get_required_env("COMMERCE_API_URL")?)?;
        let app_token = get_optional_env("COMMERCE_API_TOKEN")
            .map(parse_app_token)
            .transpose()?;

        Ok(Self { api_url, app_token })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a sample rate in `[0.0, 1.0]`.
fn get_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

/// Parse and validate the commerce API endpoint.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("COMMERCE_API_URL".to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "COMMERCE_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Bits per character of `s`, over its character frequencies.
fn bits_per_char(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
    }
    let total: u32 = counts.values().sum();
    if total == 0 {
        return 0.0;
    }

    counts
        .values()
        .map(|&count| {
            let p = f64::from(count) / f64::from(total);
            -p * p.log2()
        })
        .sum()
}

/// Check `COMMERCE_API_TOKEN` looks like a token the commerce API generated.
fn parse_app_token(token: String) -> Result<SecretString, ConfigError> {
    let insecure =
        |reason: String| ConfigError::InsecureSecret("COMMERCE_API_TOKEN".to_string(), reason);

    let lower = token.to_lowercase();
    if let Some(pattern) = APP_TOKEN_PLACEHOLDERS
        .iter()
        .find(|pattern| lower.contains(*pattern))
    {
        return Err(insecure(format!(
            "appears to be a placeholder (contains '{pattern}')"
        )));
    }

    let len = token.chars().count();
    if len < MIN_APP_TOKEN_LEN {
        return Err(insecure(format!(
            "too short ({len} chars, app tokens have at least {MIN_APP_TOKEN_LEN})"
        )));
    }

    let entropy = bits_per_char(&token);
    if entropy < MIN_APP_TOKEN_ENTROPY {
        return Err(insecure(format!(
            "entropy too low ({entropy:.2} bits/char, need >= {MIN_APP_TOKEN_ENTROPY:.1})"
        )));
    }

    Ok(SecretString::from(token))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            price_type: PriceType::Gross,
            commerce: CommerceApiConfig {
                api_url: Url::parse("https://api.tillpoint.test/graphql/").unwrap(),
                app_token: None,
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_bits_per_char() {
        assert!(bits_per_char("").abs() < f64::EPSILON);
        // Two equally frequent characters carry one bit each
        assert!((bits_per_char("abab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_app_token_placeholder_rejected() {
        let err = parse_app_token("your-commerce-app-token-here".to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(var, _) if var == "COMMERCE_API_TOKEN"));
    }

    #[test]
    fn test_app_token_too_short() {
        let err = parse_app_token("k3J9xQ2m".to_string()).unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn test_app_token_low_entropy() {
        let err = parse_app_token("ababababababababababababab".to_string()).unwrap_err();
        assert!(err.to_string().contains("entropy too low"));
    }

    #[test]
    fn test_app_token_generated_value_accepted() {
        let token = parse_app_token("Qm7vR2kX9pLz4TnB8wYc1HdJ6sFg".to_string()).unwrap();
        assert_eq!(token.expose_secret(), "Qm7vR2kX9pLz4TnB8wYc1HdJ6sFg");
    }

    #[test]
    fn test_parse_api_url() {
        assert!(parse_api_url("https://api.tillpoint.test/graphql/").is_ok());
        assert!(matches!(
            parse_api_url("ftp://api.tillpoint.test/graphql/"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(parse_api_url("not a url").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure() {
        let mut config = config();
        assert!(!config.is_secure());
        config.base_url = "https://shop.tillpoint.test".to_string();
        assert!(config.is_secure());
    }

    #[test]
    fn test_commerce_config_debug_redacts_token() {
        let commerce = CommerceApiConfig {
            api_url: Url::parse("https://api.tillpoint.test/graphql/").unwrap(),
            app_token: Some(SecretString::from("super_secret_app_token")),
        };

        let debug_output = format!("{commerce:?}");

        assert!(debug_output.contains("api.tillpoint.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_app_token"));
    }
}
