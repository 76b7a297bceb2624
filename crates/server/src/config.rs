//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PAYGATE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `PAYGATE_BASE_URL` - Public URL of the site (checkout redirects and CORS origin)
//! - `PAYGATE_JWT_SECRET` - Auth provider JWT signing secret (HS256)
//! - `STRIPE_SECRET_KEY` - Stripe secret API key
//! - `STRIPE_PRICE_ID` - Stripe price for the monthly subscription
//!
//! ## Optional
//! - `PAYGATE_HOST` - Bind address (default: 127.0.0.1)
//! - `PAYGATE_PORT` - Listen port (default: 3000)
//! - `PAYGATE_JWT_AUDIENCE` - Expected `aud` claim (default: authenticated)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
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

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the site
    pub base_url: Url,
    /// Session token verification settings
    pub session: SessionConfig,
    /// Stripe API configuration
    pub stripe: StripeConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Settings for verifying auth-provider session tokens.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HS256 signing secret shared with the auth provider
    pub jwt_secret: SecretString,
    /// Expected audience claim
    pub audience: String,
}

/// Stripe API configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (server-side only)
    pub secret_key: SecretString,
    /// Price id of the monthly subscription
    pub price_id: String,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .field("price_id", &self.price_id)
            .finish()
    }
}

impl ServerConfig {
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

        let database_url = get_database_url("PAYGATE_DATABASE_URL")?;
        let host = get_env_or_default("PAYGATE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PAYGATE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PAYGATE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PAYGATE_PORT".to_string(), e.to_string()))?;
        let base_url = get_url("PAYGATE_BASE_URL")?;

        let session = SessionConfig::from_env()?;
        let stripe = StripeConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session,
            stripe,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Load only the database URL, for tools that need nothing else.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if neither variable is set.
    pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
        let _ = dotenvy::dotenv();
        get_database_url("PAYGATE_DATABASE_URL")
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Where the processor sends the customer after a successful payment.
    #[must_use]
    pub fn checkout_success_url(&self) -> String {
        format!(
            "{}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}",
            self.base_url.as_str().trim_end_matches('/')
        )
    }

    /// Where the processor sends the customer after abandoning payment.
    #[must_use]
    pub fn checkout_cancel_url(&self) -> String {
        format!("{}/checkout", self.base_url.as_str().trim_end_matches('/'))
    }

    /// Origin allowed to call the API from a browser.
    #[must_use]
    pub fn allowed_origin(&self) -> String {
        self.base_url.origin().ascii_serialization()
    }
}

impl SessionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = get_validated_secret("PAYGATE_JWT_SECRET")?;
        validate_min_length(&jwt_secret, "PAYGATE_JWT_SECRET", MIN_JWT_SECRET_LENGTH)?;
        Ok(Self {
            jwt_secret,
            audience: get_env_or_default("PAYGATE_JWT_AUDIENCE", "authenticated"),
        })
    }
}

impl StripeConfig {
    /// Load only the Stripe settings, for tools that need nothing else.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the key or price is missing, or the key
    /// fails secret validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Ok(Self {
            secret_key: get_validated_secret("STRIPE_SECRET_KEY")?,
            price_id: get_required_env("STRIPE_PRICE_ID")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get and parse a required URL.
fn get_url(key: &str) -> Result<Url, ConfigError> {
    let raw = get_required_env(key)?;
    Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a secret meets a minimum length.
fn validate_min_length(
    secret: &SecretString,
    var_name: &str,
    min: usize,
) -> Result<(), ConfigError> {
    use secrecy::ExposeSecret;

    let len = secret.expose_secret().len();
    if len < min {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("must be at least {min} characters (got {len})"),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
impl ServerConfig {
    /// Configuration for router tests; nothing here is dialed.
    #[allow(clippy::unwrap_used)]
    pub(crate) fn test_config() -> Self {
        Self {
            database_url: SecretString::from("postgres://localhost/paygate_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: Url::parse("https://paygate.test").unwrap(),
            session: SessionConfig {
                jwt_secret: SecretString::from("q7Vx!9mK2@nL5#pR8$tW3^zB6&cF1*hJ"),
                audience: "authenticated".to_string(),
            },
            stripe: StripeConfig {
                secret_key: SecretString::from("sk_test_4eC39HqLyjWDarjtT1zdp7dc"),
                price_id: "price_monthly".to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-stripe-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_min_length() {
        let short = SecretString::from("short");
        assert!(validate_min_length(&short, "TEST", MIN_JWT_SECRET_LENGTH).is_err());
        let long = SecretString::from("a".repeat(32));
        assert!(validate_min_length(&long, "TEST", MIN_JWT_SECRET_LENGTH).is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig::test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_checkout_urls() {
        let config = ServerConfig::test_config();
        assert_eq!(
            config.checkout_success_url(),
            "https://paygate.test/checkout/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(config.checkout_cancel_url(), "https://paygate.test/checkout");
        assert_eq!(config.allowed_origin(), "https://paygate.test");
    }

    #[test]
    fn test_stripe_config_debug_redacts_secret() {
        let config = ServerConfig::test_config();
        let debug_output = format!("{:?}", config.stripe);
        assert!(debug_output.contains("price_monthly"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("sk_test_"));
    }
}
