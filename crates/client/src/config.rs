//! Where the controller sends its requests.

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// How long any single backend call may take.
pub const TIMEOUT_DURATION: Duration = Duration::from_secs(60);

const DEVELOPMENT_BASE_URL: &str = "http://localhost:3000";
const PRODUCTION_BASE_URL: &str = "https://www.interviewcoder.co";

/// Errors that can occur when loading client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid URL in {0}: {1}")]
    InvalidUrl(String, url::ParseError),
}

/// Which deployment the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentMode {
    Development,
    #[default]
    Production,
}

impl DeploymentMode {
    /// Read `PAYGATE_ENV`. Only `development` selects development; anything
    /// else, including unset, is production.
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(std::env::var("PAYGATE_ENV").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("development") => Self::Development,
            _ => Self::Production,
        }
    }

    /// The API base URL for this mode.
    ///
    /// # Panics
    ///
    /// This function will not panic. Both base URLs are absolute constants.
    #[must_use]
    pub fn base_url(self) -> Url {
        let raw = match self {
            Self::Development => DEVELOPMENT_BASE_URL,
            Self::Production => PRODUCTION_BASE_URL,
        };
        Url::parse(raw).expect("constant base URL is absolute")
    }
}

/// Endpoints and credentials for the checkout backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server hosting the `/api/...` routes.
    pub base_url: Url,
    /// Hosted database REST endpoint, queried for token records.
    pub db_url: Url,
    /// Public (anon) key for the hosted database.
    pub anon_key: String,
    pub timeout: Duration,
}

impl ApiConfig {
    /// Configuration for `mode` with the database endpoint defaulting to the
    /// API host.
    #[must_use]
    pub fn for_mode(mode: DeploymentMode) -> Self {
        let base_url = mode.base_url();
        Self {
            db_url: base_url.clone(),
            base_url,
            anon_key: String::new(),
            timeout: TIMEOUT_DURATION,
        }
    }

    /// Point token lookups at the hosted database.
    #[must_use]
    pub fn with_database(mut self, db_url: Url, anon_key: impl Into<String>) -> Self {
        self.db_url = db_url;
        self.anon_key = anon_key.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from `PAYGATE_ENV`, `PAYGATE_DB_URL` and `PAYGATE_ANON_KEY`,
    /// reading a `.env` file first if one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the database variables are missing or the
    /// URL does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let db_url_raw = std::env::var("PAYGATE_DB_URL")
            .map_err(|_| ConfigError::MissingEnvVar("PAYGATE_DB_URL".to_string()))?;
        let db_url = Url::parse(&db_url_raw)
            .map_err(|e| ConfigError::InvalidUrl("PAYGATE_DB_URL".to_string(), e))?;
        let anon_key = std::env::var("PAYGATE_ANON_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("PAYGATE_ANON_KEY".to_string()))?;

        Ok(Self::for_mode(DeploymentMode::from_env()).with_database(db_url, anon_key))
    }

    /// Absolute URL of an API route such as `/api/stripe/validate-coupon`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be joined onto the base URL.
    pub fn route(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!(
            DeploymentMode::parse(Some("development")),
            DeploymentMode::Development
        );
        assert_eq!(
            DeploymentMode::parse(Some(" Development ")),
            DeploymentMode::Development
        );
        assert_eq!(
            DeploymentMode::parse(Some("production")),
            DeploymentMode::Production
        );
        assert_eq!(DeploymentMode::parse(Some("test")), DeploymentMode::Production);
        assert_eq!(DeploymentMode::parse(None), DeploymentMode::Production);
    }

    #[test]
    fn test_base_urls() {
        assert_eq!(
            DeploymentMode::Development.base_url().as_str(),
            "http://localhost:3000/"
        );
        assert_eq!(
            DeploymentMode::Production.base_url().as_str(),
            "https://www.interviewcoder.co/"
        );
    }

    #[test]
    fn test_for_mode_defaults() {
        let config = ApiConfig::for_mode(DeploymentMode::Development);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(
            config.route("/api/stripe/create-checkout").unwrap().as_str(),
            "http://localhost:3000/api/stripe/create-checkout"
        );
    }
}
