//! Session identity from auth-provider access tokens.
//!
//! The auth provider signs access tokens with HS256 and puts the user's UUID
//! in `sub`. We verify the signature, expiry and audience and read nothing
//! else beyond the optional email.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use paygate_core::UserId;

use crate::config::SessionConfig;

/// Claims read from an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the auth-provider user id.
    pub sub: String,
    /// Expiry, seconds since the epoch.
    pub exp: u64,
    pub aud: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// The verified caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub email: Option<String>,
}

/// Errors that can occur while verifying an access token.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid access token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("subject is not a user id: {0}")]
    InvalidSubject(String),
}

/// Verifies access tokens against the shared signing secret.
#[derive(Clone)]
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[config.audience.as_str()]);

        Self {
            key: DecodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
            validation,
        }
    }

    /// Verify `token` and return the session it identifies.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Jwt` for bad signatures, expired tokens and
    /// wrong audiences, and `SessionError::InvalidSubject` when `sub` is not
    /// a UUID.
    pub fn verify(&self, token: &str) -> Result<Session, SessionError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        let user_id = UserId::parse(&data.claims.sub)
            .map_err(|_| SessionError::InvalidSubject(data.claims.sub.clone()))?;

        Ok(Session {
            user_id,
            email: data.claims.email,
        })
    }
}
