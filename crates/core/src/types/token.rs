//! One-time checkout tokens.
//!
//! A token is issued elsewhere and lets a user reach checkout from a link
//! without signing in first. It is consumed exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CheckoutError;
use crate::types::id::UserId;

/// A single-use checkout token record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct AuthToken {
    /// The opaque token value carried in the checkout link.
    pub token: String,
    /// Owner of the token.
    pub user_id: UserId,
    /// Set once the token has been consumed.
    pub used: bool,
    /// Instant after which the token is no longer accepted.
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    /// Whether the token is past its expiry at `now`.
    ///
    /// A token expiring exactly at `now` is still accepted.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Check that the token can be consumed at `now`.
    ///
    /// Expiry is checked before `used`, so an expired token reports
    /// [`CheckoutError::TokenExpired`] whether or not it was consumed.
    ///
    /// # Errors
    ///
    /// Returns `TokenExpired` or `TokenUsed`.
    pub fn check(&self, now: DateTime<Utc>) -> Result<(), CheckoutError> {
        if self.is_expired(now) {
            return Err(CheckoutError::TokenExpired);
        }
        if self.used {
            return Err(CheckoutError::TokenUsed);
        }
        Ok(())
    }

    /// Whether this token belongs to `user_id`.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

/// Validate a looked-up token record.
///
/// # Errors
///
/// Returns `InvalidToken` when no record was found, otherwise the result of
/// [`AuthToken::check`].
pub fn validate_token(
    record: Option<&AuthToken>,
    now: DateTime<Utc>,
) -> Result<&AuthToken, CheckoutError> {
    let token = record.ok_or(CheckoutError::InvalidToken)?;
    token.check(now)?;
    Ok(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn token(used: bool, expires_in: Duration) -> AuthToken {
        AuthToken {
            token: "tok_abc".to_string(),
            user_id: UserId::new(uuid::Uuid::nil()),
            used,
            expires_at: Utc::now() + expires_in,
        }
    }

    #[test]
    fn test_fresh_token_is_valid() {
        let t = token(false, Duration::hours(1));
        assert!(t.check(Utc::now()).is_ok());
    }

    #[test]
    fn test_expired_wins_over_used() {
        let now = Utc::now();
        for used in [false, true] {
            let t = token(used, Duration::minutes(-5));
            assert_eq!(t.check(now), Err(CheckoutError::TokenExpired));
        }
    }

    #[test]
    fn test_used_token_rejected() {
        let t = token(true, Duration::hours(1));
        assert_eq!(t.check(Utc::now()), Err(CheckoutError::TokenUsed));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let t = token(false, Duration::zero());
        assert!(t.check(t.expires_at).is_ok());
        assert_eq!(
            t.check(t.expires_at + Duration::milliseconds(1)),
            Err(CheckoutError::TokenExpired)
        );
    }

    #[test]
    fn test_missing_record_is_invalid() {
        assert_eq!(
            validate_token(None, Utc::now()),
            Err(CheckoutError::InvalidToken)
        );
    }

    #[test]
    fn test_validate_returns_record() {
        let t = token(false, Duration::hours(1));
        let validated = validate_token(Some(&t), Utc::now()).unwrap();
        assert_eq!(validated.token, "tok_abc");
    }

    #[test]
    fn test_ownership() {
        let t = token(false, Duration::hours(1));
        assert!(t.is_owned_by(UserId::new(uuid::Uuid::nil())));
        assert!(!t.is_owned_by(UserId::new(uuid::Uuid::new_v4())));
    }
}
