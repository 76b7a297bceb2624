//! Checkout error kinds shared by the server routes and the checkout controller.

use thiserror::Error;

/// Every way a checkout step can fail.
///
/// The `Display` strings are for logs. User-facing text comes from
/// [`CheckoutError::user_message`], which never includes internal detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// The caller has no session, or the session belongs to someone else.
    #[error("unauthorized")]
    Unauthorized,

    /// No token record matches the supplied value.
    #[error("invalid token")]
    InvalidToken,

    /// The token was already consumed.
    #[error("token has already been used")]
    TokenUsed,

    /// The token is past its expiry.
    #[error("token has expired")]
    TokenExpired,

    /// A looked-up record (coupon, subscription) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The payment processor or database failed.
    #[error("external service failure: {0}")]
    ExternalServiceFailure(String),

    /// The operation did not finish within the client timeout.
    #[error("operation timed out")]
    Timeout,
}

impl CheckoutError {
    /// Short message suitable for showing on the checkout page.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidToken => "Invalid checkout link. Please try again or contact support.",
            Self::TokenUsed => {
                "This checkout link has already been used. Please request a new one."
            }
            Self::TokenExpired => "This checkout link has expired. Please request a new one.",
            Self::Timeout => "Operation timed out after 1 minute. Please try again.",
            Self::Unauthorized
            | Self::NotFound(_)
            | Self::ExternalServiceFailure(_) => {
                "Something went wrong. Please try again or contact support."
            }
        }
    }
}
