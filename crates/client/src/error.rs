//! Client-side errors.

use paygate_core::CheckoutError;
use thiserror::Error;

/// Fallback when an API error carries no message.
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again or contact support.";

/// Errors that can occur while talking to the checkout backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The call did not finish within the configured timeout.
    #[error("Operation timed out after 1 minute. Please try again.")]
    Timeout,

    /// Transport failure: connection refused, TLS, malformed body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A route answered with a non-success status.
    #[error("API error: {status}")]
    Api {
        status: u16,
        /// The `error` field of the response body, if present.
        message: Option<String>,
    },

    /// A checkout rule rejected the request.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// A URL could not be built from configuration.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// Message to show on the checkout page for a failed link check.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Timeout => CheckoutError::Timeout.user_message(),
            Self::Checkout(err) => err.user_message(),
            Self::Http(_) | Self::Api { .. } | Self::Url(_) => GENERIC_MESSAGE,
        }
    }
}
