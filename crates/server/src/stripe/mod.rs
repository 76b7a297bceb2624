//! Payment processor integration.
//!
//! # Architecture
//!
//! - [`StripeClient`] wraps an `async-stripe` client
//! - Stripe is the source of truth for coupons and subscriptions - no local
//!   copy, no caching, every call is live
//! - The routes depend on the [`PaymentProcessor`] trait so tests can swap in
//!   a fake
//!
//! # Requests used
//!
//! - `RetrieveCoupon` - coupon lookup
//! - `CreateCheckoutSession` - hosted subscription checkout
//! - `UpdateSubscription { cancel_at_period_end }` - cancel at period end

mod client;
pub mod types;

pub use client::StripeClient;
pub use types::{CheckoutSession, CheckoutSessionRequest, StripeCoupon};

use async_trait::async_trait;
use thiserror::Error;

use paygate_core::CouponCode;

/// Errors that can occur when interacting with the Stripe API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Human-readable message from Stripe.
        message: String,
    },

    /// The requested object does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Stripe.
    #[error("Rate limited")]
    RateLimited,

    /// Transport, timeout or decoding failure.
    #[error("Request failed: {0}")]
    Request(String),

    /// Client could not be constructed from configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl StripeError {
    /// Classify an API error response by status.
    #[must_use]
    pub fn from_api(status: u16, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| "Payment processing error".to_string());
        match status {
            404 => Self::NotFound(message),
            429 => Self::RateLimited,
            _ => Self::Api { status, message },
        }
    }
}

impl From<stripe::StripeError> for StripeError {
    fn from(err: stripe::StripeError) -> Self {
        match err {
            stripe::StripeError::Stripe(api_error, status) => {
                Self::from_api(status, api_error.message)
            }
            other => Self::Request(other.to_string()),
        }
    }
}

/// Operations the checkout routes need from the payment processor.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Fetch a coupon by its code.
    async fn retrieve_coupon(&self, code: &CouponCode) -> Result<StripeCoupon, StripeError>;

    /// Create a hosted checkout session.
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, StripeError>;

    /// Flag a subscription to cancel when the current period ends.
    async fn cancel_at_period_end(&self, subscription_id: &str) -> Result<(), StripeError>;
}
