//! `async-stripe` implementation of [`PaymentProcessor`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use stripe::{ClientBuilder, RequestStrategy};
use stripe_billing::subscription::UpdateSubscription;
use stripe_checkout::CheckoutSessionMode;
use stripe_checkout::checkout_session::{
    CreateCheckoutSession, CreateCheckoutSessionDiscounts, CreateCheckoutSessionLineItems,
};
use stripe_product::coupon::RetrieveCoupon;
use tracing::{debug, instrument};

use paygate_core::CouponCode;

use super::types::{CheckoutSession, CheckoutSessionRequest, StripeCoupon, percent_from_float};
use super::{PaymentProcessor, StripeError};
use crate::config::StripeConfig;

/// Retries for idempotent-safe failures (network errors, 429, 5xx).
const MAX_RETRIES: u32 = 3;

/// Client for the Stripe API.
#[derive(Clone)]
pub struct StripeClient {
    inner: Arc<stripe::Client>,
}

impl StripeClient {
    /// Create a new Stripe API client.
    ///
    /// # Errors
    ///
    /// Returns `StripeError::Config` if the client cannot be built from the
    /// secret key.
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        let client = ClientBuilder::new(config.secret_key.expose_secret())
            .request_strategy(RequestStrategy::ExponentialBackoff(MAX_RETRIES))
            .build()
            .map_err(|e| StripeError::Config(format!("Failed to build Stripe client: {e}")))?;

        Ok(Self {
            inner: Arc::new(client),
        })
    }
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    #[instrument(skip(self), fields(coupon = %code))]
    async fn retrieve_coupon(&self, code: &CouponCode) -> Result<StripeCoupon, StripeError> {
        let coupon = RetrieveCoupon::new(code.as_str())
            .send(self.inner.as_ref())
            .await?;
        debug!(valid = coupon.valid, "Retrieved coupon");

        Ok(StripeCoupon {
            id: coupon.id.to_string(),
            percent_off: percent_from_float(coupon.percent_off),
            amount_off: coupon.amount_off,
            valid: coupon.valid,
        })
    }

    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, StripeError> {
        let user_id = request.user_id.to_string();
        let line_items = vec![CreateCheckoutSessionLineItems {
            quantity: Some(1),
            price: Some(request.price_id.clone()),
            ..Default::default()
        }];

        let mut req = CreateCheckoutSession::new()
            .mode(CheckoutSessionMode::Subscription)
            .line_items(line_items)
            .success_url(&request.success_url)
            .cancel_url(&request.cancel_url)
            .client_reference_id(&user_id)
            .metadata(HashMap::from([("user_id".to_string(), user_id.clone())]));

        if let Some(ref email) = request.customer_email {
            req = req.customer_email(email);
        }
        if let Some(ref coupon) = request.coupon_id {
            req = req.discounts(vec![CreateCheckoutSessionDiscounts {
                coupon: Some(coupon.clone()),
                ..Default::default()
            }]);
        }

        let session = req.send(self.inner.as_ref()).await?;
        debug!(session_id = %session.id, "Created checkout session");

        Ok(CheckoutSession {
            id: session.id.to_string(),
            url: session.url,
        })
    }

    #[instrument(skip(self))]
    async fn cancel_at_period_end(&self, subscription_id: &str) -> Result<(), StripeError> {
        let subscription = UpdateSubscription::new(subscription_id)
            .cancel_at_period_end(true)
            .send(self.inner.as_ref())
            .await?;
        debug!(
            subscription_id = %subscription.id,
            cancel_at_period_end = subscription.cancel_at_period_end,
            "Requested cancellation at period end"
        );
        Ok(())
    }
}
