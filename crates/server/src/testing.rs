//! In-memory fakes of the store and processor for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use paygate_core::{AuthToken, CouponCode, UserId};

use crate::db::{CheckoutStore, RepositoryError};
use crate::stripe::{
    CheckoutSession, CheckoutSessionRequest, PaymentProcessor, StripeCoupon, StripeError,
};

#[derive(Default)]
pub struct FakeStore {
    tokens: Mutex<HashMap<String, AuthToken>>,
    subscriptions: HashMap<UserId, String>,
    lose_race: bool,
    unreachable: bool,
    calls: AtomicUsize,
    consume_calls: AtomicUsize,
}

impl FakeStore {
    pub fn with_token(
        self,
        token: &str,
        user_id: UserId,
        used: bool,
        expires_at: DateTime<Utc>,
    ) -> Self {
        self.tokens.lock().unwrap().insert(
            token.to_string(),
            AuthToken {
                token: token.to_string(),
                user_id,
                used,
                expires_at,
            },
        );
        self
    }

    pub fn with_subscription(mut self, user_id: UserId, subscription_id: &str) -> Self {
        self.subscriptions
            .insert(user_id, subscription_id.to_string());
        self
    }

    /// Another request flips the row between our read and our update.
    pub const fn losing_consume_race(mut self) -> Self {
        self.lose_race = true;
        self
    }

    pub const fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn consume_calls(&self) -> usize {
        self.consume_calls.load(Ordering::SeqCst)
    }

    pub fn is_used(&self, token: &str) -> bool {
        self.tokens
            .lock()
            .unwrap()
            .get(token)
            .is_some_and(|t| t.used)
    }

    fn touch(&self) -> Result<(), RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl CheckoutStore for FakeStore {
    async fn find_token(&self, token: &str) -> Result<Option<AuthToken>, RepositoryError> {
        self.touch()?;
        Ok(self.tokens.lock().unwrap().get(token).cloned())
    }

    async fn consume_token(&self, token: &str) -> Result<bool, RepositoryError> {
        self.touch()?;
        self.consume_calls.fetch_add(1, Ordering::SeqCst);
        if self.lose_race {
            return Ok(false);
        }
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.get_mut(token) {
            Some(record) if !record.used => {
                record.used = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn subscription_id_for(
        &self,
        user_id: UserId,
    ) -> Result<Option<String>, RepositoryError> {
        self.touch()?;
        Ok(self.subscriptions.get(&user_id).cloned())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        if self.unreachable {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeProcessor {
    coupons: HashMap<String, StripeCoupon>,
    fail: bool,
    calls: AtomicUsize,
    cancelled: Mutex<Vec<String>>,
    last_checkout: Mutex<Option<CheckoutSessionRequest>>,
}

impl FakeProcessor {
    pub fn with_percent_coupon(mut self, id: &str, percent: i64, valid: bool) -> Self {
        self.coupons.insert(
            id.to_string(),
            StripeCoupon {
                id: id.to_string(),
                percent_off: Some(Decimal::new(percent, 0)),
                amount_off: None,
                valid,
            },
        );
        self
    }

    pub fn with_amount_coupon(mut self, id: &str, cents: i64) -> Self {
        self.coupons.insert(
            id.to_string(),
            StripeCoupon {
                id: id.to_string(),
                percent_off: None,
                amount_off: Some(cents),
                valid: true,
            },
        );
        self
    }

    /// Every call returns an API error.
    pub const fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }

    pub fn last_checkout(&self) -> Option<CheckoutSessionRequest> {
        self.last_checkout.lock().unwrap().clone()
    }

    fn api_error(message: &str) -> StripeError {
        StripeError::Api {
            status: 400,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl PaymentProcessor for FakeProcessor {
    async fn retrieve_coupon(&self, code: &CouponCode) -> Result<StripeCoupon, StripeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StripeError::RateLimited);
        }
        self.coupons
            .get(code.as_str())
            .cloned()
            .ok_or_else(|| StripeError::NotFound(format!("No such coupon: '{code}'")))
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, StripeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_checkout.lock().unwrap() = Some(request.clone());
        if self.fail {
            return Err(Self::api_error(&format!(
                "No such price: '{}'",
                request.price_id
            )));
        }
        Ok(CheckoutSession {
            id: "cs_test_123".to_string(),
            url: Some("https://checkout.stripe.test/c/pay/cs_test_123".to_string()),
        })
    }

    async fn cancel_at_period_end(&self, subscription_id: &str) -> Result<(), StripeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Self::api_error("No such subscription"));
        }
        self.cancelled
            .lock()
            .unwrap()
            .push(subscription_id.to_string());
        Ok(())
    }
}
