//! Checkout operations behind the API routes.
//!
//! Each function takes the store and processor as trait objects so the same
//! code runs against Postgres/Stripe in production and fakes in tests.

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use paygate_core::{CheckoutError, Coupon, CouponCode, UserId, validate_token};

use crate::db::CheckoutStore;
use crate::error::{AppError, Result};
use crate::stripe::{CheckoutSessionRequest, PaymentProcessor, StripeError};

pub const INVALID_COUPON: &str = "Invalid coupon code";
pub const COUPON_NO_LONGER_VALID: &str = "This coupon is no longer valid";
pub const NO_SUBSCRIPTION: &str = "No active subscription found";
pub const CANCEL_FAILED: &str = "Failed to cancel subscription";

/// Validate and consume a one-time checkout token for `user_id`.
///
/// # Errors
///
/// - `InvalidToken` when no record matches
/// - `TokenExpired` when past expiry (checked before `used`)
/// - `TokenUsed` when already consumed, including by a concurrent request
/// - `Unauthorized` when the token belongs to another user
#[instrument(skip(store, token), fields(user_id = %user_id))]
pub async fn consume_token(
    store: &dyn CheckoutStore,
    token: &str,
    user_id: UserId,
    now: DateTime<Utc>,
) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        return Err(CheckoutError::InvalidToken.into());
    }

    let record = store.find_token(token).await?;
    let record = validate_token(record.as_ref(), now)?;

    if !record.is_owned_by(user_id) {
        warn!("Token presented by a user who does not own it");
        return Err(CheckoutError::Unauthorized.into());
    }

    if !store.consume_token(token).await? {
        return Err(CheckoutError::TokenUsed.into());
    }

    info!("Checkout token consumed");
    Ok(())
}

/// Look up a coupon live at the processor.
///
/// # Errors
///
/// `BadRequest` for blank codes and coupons the processor marks invalid,
/// `NotFound` for unknown codes, `Stripe` for anything else.
#[instrument(skip(processor))]
pub async fn validate_coupon(processor: &dyn PaymentProcessor, raw_code: &str) -> Result<Coupon> {
    let code = CouponCode::parse(raw_code).map_err(|e| AppError::BadRequest(e.to_string()))?;

    match processor.retrieve_coupon(&code).await {
        Ok(coupon) if !coupon.valid => Err(AppError::BadRequest(
            COUPON_NO_LONGER_VALID.to_string(),
        )),
        Ok(coupon) => Ok(coupon.into()),
        Err(StripeError::NotFound(_)) => Err(AppError::NotFound(INVALID_COUPON.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// Create a hosted checkout session and return its redirect URL.
///
/// # Errors
///
/// `Upstream` carrying the processor's message when session creation fails.
#[instrument(skip(processor, request), fields(user_id = %request.user_id))]
pub async fn create_checkout(
    processor: &dyn PaymentProcessor,
    request: &CheckoutSessionRequest,
) -> Result<String> {
    let session = processor
        .create_checkout_session(request)
        .await
        .map_err(|e| match e {
            StripeError::Api { message, .. } | StripeError::NotFound(message) => {
                AppError::Upstream(message)
            }
            other => AppError::Upstream(other.to_string()),
        })?;

    session
        .url
        .ok_or_else(|| AppError::Upstream("Checkout session has no URL".to_string()))
}

/// Schedule cancellation of `requested`'s subscription at period end.
///
/// The ownership check runs before any store or processor call.
///
/// # Errors
///
/// `Unauthorized` on mismatch, `NotFound` without a subscription, and an
/// `Operation` error for any other failure.
#[instrument(skip(store, processor), fields(session_user = %session_user))]
pub async fn cancel_subscription(
    store: &dyn CheckoutStore,
    processor: &dyn PaymentProcessor,
    session_user: UserId,
    requested: Option<UserId>,
) -> Result<()> {
    if requested != Some(session_user) {
        return Err(AppError::Unauthorized);
    }

    let subscription_id = store
        .subscription_id_for(session_user)
        .await
        .map_err(|e| AppError::operation(CANCEL_FAILED, e))?
        .ok_or_else(|| AppError::NotFound(NO_SUBSCRIPTION.to_string()))?;

    processor
        .cancel_at_period_end(&subscription_id)
        .await
        .map_err(|e| AppError::operation(CANCEL_FAILED, e))?;

    info!(subscription_id = %subscription_id, "Subscription set to cancel at period end");
    Ok(())
}
