//! Payment-processor routes.
//!
//! Thin handlers: parse the body, check the session, delegate to
//! [`crate::services::checkout`].

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use paygate_core::{Coupon, UserId};

use crate::error::{AppError, Result};
use crate::extract::AppJson;
use crate::middleware::{OptionalSession, RequireSession};
use crate::services::checkout;
use crate::state::AppState;
use crate::stripe::CheckoutSessionRequest;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponRequest {
    #[serde(default)]
    pub coupon_code: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateCouponResponse {
    pub coupon: Coupon,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    #[serde(default)]
    pub coupon_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateCheckoutResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelSubscriptionRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// `POST /api/stripe/validate-coupon`
#[tracing::instrument(skip_all)]
pub async fn validate_coupon(
    State(state): State<AppState>,
    AppJson(body): AppJson<ValidateCouponRequest>,
) -> Result<Json<ValidateCouponResponse>> {
    let coupon = checkout::validate_coupon(state.processor(), &body.coupon_code).await?;
    Ok(Json(ValidateCouponResponse { coupon }))
}

/// `POST /api/stripe/create-checkout`
#[tracing::instrument(skip_all)]
pub async fn create_checkout(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    AppJson(body): AppJson<CreateCheckoutRequest>,
) -> Result<Json<CreateCheckoutResponse>> {
    let config = state.config();
    let request = CheckoutSessionRequest {
        price_id: config.stripe.price_id.clone(),
        user_id: session.user_id,
        customer_email: session.email,
        coupon_id: body
            .coupon_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty()),
        success_url: config.checkout_success_url(),
        cancel_url: config.checkout_cancel_url(),
    };

    let url = checkout::create_checkout(state.processor(), &request).await?;
    Ok(Json(CreateCheckoutResponse { url }))
}

/// `POST /api/stripe/cancel-subscription`
///
/// Answers 401 for a missing session or a `userId` other than the caller's
/// before touching the database or the processor.
#[tracing::instrument(skip_all)]
pub async fn cancel_subscription(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
    AppJson(body): AppJson<CancelSubscriptionRequest>,
) -> Result<Json<Value>> {
    let Some(session) = session else {
        return Err(AppError::Unauthorized);
    };
    let requested = body
        .user_id
        .as_deref()
        .and_then(|id| UserId::parse(id).ok());

    checkout::cancel_subscription(
        state.store(),
        state.processor(),
        session.user_id,
        requested,
    )
    .await?;
    Ok(Json(json!({ "success": true })))
}
