//! Checkout-token route.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::Result;
use crate::extract::AppJson;
use crate::middleware::RequireSession;
use crate::services::checkout;
use crate::state::AppState;

/// Body of `POST /api/auth/update-token`.
#[derive(Debug, Deserialize)]
pub struct UpdateTokenRequest {
    #[serde(default)]
    pub token: String,
}

/// Validate and consume a one-time checkout token for the signed-in user.
///
/// Not idempotent: the second call for the same token answers 409.
#[tracing::instrument(skip_all)]
pub async fn update_token(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    AppJson(body): AppJson<UpdateTokenRequest>,
) -> Result<Json<Value>> {
    checkout::consume_token(state.store(), &body.token, session.user_id, Utc::now()).await?;
    Ok(Json(json!({ "ok": true })))
}
