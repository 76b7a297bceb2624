//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Server-side failures are
//! captured to Sentry before the response is built; the caller only ever
//! sees `{"error": "<short message>"}`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use paygate_core::CheckoutError;

use crate::db::RepositoryError;
use crate::stripe::StripeError;

/// Boxed cause carried by [`AppError::Operation`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Application-level error type for the checkout API.
#[derive(Debug, Error)]
pub enum AppError {
    /// A checkout rule rejected the request.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Payment processor call failed.
    #[error("Stripe error: {0}")]
    Stripe(#[from] StripeError),

    /// Upstream failure whose message is safe to pass through.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// A multi-step operation failed; only `context` is shown to the caller.
    #[error("{context}: {source}")]
    Operation {
        context: &'static str,
        #[source]
        source: BoxError,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or mismatched session.
    #[error("Unauthorized")]
    Unauthorized,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited; `retry_after` is in seconds.
    #[error("Rate limited")]
    RateLimited { retry_after: u64 },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wrap `source` so the response only says `context`.
    pub fn operation(context: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Operation {
            context,
            source: source.into(),
        }
    }

    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Stripe(_)
                | Self::Upstream(_)
                | Self::Operation { .. }
                | Self::Internal(_)
                | Self::Checkout(CheckoutError::ExternalServiceFailure(_))
        )
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Checkout(err) => match err {
                CheckoutError::Unauthorized => StatusCode::UNAUTHORIZED,
                CheckoutError::InvalidToken | CheckoutError::NotFound(_) => StatusCode::NOT_FOUND,
                CheckoutError::TokenUsed => StatusCode::CONFLICT,
                CheckoutError::TokenExpired => StatusCode::GONE,
                CheckoutError::ExternalServiceFailure(_) => StatusCode::BAD_GATEWAY,
                CheckoutError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            },
            Self::Database(_) | Self::Operation { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Stripe(_) | Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Message placed in the `error` field of the response body.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Checkout(err) => match err {
                CheckoutError::Unauthorized => "Unauthorized".to_string(),
                CheckoutError::InvalidToken => "Invalid token".to_string(),
                CheckoutError::TokenUsed => "Token has already been used".to_string(),
                CheckoutError::TokenExpired => "Token has expired".to_string(),
                CheckoutError::NotFound(msg) => msg.clone(),
                CheckoutError::ExternalServiceFailure(_) => "External service error".to_string(),
                CheckoutError::Timeout => "Request timed out".to_string(),
            },
            // Don't expose internal error details to clients
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Stripe(_) => "External service error".to_string(),
            Self::Operation { context, .. } => (*context).to_string(),
            Self::Upstream(msg) | Self::NotFound(msg) | Self::BadRequest(msg) => msg.clone(),
            Self::Unauthorized => "Unauthorized".to_string(),
            Self::RateLimited { .. } => "Too many requests".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let mut response = (
            self.status(),
            Json(json!({ "error": self.public_message() })),
        )
            .into_response();
        if let Self::RateLimited { retry_after } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        }
        response
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after the session is verified to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("coupon".to_string());
        assert_eq!(err.to_string(), "Not found: coupon");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_token_error_status_codes() {
        assert_eq!(
            AppError::from(CheckoutError::InvalidToken).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(CheckoutError::TokenUsed).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(CheckoutError::TokenExpired).status(),
            StatusCode::GONE
        );
        assert_eq!(
            AppError::from(CheckoutError::Unauthorized).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::RateLimited { retry_after: 3 }.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::Upstream("boom".to_string()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Internal("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_not_found_body_is_bare_message() {
        let (status, body) = body_of(AppError::NotFound("Invalid coupon code".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Invalid coupon code" }));
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (_, body) = body_of(AppError::Internal("pool exhausted".to_string())).await;
        assert_eq!(body["error"], "Internal server error");

        let err = AppError::operation(
            "Failed to cancel subscription",
            StripeError::Request("unexpected eof".to_string()),
        );
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to cancel subscription");
    }

    #[tokio::test]
    async fn test_rate_limited_sets_retry_after() {
        let response = AppError::RateLimited { retry_after: 3 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "3");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Too many requests" }));
    }

    #[tokio::test]
    async fn test_upstream_message_passes_through() {
        let (status, body) =
            body_of(AppError::Upstream("No such price: 'price_x'".to_string())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "No such price: 'price_x'");
    }
}
