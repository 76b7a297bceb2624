//! HTTP route handlers for the checkout API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Readiness (database ping)
//!
//! # Checkout tokens (requires session)
//! POST /api/auth/update-token           - Validate and consume a one-time token
//!
//! # Payment processor
//! POST /api/stripe/validate-coupon      - Live coupon lookup (rate limited)
//! POST /api/stripe/create-checkout      - Hosted checkout session (requires session)
//! POST /api/stripe/cancel-subscription  - Cancel at period end (requires session)
//! ```

pub mod auth;
pub mod health;
pub mod stripe;

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::config::ServerConfig;
use crate::middleware::{
    coupon_rate_limiter, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Build the full application router.
///
/// Sentry layers are added by the binary on top of this.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(state.config());

    let coupon_routes = Router::new()
        .route("/validate-coupon", post(stripe::validate_coupon))
        .layer(coupon_rate_limiter());

    let stripe_routes = Router::new()
        .route("/create-checkout", post(stripe::create_checkout))
        .route("/cancel-subscription", post(stripe::cancel_subscription))
        .merge(coupon_routes);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/api/auth/update-token", post(auth::update_token))
        .nest("/api/stripe", stripe_routes)
        .layer(cors)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Only the public site may call the API from a browser.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origin = HeaderValue::from_str(&config.allowed_origin()).ok();
    if origin.is_none() {
        tracing::warn!("Base URL origin is not a valid header value; CORS will reject all origins");
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origin))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}
