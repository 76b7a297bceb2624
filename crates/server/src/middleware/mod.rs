//! HTTP middleware stack for the checkout API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded into the span and Sentry scope)
//! 4. Security headers
//! 5. CORS (configured base URL origin only)
//! 6. Rate limiting (coupon route only)
//!
//! Session identity is an extractor, not a layer: see [`auth`].

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{OptionalSession, RequireSession};
pub use rate_limit::coupon_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
