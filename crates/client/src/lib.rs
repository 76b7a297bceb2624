//! Paygate checkout client.
//!
//! Drives the checkout page: validates the one-time link token, applies a
//! coupon and starts a hosted checkout, all through the server's JSON API.
//!
//! ```rust,ignore
//! let backend = HttpCheckoutBackend::new(ApiConfig::from_env()?)?;
//! let mut checkout = CheckoutController::new(backend);
//! match checkout.load(token.as_deref(), session.as_ref()).await {
//!     CheckoutView::Ready => { /* show pricing */ }
//!     other => { /* redirect or show the message */ }
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod banner;
pub mod config;
pub mod controller;
pub mod error;
pub mod timeout;

pub use backend::{CheckoutBackend, HttpCheckoutBackend, Session};
pub use banner::{BannerDismissal, FileStore, KeyValueStore, MemoryStore};
pub use config::{ApiConfig, DeploymentMode, TIMEOUT_DURATION};
pub use controller::{CheckoutController, CheckoutState, CheckoutView};
pub use error::ClientError;
pub use timeout::with_timeout;
