//! Business logic services for the checkout API.
//!
//! # Services
//!
//! - `session` - Verify auth-provider access tokens into a [`Session`]
//! - `checkout` - Token consumption, coupon lookup, checkout and cancellation

pub mod checkout;
pub mod session;

pub use session::{Session, SessionError, SessionVerifier};
