//! Paygate Core - Shared checkout types.
//!
//! This crate provides the domain types used by every Paygate component:
//! - `server` - JSON API routes in front of the payment processor and database
//! - `client` - Checkout flow controller that drives those routes
//! - `cli` - Operator tools for migrations and coupon lookups
//!
//! # Architecture
//!
//! The core crate contains only types and rules - no I/O, no database access,
//! no HTTP clients. Token validity and discount arithmetic live here so the
//! server and the client agree on them.
//!
//! # Modules
//!
//! - [`error`] - The checkout error kinds shared by server and client
//! - [`types`] - Newtype IDs, one-time tokens, coupons, and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod types;

pub use error::CheckoutError;
pub use types::*;
