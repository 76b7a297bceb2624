//! Core types for Paygate.
//!
//! This module provides type-safe wrappers for the checkout domain.

pub mod coupon;
pub mod id;
pub mod price;
pub mod token;

pub use coupon::{Coupon, CouponCode, CouponCodeError};
pub use id::*;
pub use price::{BASE_PRICE, discounted_total, format_usd};
pub use token::{AuthToken, validate_token};
