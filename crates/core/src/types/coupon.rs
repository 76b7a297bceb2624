//! Discount coupons as reported by the payment processor.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::price::format_usd;

/// Errors that can occur when parsing a [`CouponCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CouponCodeError {
    /// The input is empty once surrounding whitespace is removed.
    #[error("Please enter a coupon code")]
    Empty,
    /// The input is too long to be a processor coupon id.
    #[error("coupon code must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A coupon code typed by the customer.
///
/// Surrounding whitespace is stripped. An empty code never reaches the
/// network.
///
/// ## Examples
///
/// ```
/// use paygate_core::CouponCode;
///
/// assert_eq!(CouponCode::parse("  SPRING20 ").unwrap().as_str(), "SPRING20");
/// assert!(CouponCode::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponCode(String);

impl CouponCode {
    /// Maximum length accepted for a coupon id.
    pub const MAX_LENGTH: usize = 200;

    /// Parse a `CouponCode` from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than
    /// [`Self::MAX_LENGTH`].
    pub fn parse(s: &str) -> Result<Self, CouponCodeError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CouponCodeError::Empty);
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(CouponCodeError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Discount terms of a coupon.
///
/// Exactly one of `percent_off` and `amount_off` is normally set. Field names
/// follow the processor's wire format so this type is also the JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Processor coupon id, passed back when creating a checkout session.
    pub id: String,
    /// Percentage discount, e.g. `20` for 20 % off.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub percent_off: Option<Decimal>,
    /// Fixed discount in cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_off: Option<i64>,
}

impl Coupon {
    /// The percentage discount, ignoring a zero value.
    #[must_use]
    pub fn effective_percent_off(&self) -> Option<Decimal> {
        self.percent_off.filter(|p| !p.is_zero())
    }

    /// The fixed discount in cents, ignoring a zero value.
    #[must_use]
    pub fn effective_amount_off(&self) -> Option<i64> {
        self.amount_off.filter(|a| *a != 0)
    }

    /// Discount line as shown on the checkout page (`-20%`, `-$15.00`).
    ///
    /// Returns `None` for a coupon with no usable terms.
    #[must_use]
    pub fn discount_label(&self) -> Option<String> {
        if let Some(percent) = self.effective_percent_off() {
            return Some(format!("-{}%", percent.normalize()));
        }
        self.effective_amount_off()
            .map(|cents| format!("-{}", format_usd(Decimal::new(cents, 2))))
    }
}
