//! Processor-neutral shapes passed across [`super::PaymentProcessor`].

use rust_decimal::Decimal;

use paygate_core::{Coupon, UserId};

/// The coupon fields this service reads.
#[derive(Debug, Clone)]
pub struct StripeCoupon {
    pub id: String,
    pub percent_off: Option<Decimal>,
    /// Cents.
    pub amount_off: Option<i64>,
    /// False once the coupon is past `redeem_by` or hit `max_redemptions`.
    pub valid: bool,
}

impl From<StripeCoupon> for Coupon {
    fn from(coupon: StripeCoupon) -> Self {
        Self {
            id: coupon.id,
            percent_off: coupon.percent_off,
            amount_off: coupon.amount_off,
        }
    }
}

/// Stripe reports `percent_off` as a float; keep the digits it was set with.
pub(crate) fn percent_from_float(percent_off: Option<f64>) -> Option<Decimal> {
    percent_off
        .and_then(|value| Decimal::try_from(value).ok())
        .map(|value| value.normalize())
}

/// Parameters for creating a subscription checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub price_id: String,
    pub user_id: UserId,
    pub customer_email: Option<String>,
    pub coupon_id: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

/// A created checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page. Absent for embedded sessions.
    pub url: Option<String>,
}
