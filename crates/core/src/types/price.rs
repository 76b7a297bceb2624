//! Subscription price and discount arithmetic using decimal amounts.
//!
//! Amounts are dollars as [`Decimal`]; processor fixed discounts arrive in
//! cents and are converted here.

use rust_decimal::{Decimal, RoundingStrategy};

use super::coupon::Coupon;

/// Monthly subscription price in dollars.
pub const BASE_PRICE: Decimal = Decimal::from_parts(6000, 0, 0, false, 2);

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Total due after applying `coupon` to `base`.
///
/// - percent coupon: `base * (1 - percent_off / 100)`
/// - fixed coupon: `base - amount_off / 100`
///
/// The result is clamped at zero and rounded half-up to cents. A coupon with
/// neither term leaves `base` unchanged.
#[must_use]
pub fn discounted_total(base: Decimal, coupon: &Coupon) -> Decimal {
    let total = if let Some(percent) = coupon.effective_percent_off() {
        base * (Decimal::ONE - percent / ONE_HUNDRED)
    } else if let Some(cents) = coupon.effective_amount_off() {
        base - Decimal::new(cents, 2)
    } else {
        base
    };

    total
        .max(Decimal::ZERO)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a dollar amount for display, e.g. `$48.00`.
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${rounded:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percent(p: i64) -> Coupon {
        Coupon {
            id: "pct".to_string(),
            percent_off: Some(Decimal::new(p, 0)),
            amount_off: None,
        }
    }

    fn fixed(cents: i64) -> Coupon {
        Coupon {
            id: "fixed".to_string(),
            percent_off: None,
            amount_off: Some(cents),
        }
    }

    #[test]
    fn test_base_price() {
        assert_eq!(BASE_PRICE, Decimal::new(60, 0));
        assert_eq!(format_usd(BASE_PRICE), "$60.00");
    }

    #[test]
    fn test_percent_off() {
        assert_eq!(
            discounted_total(BASE_PRICE, &percent(20)),
            Decimal::new(4800, 2)
        );
    }

    #[test]
    fn test_amount_off() {
        assert_eq!(
            discounted_total(BASE_PRICE, &fixed(1500)),
            Decimal::new(4500, 2)
        );
    }

    #[test]
    fn test_amount_off_clamps_to_zero() {
        assert_eq!(discounted_total(BASE_PRICE, &fixed(7000)), Decimal::ZERO);
        assert_eq!(
            format_usd(discounted_total(BASE_PRICE, &fixed(7000))),
            "$0.00"
        );
    }

    #[test]
    fn test_percent_over_hundred_clamps_to_zero() {
        assert_eq!(discounted_total(BASE_PRICE, &percent(150)), Decimal::ZERO);
    }

    #[test]
    fn test_fractional_percent_rounds_to_cents() {
        let coupon = Coupon {
            id: "odd".to_string(),
            percent_off: Some(Decimal::new(333, 1)),
            amount_off: None,
        };
        // 60 * 0.667 = 40.02
        assert_eq!(discounted_total(BASE_PRICE, &coupon), Decimal::new(4002, 2));
    }

    #[test]
    fn test_percent_takes_precedence() {
        let coupon = Coupon {
            id: "both".to_string(),
            percent_off: Some(Decimal::new(10, 0)),
            amount_off: Some(1500),
        };
        assert_eq!(discounted_total(BASE_PRICE, &coupon), Decimal::new(5400, 2));
    }

    #[test]
    fn test_no_terms_keeps_base() {
        let coupon = Coupon {
            id: "none".to_string(),
            percent_off: None,
            amount_off: None,
        };
        assert_eq!(discounted_total(BASE_PRICE, &coupon), BASE_PRICE);
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(Decimal::new(45, 0)), "$45.00");
        assert_eq!(format_usd(Decimal::new(4002, 2)), "$40.02");
        assert_eq!(format_usd(Decimal::new(12345, 3)), "$12.35");
    }
}
