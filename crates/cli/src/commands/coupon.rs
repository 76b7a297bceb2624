//! Coupon lookup command.
//!
//! Uses `STRIPE_SECRET_KEY` and `STRIPE_PRICE_ID`.

use paygate_core::{BASE_PRICE, Coupon, CouponCode, discounted_total, format_usd};
use paygate_server::config::StripeConfig;
use paygate_server::stripe::{PaymentProcessor, StripeClient};

use super::CommandError;

/// Fetch `raw_code` live and log its terms and the resulting monthly price.
pub async fn show(raw_code: &str) -> Result<(), CommandError> {
    let code = CouponCode::parse(raw_code)?;
    let client = StripeClient::new(&StripeConfig::from_env()?)?;

    let stripe_coupon = client.retrieve_coupon(&code).await?;
    let valid = stripe_coupon.valid;
    let coupon = Coupon::from(stripe_coupon);

    tracing::info!(
        id = %coupon.id,
        valid,
        discount = coupon.discount_label().as_deref().unwrap_or("none"),
        total = %format_usd(discounted_total(BASE_PRICE, &coupon)),
        "Coupon found"
    );
    if !valid {
        tracing::warn!("Coupon is no longer valid and will be rejected at checkout");
    }
    Ok(())
}
