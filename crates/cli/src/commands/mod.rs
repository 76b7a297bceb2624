//! CLI subcommands.

pub mod coupon;
pub mod migrate;

use thiserror::Error;

use paygate_core::CouponCodeError;
use paygate_server::config::ConfigError;
use paygate_server::stripe::StripeError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("invalid coupon code: {0}")]
    CouponCode(#[from] CouponCodeError),

    #[error("payment processor error: {0}")]
    Stripe(#[from] StripeError),
}
