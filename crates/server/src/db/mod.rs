//! Database operations for the checkout `PostgreSQL` store.
//!
//! The auth provider's hosted Postgres is the store of record; this server
//! only reads and flips rows it needs for checkout.
//!
//! ## Tables
//!
//! - `auth_tokens` - One-time checkout tokens (issued elsewhere)
//! - `subscriptions` - Processor subscription id per user
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p paygate-cli -- migrate
//! ```

pub mod subscriptions;
pub mod tokens;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use paygate_core::{AuthToken, UserId};

pub use subscriptions::SubscriptionRepository;
pub use tokens::TokenRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Everything the routes need from the database.
///
/// Implemented by [`PgStore`] in production and by in-memory fakes in tests.
#[async_trait]
pub trait CheckoutStore: Send + Sync {
    /// Look up a token record by its value.
    async fn find_token(&self, token: &str) -> Result<Option<AuthToken>, RepositoryError>;

    /// Mark a token consumed.
    ///
    /// Returns `false` when the token was already used (or vanished) by the
    /// time the update ran, so concurrent consumers cannot both succeed.
    async fn consume_token(&self, token: &str) -> Result<bool, RepositoryError>;

    /// The processor subscription id recorded for `user_id`, if any.
    async fn subscription_id_for(&self, user_id: UserId)
    -> Result<Option<String>, RepositoryError>;

    /// Round-trip to the database for readiness checks.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed [`CheckoutStore`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckoutStore for PgStore {
    async fn find_token(&self, token: &str) -> Result<Option<AuthToken>, RepositoryError> {
        TokenRepository::new(&self.pool).find(token).await
    }

    async fn consume_token(&self, token: &str) -> Result<bool, RepositoryError> {
        TokenRepository::new(&self.pool).mark_used(token).await
    }

    async fn subscription_id_for(
        &self,
        user_id: UserId,
    ) -> Result<Option<String>, RepositoryError> {
        SubscriptionRepository::new(&self.pool)
            .stripe_subscription_id(user_id)
            .await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
