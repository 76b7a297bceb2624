//! Subscription lookup repository.

use sqlx::PgPool;

use paygate_core::UserId;

use super::RepositoryError;

/// Repository for `subscriptions` rows.
pub struct SubscriptionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SubscriptionRepository<'a> {
    /// Create a new subscription repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the processor subscription id for a user.
    ///
    /// A row with a null id is treated the same as no row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stripe_subscription_id(
        &self,
        user_id: UserId,
    ) -> Result<Option<String>, RepositoryError> {
        let id: Option<Option<String>> = sqlx::query_scalar(
            r"
            SELECT stripe_subscription_id
            FROM subscriptions
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(id.flatten().filter(|id| !id.is_empty()))
    }
}
