//! One-time checkout token repository.

use sqlx::PgPool;

use paygate_core::AuthToken;

use super::RepositoryError;

/// Repository for `auth_tokens` rows.
pub struct TokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a token record by its value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find(&self, token: &str) -> Result<Option<AuthToken>, RepositoryError> {
        let row = sqlx::query_as::<_, AuthToken>(
            r"
            SELECT token, user_id, used, expires_at
            FROM auth_tokens
            WHERE token = $1
            ",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Flip `used` to true if it is still false.
    ///
    /// The `used = FALSE` predicate makes this the single point where a token
    /// is consumed: of two concurrent calls, only one sees a row updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_used(&self, token: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE auth_tokens
            SET used = TRUE
            WHERE token = $1 AND used = FALSE
            ",
        )
        .bind(token)
        .execute(self.pool)
        .await?;

        match result.rows_affected() {
            0 => Ok(false),
            1 => Ok(true),
            n => Err(RepositoryError::DataCorruption(format!(
                "{n} auth_tokens rows share one token value"
            ))),
        }
    }
}
