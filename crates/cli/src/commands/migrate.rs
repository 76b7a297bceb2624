//! Database migration command.
//!
//! # Environment Variables
//!
//! - `PAYGATE_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! `crates/server/migrations/`:
//! ```text
//! migrations/
//! ├── 20260101000001_create_auth_tokens.sql
//! └── 20260101000002_create_subscriptions.sql
//! ```

use paygate_server::{ServerConfig, db};

use super::CommandError;

/// Run the server's migrations against the configured database.
pub async fn run() -> Result<(), CommandError> {
    let database_url = ServerConfig::database_url_from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
