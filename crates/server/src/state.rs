//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::db::{CheckoutStore, PgStore};
use crate::services::SessionVerifier;
use crate::stripe::{PaymentProcessor, StripeClient, StripeError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The store and processor are trait objects
/// so tests can run the real router against in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: Arc<dyn CheckoutStore>,
    processor: Arc<dyn PaymentProcessor>,
    sessions: SessionVerifier,
}

impl AppState {
    /// Create the production state: Postgres store and live Stripe client.
    ///
    /// # Errors
    ///
    /// Returns an error if the Stripe client cannot be built from config.
    pub fn new(config: ServerConfig, pool: PgPool) -> Result<Self, StripeError> {
        let processor = StripeClient::new(&config.stripe)?;
        Ok(Self::with_services(
            config,
            Arc::new(PgStore::new(pool)),
            Arc::new(processor),
        ))
    }

    /// Create state from explicit service implementations.
    #[must_use]
    pub fn with_services(
        config: ServerConfig,
        store: Arc<dyn CheckoutStore>,
        processor: Arc<dyn PaymentProcessor>,
    ) -> Self {
        let sessions = SessionVerifier::new(&config.session);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                processor,
                sessions,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// The token and subscription store.
    #[must_use]
    pub fn store(&self) -> &dyn CheckoutStore {
        self.inner.store.as_ref()
    }

    /// The payment processor client.
    #[must_use]
    pub fn processor(&self) -> &dyn PaymentProcessor {
        self.inner.processor.as_ref()
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionVerifier {
        &self.inner.sessions
    }
}
