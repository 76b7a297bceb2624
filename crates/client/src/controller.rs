//! The checkout page's state machine.
//!
//! [`CheckoutController::load`] decides what the page shows from the URL
//! token and the current session. Once the page is ready, the buyer may
//! apply a coupon and start checkout. Every backend call runs under
//! [`with_timeout`] and every failure ends up as a message in
//! [`CheckoutState`]; nothing here is fatal.

use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use url::Url;

use paygate_core::{
    BASE_PRICE, CheckoutError, Coupon, CouponCode, discounted_total, format_usd, validate_token,
};

use crate::backend::{CheckoutBackend, Session};
use crate::config::TIMEOUT_DURATION;
use crate::error::ClientError;
use crate::timeout::with_timeout;

pub const INVALID_COUPON: &str = "Invalid coupon code";
pub const COUPON_FAILED: &str = "Failed to validate coupon";
pub const CHECKOUT_FAILED: &str = "Failed to start checkout. Please try again.";
pub const NOT_READY: &str = "Checkout is not available. Please sign in to continue.";

/// What the checkout page should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutView {
    /// Nobody is signed in and there is no link token.
    RedirectToSignIn,
    /// The link is valid but belongs to someone not currently signed in.
    SignInToContinue,
    /// Show pricing, coupon entry and the checkout button.
    Ready,
    /// The link could not be used.
    Failed { message: String },
}

/// Everything the page renders besides the view itself.
#[derive(Debug, Clone)]
pub struct CheckoutState {
    pub view: CheckoutView,
    pub coupon: Option<Coupon>,
    pub coupon_error: Option<String>,
    pub checkout_error: Option<String>,
    pub total: Decimal,
    /// Set while a coupon or checkout call is in flight.
    pub busy: bool,
}

impl Default for CheckoutState {
    fn default() -> Self {
        Self {
            view: CheckoutView::RedirectToSignIn,
            coupon: None,
            coupon_error: None,
            checkout_error: None,
            total: BASE_PRICE,
            busy: false,
        }
    }
}

impl CheckoutState {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.view == CheckoutView::Ready
    }

    /// `"$48.00"`
    #[must_use]
    pub fn total_display(&self) -> String {
        format_usd(self.total)
    }

    /// `"-20%"`, `"-$15.00"`, or `None` without a coupon.
    #[must_use]
    pub fn discount_display(&self) -> Option<String> {
        self.coupon.as_ref().and_then(Coupon::discount_label)
    }
}

/// Holds [`CheckoutState::busy`] for as long as it lives, including when the
/// caller drops the future mid-call.
struct BusyGuard<'a>(&'a mut bool);

impl<'a> BusyGuard<'a> {
    fn new(busy: &'a mut bool) -> Self {
        *busy = true;
        Self(busy)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Drives one checkout page.
pub struct CheckoutController<B> {
    backend: B,
    timeout: Duration,
    session: Option<Session>,
    state: CheckoutState,
}

impl<B: CheckoutBackend> CheckoutController<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            timeout: TIMEOUT_DURATION,
            session: None,
            state: CheckoutState::default(),
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Decide what the page shows.
    ///
    /// A valid token owned by the signed-in user is consumed here. A valid
    /// token owned by someone else, or with nobody signed in, is left alone.
    pub async fn load(&mut self, token: Option<&str>, session: Option<&Session>) -> CheckoutView {
        self.session = session.cloned();
        let token = token.map(str::trim).filter(|t| !t.is_empty());

        let view = match (token, session) {
            (None, None) => CheckoutView::RedirectToSignIn,
            (None, Some(_)) => CheckoutView::Ready,
            (Some(token), session) => match self.check_link(token, session).await {
                Ok(view) => view,
                Err(e) => {
                    warn!(error = %e, "Checkout link rejected");
                    CheckoutView::Failed {
                        message: e.user_message().to_string(),
                    }
                }
            },
        };

        self.state.view = view.clone();
        view
    }

    async fn check_link(
        &self,
        token: &str,
        session: Option<&Session>,
    ) -> Result<CheckoutView, ClientError> {
        let record = with_timeout(self.timeout, self.backend.fetch_token(token, session)).await?;
        let record = validate_token(record.as_ref(), Utc::now())?;

        match session {
            Some(session) if record.is_owned_by(session.user_id) => {
                with_timeout(self.timeout, self.backend.update_token(token, session)).await?;
                info!(user_id = %session.user_id, "Checkout link consumed");
                Ok(CheckoutView::Ready)
            }
            _ => Ok(CheckoutView::SignInToContinue),
        }
    }

    /// Validate `code` and, on success, apply it to the total.
    ///
    /// # Errors
    ///
    /// Returns the message now shown next to the coupon field, or
    /// [`NOT_READY`] without touching the backend unless the view is
    /// [`CheckoutView::Ready`].
    pub async fn apply_coupon(&mut self, code: &str) -> Result<Coupon, String> {
        if !self.state.is_ready() {
            return Err(NOT_READY.to_string());
        }
        let code = match CouponCode::parse(code) {
            Ok(code) => code,
            Err(e) => return Err(self.coupon_failed(e.to_string())),
        };

        let busy = BusyGuard::new(&mut self.state.busy);
        let result = with_timeout(self.timeout, self.backend.validate_coupon(&code)).await;
        drop(busy);

        match result {
            Ok(coupon) => {
                self.state.total = discounted_total(BASE_PRICE, &coupon);
                self.state.coupon = Some(coupon.clone());
                self.state.coupon_error = None;
                Ok(coupon)
            }
            Err(ClientError::Api { message, .. }) => {
                self.state.coupon = None;
                self.state.total = BASE_PRICE;
                Err(self.coupon_failed(message.unwrap_or_else(|| INVALID_COUPON.to_string())))
            }
            Err(e) => {
                warn!(error = %e, "Coupon validation failed");
                Err(self.coupon_failed(COUPON_FAILED.to_string()))
            }
        }
    }

    fn coupon_failed(&mut self, message: String) -> String {
        self.state.coupon_error = Some(message.clone());
        message
    }

    /// Create a checkout session with the applied coupon, if any.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Unauthorized` without calling the backend
    /// unless the view is [`CheckoutView::Ready`]. On any other failure the
    /// page keeps its state and shows a retry message.
    pub async fn start_checkout(&mut self) -> Result<Url, ClientError> {
        if !self.state.is_ready() {
            return Err(CheckoutError::Unauthorized.into());
        }

        self.state.checkout_error = None;
        let busy = BusyGuard::new(&mut self.state.busy);
        let coupon_id = self.state.coupon.as_ref().map(|c| c.id.as_str());
        let result = with_timeout(
            self.timeout,
            self.backend.create_checkout(coupon_id, self.session.as_ref()),
        )
        .await;
        drop(busy);

        if let Err(e) = &result {
            warn!(error = %e, "Checkout session creation failed");
            self.state.checkout_error = Some(CHECKOUT_FAILED.to_string());
        }
        result
    }
}
