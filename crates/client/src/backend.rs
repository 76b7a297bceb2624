//! Calls the checkout controller makes, and their HTTP implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

use paygate_core::{AuthToken, Coupon, CouponCode, UserId};

use crate::config::ApiConfig;
use crate::error::ClientError;

/// The signed-in user as known to the browser.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    /// Auth-provider access token, sent as the bearer credential.
    pub access_token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Everything the checkout controller needs from the outside world.
#[async_trait]
pub trait CheckoutBackend: Send + Sync {
    /// Read a token record from the hosted database.
    async fn fetch_token(
        &self,
        token: &str,
        session: Option<&Session>,
    ) -> Result<Option<AuthToken>, ClientError>;

    /// `POST /api/auth/update-token`
    async fn update_token(&self, token: &str, session: &Session) -> Result<(), ClientError>;

    /// `POST /api/stripe/validate-coupon`
    async fn validate_coupon(&self, code: &CouponCode) -> Result<Coupon, ClientError>;

    /// `POST /api/stripe/create-checkout`, returning the hosted payment page.
    async fn create_checkout(
        &self,
        coupon_id: Option<&str>,
        session: Option<&Session>,
    ) -> Result<Url, ClientError>;
}

/// Row shape returned by the database REST endpoint.
#[derive(Debug, Deserialize)]
struct TokenRow {
    user_id: UserId,
    used: bool,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CouponBody {
    coupon: Coupon,
}

#[derive(Debug, Deserialize)]
struct CheckoutBody {
    url: Option<String>,
}

/// [`CheckoutBackend`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpCheckoutBackend {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpCheckoutBackend {
    /// Create a backend for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn post_route(
        &self,
        path: &str,
        body: serde_json::Value,
        session: Option<&Session>,
    ) -> Result<reqwest::Response, ClientError> {
        let mut request = self.client.post(self.config.route(path)?).json(&body);
        if let Some(session) = session {
            request = request.bearer_auth(&session.access_token);
        }
        let response = request.send().await?;
        check_status(response).await
    }
}

/// Pass successful responses through; turn the rest into `ClientError::Api`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .filter(|m| !m.is_empty());
    debug!(status = %status, message = ?message, "Route returned an error");

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl CheckoutBackend for HttpCheckoutBackend {
    #[instrument(skip_all)]
    async fn fetch_token(
        &self,
        token: &str,
        session: Option<&Session>,
    ) -> Result<Option<AuthToken>, ClientError> {
        let url = self.config.db_url.join("rest/v1/auth_tokens")?;
        let bearer = session.map_or(self.config.anon_key.as_str(), |s| s.access_token.as_str());

        let response = self
            .client
            .get(url)
            .query(&[
                ("token", format!("eq.{token}")),
                ("select", "user_id,used,expires_at".to_string()),
            ])
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let rows: Vec<TokenRow> = check_status(response).await?.json().await?;

        Ok(rows.into_iter().next().map(|row| AuthToken {
            token: token.to_string(),
            user_id: row.user_id,
            used: row.used,
            expires_at: row.expires_at,
        }))
    }

    #[instrument(skip_all)]
    async fn update_token(&self, token: &str, session: &Session) -> Result<(), ClientError> {
        self.post_route(
            "/api/auth/update-token",
            json!({ "token": token }),
            Some(session),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(coupon = %code))]
    async fn validate_coupon(&self, code: &CouponCode) -> Result<Coupon, ClientError> {
        let body: CouponBody = self
            .post_route(
                "/api/stripe/validate-coupon",
                json!({ "couponCode": code.as_str() }),
                None,
            )
            .await?
            .json()
            .await?;
        Ok(body.coupon)
    }

    #[instrument(skip_all)]
    async fn create_checkout(
        &self,
        coupon_id: Option<&str>,
        session: Option<&Session>,
    ) -> Result<Url, ClientError> {
        let body: CheckoutBody = self
            .post_route(
                "/api/stripe/create-checkout",
                json!({ "couponId": coupon_id }),
                session,
            )
            .await?
            .json()
            .await?;

        let url = body.url.ok_or(ClientError::Api {
            status: StatusCode::OK.as_u16(),
            message: None,
        })?;
        Ok(Url::parse(&url)?)
    }
}
