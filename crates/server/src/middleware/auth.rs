//! Session extractors.
//!
//! The caller's identity comes from the auth provider's access token, sent
//! either as `Authorization: Bearer <jwt>` or in the `sb-access-token`
//! cookie the provider's browser SDK sets.

use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap,
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};

use crate::error::{AppError, set_sentry_user};
use crate::services::Session;
use crate::state::AppState;

/// Cookie holding the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

/// Extractor that requires a verified session.
///
/// Rejects with `401 {"error": "Unauthorized"}` before the handler runs.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireSession(session): RequireSession) -> impl IntoResponse {
///     session.user_id.to_string()
/// }
/// ```
pub struct RequireSession(pub Session);

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let OptionalSession(session) = OptionalSession::from_request_parts(parts, state)
            .await
            .unwrap_or(OptionalSession(None));

        session.map(Self).ok_or(AppError::Unauthorized)
    }
}

/// Extractor that optionally gets the current session.
///
/// Missing and invalid tokens both yield `None`.
pub struct OptionalSession(pub Option<Session>);

impl FromRequestParts<AppState> for OptionalSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = access_token(&parts.headers) else {
            return Ok(Self(None));
        };

        match state.sessions().verify(&token) {
            Ok(session) => {
                set_sentry_user(&session.user_id, session.email.as_deref());
                Ok(Self(Some(session)))
            }
            Err(e) => {
                tracing::debug!(error = %e, "Rejected access token");
                Ok(Self(None))
            }
        }
    }
}

/// Pull the access token from the bearer header, falling back to the cookie.
fn access_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            v.strip_prefix("Bearer ")
                .or_else(|| v.strip_prefix("bearer "))
        })
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(std::borrow::Cow::into_owned)
        .filter(|t| !t.is_empty())
}
