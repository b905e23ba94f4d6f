use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{debug, error};

use super::cookie::{build_clear_cookie, extract_cookie_value};
use super::session::SessionManager;
use crate::pages;
use crate::profile::store::ProfileStore;
use crate::profile::types::User;
use crate::state::AppState;

/// Extractor resolving the session cookie to the authenticated user.
/// Protected handlers take this as an argument; unauthenticated requests
/// never reach them.
pub struct CurrentUser(pub User);

/// Variant for routes that render for everyone but personalize when a
/// session is present. Never rejects with a redirect.
pub struct MaybeUser(pub Option<User>);

/// Why the gate refused a request. The decision of how to answer lives
/// here at the boundary, not in the resolution logic: unauthenticated
/// visitors are sent to the login page, storage trouble is a plain 500.
pub enum GateRejection {
    Unauthenticated { clear_cookie: String },
    Internal,
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            GateRejection::Unauthenticated { clear_cookie } => (
                [(header::SET_COOKIE, clear_cookie)],
                Redirect::to("/login"),
            )
                .into_response(),
            GateRejection::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::error_list(&["Something went wrong.".into()])),
            )
                .into_response(),
        }
    }
}

/// Cookie header → session token → user record.
///
/// `Ok(None)` is the single unauthenticated signal: missing cookie,
/// malformed/expired/revoked token, and token-for-a-deleted-user all land
/// there indistinguishably. In the deleted-user case the token is revoked
/// before returning. `Err` is reserved for storage failures.
pub(crate) async fn resolve_request(
    sessions: &SessionManager,
    store: &dyn ProfileStore,
    cookie_name: &str,
    cookie_header: Option<&str>,
) -> anyhow::Result<Option<User>> {
    let Some(token) = cookie_header.and_then(|h| extract_cookie_value(h, cookie_name)) else {
        return Ok(None);
    };
    let Some(user_id) = sessions.resolve(&token) else {
        return Ok(None);
    };
    match store.find_by_id(user_id).await? {
        Some(user) => Ok(Some(user)),
        None => {
            // The user vanished after the session was issued; the session
            // is invalid from here on.
            debug!(user_id = %user_id, "session references a deleted user, revoking");
            sessions.revoke(&token);
            Ok(None)
        }
    }
}

fn cookie_header(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = GateRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let resolved = resolve_request(
            &state.sessions,
            state.store.as_ref(),
            &state.config.session.cookie_name,
            cookie_header(parts),
        )
        .await
        .map_err(|e| {
            error!(error = %e, "auth gate store failure");
            GateRejection::Internal
        })?;

        match resolved {
            Some(user) => Ok(CurrentUser(user)),
            None => Err(GateRejection::Unauthenticated {
                clear_cookie: build_clear_cookie(&state.config.session),
            }),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = GateRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let resolved = resolve_request(
            &state.sessions,
            state.store.as_ref(),
            &state.config.session.cookie_name,
            cookie_header(parts),
        )
        .await
        .map_err(|e| {
            error!(error = %e, "auth gate store failure");
            GateRejection::Internal
        })?;
        Ok(MaybeUser(resolved))
    }
}
