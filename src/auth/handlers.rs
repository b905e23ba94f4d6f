use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Form, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use time::macros::date;
use tracing::{info, instrument, warn};

use super::cookie::{build_clear_cookie, build_session_cookie, extract_cookie_value};
use super::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::pages;
use crate::profile::types::NewUser;
use crate::state::AppState;

/// htmx client-side redirect header; successful form posts answer 204 with
/// this set instead of re-rendering the form.
pub const HX_LOCATION: HeaderName = HeaderName::from_static("hx-location");

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

async fn register_page() -> Html<String> {
    Html(pages::register_form())
}

async fn login_page() -> Html<String> {
    Html(pages::login_form())
}

#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Form(mut form): Form<RegisterForm>,
) -> Result<(StatusCode, HeaderMap), AppError> {
    form.email = form.email.trim().to_lowercase();

    let mut messages = Vec::new();
    if form.name.is_empty() {
        messages.push("Name is required.".to_string());
    }
    if form.email.is_empty() {
        messages.push("Email is required.".to_string());
    } else if !is_valid_email(&form.email) {
        messages.push("Email is invalid.".to_string());
    }
    if form.password.is_empty() {
        messages.push("Password is required.".to_string());
    }
    if !messages.is_empty() {
        return Err(AppError::Validation(messages));
    }

    // The unique constraint on email still backstops this check; losing the
    // race surfaces as a storage error.
    if state.store.find_by_email(&form.email).await?.is_some() {
        warn!(email = %form.email, "email already registered");
        return Err(AppError::validation("Email is already registered."));
    }

    let password_hash = hash_password(&form.password)?;

    let user = state
        .store
        .create(NewUser {
            email: form.email,
            password_hash,
            name: form.name,
            category: form.category,
            dob: date!(2001 - 01 - 01),
            bio: "Bio goes here".to_string(),
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");

    let mut headers = HeaderMap::new();
    headers.insert(HX_LOCATION, "/login".parse().unwrap());
    Ok((StatusCode::NO_CONTENT, headers))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(mut form): Form<LoginForm>,
) -> Result<(StatusCode, HeaderMap), AppError> {
    form.email = form.email.trim().to_lowercase();

    let mut messages = Vec::new();
    if form.email.is_empty() {
        messages.push("Email is required.".to_string());
    }
    if form.password.is_empty() {
        messages.push("Password is required.".to_string());
    }
    if !messages.is_empty() {
        return Err(AppError::Validation(messages));
    }

    // Unknown email and wrong password are indistinguishable to the caller.
    let Some(user) = state.store.find_by_email(&form.email).await? else {
        warn!("login with unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&form.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.sessions.create(user.id)?;
    let cookie = build_session_cookie(&state.config.session, &token, state.sessions.ttl());

    info!(user_id = %user.id, "user logged in");

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, cookie.parse().unwrap());
    headers.insert(HX_LOCATION, "/".parse().unwrap());
    Ok((StatusCode::NO_CONTENT, headers))
}

/// Revokes whatever token the cookie carries (a no-op for junk), clears the
/// cookie, and sends the visitor back to the login page.
#[instrument(skip(state, headers))]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let token = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| extract_cookie_value(h, &state.config.session.cookie_name));
    if let Some(token) = token {
        state.sessions.revoke(&token);
    }

    (
        [(header::SET_COOKIE, build_clear_cookie(&state.config.session))],
        Redirect::to("/login"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_form(email: &str) -> RegisterForm {
        RegisterForm {
            name: "Alice".into(),
            email: email.into(),
            password: "pw123".into(),
            category: "1".into(),
        }
    }

    #[test]
    fn email_regex_accepts_and_rejects() {
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@nodomain"));
        assert!(!is_valid_email("a b@example.com"));
    }

    #[tokio::test]
    async fn register_rejects_missing_fields_with_message_list() {
        let state = AppState::fake();
        let err = register(
            State(state),
            Form(RegisterForm {
                name: String::new(),
                email: String::new(),
                password: String::new(),
                category: String::new(),
            }),
        )
        .await
        .unwrap_err();

        match err {
            AppError::Validation(messages) => {
                assert!(messages.contains(&"Name is required.".to_string()));
                assert!(messages.contains(&"Email is required.".to_string()));
                assert!(messages.contains(&"Password is required.".to_string()));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_then_login_issues_a_session_cookie() {
        let state = AppState::fake();
        let (status, _) = register(State(state.clone()), Form(register_form("alice@example.com")))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        // stored hash verifies against the original and is not the plaintext
        let stored = state
            .store
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, "pw123");
        assert!(verify_password("pw123", &stored.password_hash).unwrap());

        let (status, headers) = login(
            State(state.clone()),
            Form(LoginForm {
                email: "alice@example.com".into(),
                password: "pw123".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("HttpOnly"));
        let token = extract_cookie_value(cookie, "session").unwrap();
        assert_eq!(state.sessions.resolve(&token), Some(stored.id));
    }

    #[tokio::test]
    async fn duplicate_email_registers_exactly_once() {
        let state = AppState::fake();
        register(State(state.clone()), Form(register_form("bob@example.com")))
            .await
            .unwrap();

        let err = register(State(state.clone()), Form(register_form("bob@example.com")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // exactly one user with that email exists afterward
        assert!(state
            .store
            .find_by_email("bob@example.com")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let state = AppState::fake();
        register(State(state.clone()), Form(register_form("carol@example.com")))
            .await
            .unwrap();

        let wrong_password = login(
            State(state.clone()),
            Form(LoginForm {
                email: "carol@example.com".into(),
                password: "nope".into(),
            }),
        )
        .await
        .unwrap_err();

        let unknown_email = login(
            State(state.clone()),
            Form(LoginForm {
                email: "nobody@example.com".into(),
                password: "nope".into(),
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_email, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }
}
