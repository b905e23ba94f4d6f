use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Html,
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use time::{format_description::FormatItem, macros::format_description, Date};
use tracing::{info, instrument};

use super::types::ProfileChanges;
use crate::auth::gate::{CurrentUser, MaybeUser};
use crate::auth::handlers::HX_LOCATION;
use crate::error::AppError;
use crate::pages;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/edit", get(edit_page))
        .route("/edit", post(update_profile))
}

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Deserialize)]
pub struct EditForm {
    pub name: String,
    #[serde(default)]
    pub bio: String,
    pub dob: String,
}

async fn home(MaybeUser(user): MaybeUser) -> Html<String> {
    Html(pages::home(user.as_ref()))
}

async fn edit_page(CurrentUser(user): CurrentUser) -> Html<String> {
    Html(pages::edit_form(&user))
}

/// Validate the edit form. The date must be `YYYY-MM-DD`.
fn validate_edit(form: &EditForm) -> Result<Date, Vec<String>> {
    let mut messages = Vec::new();
    if form.name.is_empty() {
        messages.push("Name is required.".to_string());
    }
    if form.dob.is_empty() {
        messages.push("Date of birth is required.".to_string());
    }

    let dob = if form.dob.is_empty() {
        None
    } else {
        match Date::parse(&form.dob, DATE_FORMAT) {
            Ok(d) => Some(d),
            Err(_) => {
                messages.push("Invalid date format.".to_string());
                None
            }
        }
    };

    match (messages.is_empty(), dob) {
        (true, Some(dob)) => Ok(dob),
        _ => Err(messages),
    }
}

#[instrument(skip(state, form), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<EditForm>,
) -> Result<(StatusCode, HeaderMap), AppError> {
    let dob = validate_edit(&form).map_err(AppError::Validation)?;

    // Category is not part of the form; the current value carries over.
    state
        .store
        .update_profile(
            user.id,
            ProfileChanges {
                name: form.name,
                category: user.category,
                dob,
                bio: form.bio,
            },
        )
        .await?;

    info!("profile updated");

    let mut headers = HeaderMap::new();
    headers.insert(HX_LOCATION, "/".parse().unwrap());
    Ok((StatusCode::NO_CONTENT, headers))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn form(name: &str, dob: &str) -> EditForm {
        EditForm {
            name: name.into(),
            bio: "hello".into(),
            dob: dob.into(),
        }
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = validate_edit(&form("", "1990-05-01")).unwrap_err();
        assert_eq!(err, vec!["Name is required.".to_string()]);
    }

    #[test]
    fn empty_and_malformed_dates_are_rejected() {
        let err = validate_edit(&form("Alice", "")).unwrap_err();
        assert_eq!(err, vec!["Date of birth is required.".to_string()]);

        let err = validate_edit(&form("Alice", "05/01/1990")).unwrap_err();
        assert_eq!(err, vec!["Invalid date format.".to_string()]);
    }

    #[test]
    fn valid_form_parses_the_date() {
        let dob = validate_edit(&form("Alice", "1990-05-01")).unwrap();
        assert_eq!(dob, date!(1990 - 05 - 01));
    }

    // Register → login → edit with empty name rejected → edit applied.
    #[tokio::test]
    async fn register_login_edit_scenario() {
        use crate::auth::handlers::{login, register, LoginForm, RegisterForm};

        let state = AppState::fake();
        register(
            State(state.clone()),
            Form(RegisterForm {
                name: "alice".into(),
                email: "alice@example.com".into(),
                password: "pw123".into(),
                category: "1".into(),
            }),
        )
        .await
        .unwrap();

        let (status, _) = login(
            State(state.clone()),
            Form(LoginForm {
                email: "alice@example.com".into(),
                password: "pw123".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let user = state
            .store
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();

        let err = update_profile(
            State(state.clone()),
            CurrentUser(user.clone()),
            Form(form("", "1990-05-01")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains(&"Name is required.".to_string())));

        let (status, _) = update_profile(
            State(state.clone()),
            CurrentUser(user.clone()),
            Form(form("Alice", "1990-05-01")),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let updated = state.store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(updated.name, "Alice");
        assert_eq!(updated.dob, date!(1990 - 05 - 01));
        assert_eq!(updated.category, user.category, "category carries over");
    }
}
