use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::pages;

/// Request-level failure. Every variant is recoverable and rendered back to
/// the client; nothing on a request path may abort the process.
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more form fields failed validation. No state was committed.
    #[error("validation failed")]
    Validation(Vec<String>),

    /// Wrong credentials. Deliberately carries no detail about which part
    /// was wrong or whether the account exists.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Persistence or blob-storage failure.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(messages) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(pages::error_list(&messages)),
            )
                .into_response(),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Html(pages::error_list(&["Invalid email or password".into()])),
            )
                .into_response(),
            AppError::Storage(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(pages::error_list(&["Something went wrong.".into()])),
                )
                    .into_response()
            }
        }
    }
}
