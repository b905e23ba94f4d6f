use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tracing::instrument;

use super::pipeline::{replace_avatar, IncomingAvatar};
use crate::auth::gate::CurrentUser;
use crate::auth::handlers::HX_LOCATION;
use crate::error::AppError;
use crate::pages;
use crate::state::AppState;
use crate::storage::is_safe_key;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload-avatar", get(upload_page))
        .route(
            "/upload-avatar",
            post(upload_avatar).layer(DefaultBodyLimit::max(20 * 1024 * 1024)),
        )
        .route("/uploads/:file", get(serve_upload))
}

async fn upload_page(CurrentUser(user): CurrentUser) -> Html<String> {
    Html(pages::upload_form(&user))
}

/// POST /upload-avatar (multipart, field `avatar`).
#[instrument(skip(state, mp), fields(user_id = %user.id))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut mp: Multipart,
) -> Result<(StatusCode, HeaderMap), AppError> {
    let mut upload: Option<IncomingAvatar> = None;
    while let Ok(Some(field)) = mp.next_field().await {
        if field.name() != Some("avatar") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let body = field
            .bytes()
            .await
            .map_err(|_| AppError::validation("Error retrieving the file"))?;
        upload = Some(IncomingAvatar { file_name, body });
        break;
    }

    replace_avatar(
        state.store.as_ref(),
        state.storage.as_ref(),
        &user,
        upload,
        state.config.upload.max_bytes,
    )
    .await?;

    let mut headers = HeaderMap::new();
    headers.insert(HX_LOCATION, "/".parse().unwrap());
    Ok((StatusCode::NO_CONTENT, headers))
}

/// GET /uploads/{file} — raw bytes of a stored avatar.
#[instrument(skip(state))]
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    if !is_safe_key(&file) {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }
    match state.storage.get_object(&file).await? {
        Some(body) => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type_for(&file))],
            body,
        )
            .into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

fn content_type_for(file: &str) -> &'static str {
    match std::path::Path::new(file)
        .extension()
        .and_then(|e| e.to_str())
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
