use axum::Router;

use crate::state::AppState;

pub mod handlers;
pub mod pipeline;

pub fn router() -> Router<AppState> {
    handlers::router()
}
