use axum::Router;

use crate::state::AppState;

pub mod handlers;
pub mod store;
pub mod types;

pub fn router() -> Router<AppState> {
    handlers::router()
}
