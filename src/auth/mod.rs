use axum::Router;

use crate::state::AppState;

pub mod cookie;
pub mod gate;
pub mod handlers;
pub mod password;
pub mod session;

pub fn router() -> Router<AppState> {
    handlers::router()
}
