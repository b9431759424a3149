mod dto;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod privacy;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::friend_routes()
}
