use crate::state::AppState;
use axum::Router;

pub mod cookies;
pub(crate) mod dto;
pub mod extractors;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo::SessionStore;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
