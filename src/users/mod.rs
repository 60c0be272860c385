use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod repo;
pub mod repo_types;

pub use repo::UserDirectory;
pub use repo_types::{NewUser, User};

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
