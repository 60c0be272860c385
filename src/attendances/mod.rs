mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
mod services;

use crate::state::AppState;
use axum::Router;

pub use repo::AttendanceLedger;

pub fn router() -> Router<AppState> {
    handlers::attendance_routes()
}
