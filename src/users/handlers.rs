use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::repo::USER_LIST_CAP;
use super::repo_types::User;
use crate::{auth::extractors::CurrentUser, error::AppResult, state::AppState};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}

#[instrument(skip(state, _caller))]
pub async fn list_users(
    State(state): State<AppState>,
    _caller: CurrentUser,
) -> AppResult<Json<Vec<User>>> {
    let users = state.users.list(USER_LIST_CAP).await?;
    Ok(Json(users))
}
