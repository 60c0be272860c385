use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::instrument;

use super::{
    dto::{CreateAttendanceRequest, ListQuery, UpdateAttendanceRequest},
    repo_types::Attendance,
    services,
};
use crate::{
    auth::{dto::MessageResponse, extractors::CurrentUser},
    error::AppResult,
    extract::{AppJson, AppQuery},
    state::AppState,
};

pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/attendances", get(list_attendances).post(create_attendance))
        .route(
            "/attendances/:id",
            put(update_attendance).delete(delete_attendance),
        )
}

#[instrument(skip(state, _caller))]
pub async fn list_attendances(
    State(state): State<AppState>,
    _caller: CurrentUser,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<Vec<Attendance>>> {
    Ok(Json(services::list(&state, &query).await?))
}

#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn create_attendance(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(body): AppJson<CreateAttendanceRequest>,
) -> AppResult<Json<Attendance>> {
    let created = services::create(&state, &user, body, OffsetDateTime::now_utc()).await?;
    Ok(Json(created))
}

#[instrument(skip(state, user, body), fields(user_id = %user.user_id))]
pub async fn update_attendance(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    AppJson(body): AppJson<UpdateAttendanceRequest>,
) -> AppResult<Json<Attendance>> {
    let updated = services::update(&state, &user, &id, body.into()).await?;
    Ok(Json(updated))
}

#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn delete_attendance(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    services::delete(&state, &user, &id).await?;
    Ok(Json(MessageResponse::new("Attendance deleted")))
}
