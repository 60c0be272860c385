use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::{
    cookies::{clear_session_cookie, session_cookie},
    dto::{CallbackRequest, CallbackResponse, MessageResponse},
    extractors::{request_credential, CurrentUser},
    services::{login, session_ttl},
};
use crate::{
    error::{AppError, AppResult},
    extract::AppJson,
    state::AppState,
    users::User,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/callback", post(callback))
        .route("/auth/me", get(get_me))
        .route("/auth/logout", post(logout))
}

#[instrument(skip(state, jar, payload))]
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<CallbackRequest>,
) -> AppResult<(CookieJar, Json<CallbackResponse>)> {
    let session_id = payload
        .session_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            warn!("callback without session_id");
            AppError::BadRequest("Missing session_id".into())
        })?;

    let outcome = login(&state, &session_id, OffsetDateTime::now_utc()).await?;
    let cookie = session_cookie(&outcome.session.session_token, session_ttl(&state));
    Ok((jar.add(cookie), Json(CallbackResponse { user: outcome.user })))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    if let Some(token) = request_credential(&headers) {
        if state.sessions.delete(&token).await? {
            info!("session closed");
        }
    }
    Ok((jar.add(clear_session_cookie()), Json(MessageResponse::new("Logged out"))))
}
