use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;
use time::OffsetDateTime;

use super::cookies::SESSION_COOKIE;
use super::services::{authenticate, extract_credential};
use crate::{error::AppError, state::AppState, users::User};

/// Reads the credential from the request (cookie first, then bearer header).
pub(crate) fn request_credential(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    let authorization = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    extract_credential(jar.get(SESSION_COOKIE).map(|c| c.value()), authorization)
}

/// The authenticated caller, resolved through the session store.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = request_credential(&parts.headers);
        let user = authenticate(state, token.as_deref(), OffsetDateTime::now_utc()).await?;
        Ok(CurrentUser(user))
    }
}
