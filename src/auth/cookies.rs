//! The `session_token` cookie set on login and cleared on logout.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

pub const SESSION_COOKIE: &str = "session_token";

/// Secure, http-only cookie usable from a cross-site frontend.
pub fn session_cookie(token: &str, ttl: Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE.to_string(), token.to_string()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/".to_string())
        .max_age(ttl)
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE.to_string(), String::new()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}
