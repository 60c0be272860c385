use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use super::repo_types::{Session, SessionLookup};
use crate::{
    error::{AppError, AppResult},
    ids,
    state::AppState,
    users::{NewUser, User},
};

/// Pick the request credential: the session cookie wins over a bearer header.
pub fn extract_credential(cookie: Option<&str>, authorization: Option<&str>) -> Option<String> {
    if let Some(token) = cookie.filter(|t| !t.is_empty()) {
        return Some(token.to_string());
    }
    authorization
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

/// Resolve a credential to its user. The only side effect is deleting an
/// expired session.
pub async fn authenticate(
    state: &AppState,
    token: Option<&str>,
    now: OffsetDateTime,
) -> AppResult<User> {
    let token = token.ok_or_else(|| AppError::Unauthenticated("Not authenticated".into()))?;

    let session = match state.sessions.lookup(token, now).await? {
        SessionLookup::Active(session) => session,
        SessionLookup::Missing => {
            warn!("unknown session token");
            return Err(AppError::Unauthenticated("Invalid session".into()));
        }
        SessionLookup::Expired => {
            info!("expired session evicted");
            return Err(AppError::Unauthenticated("Session expired".into()));
        }
    };

    match state.users.find_by_id(&session.user_id).await? {
        Some(user) => {
            debug!(user_id = %user.user_id, "session resolved");
            Ok(user)
        }
        None => {
            warn!(user_id = %session.user_id, "session references missing user");
            Err(AppError::NotFound("User not found".into()))
        }
    }
}

#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub session: Session,
}

/// Exchange a one-time session id, upsert the user by email and open a new session.
pub async fn login(state: &AppState, session_id: &str, now: OffsetDateTime) -> AppResult<LoginOutcome> {
    let profile = state.identity.exchange(session_id).await.map_err(|e| {
        let reason = format!("{e:#}");
        warn!(error = %reason, "identity exchange failed");
        AppError::BadRequest(format!("Auth failed: {reason}"))
    })?;

    let user = state
        .users
        .upsert_by_email(NewUser {
            user_id: ids::user_id(),
            email: profile.email,
            name: profile.name,
            picture: profile.picture,
            created_at: now,
        })
        .await?;

    let session = Session {
        session_token: profile.session_token,
        user_id: user.user_id.clone(),
        created_at: now,
        expires_at: now + session_ttl(state),
    };
    state.sessions.insert(session.clone()).await?;

    info!(user_id = %user.user_id, email = %user.email, "user logged in");
    Ok(LoginOutcome { user, session })
}

pub fn session_ttl(state: &AppState) -> Duration {
    Duration::days(state.config.identity.session_ttl_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentityProfile;
    use crate::memory::{FakeIdentity, MemoryStore};
    use std::sync::Arc;

    fn profile(email: &str, name: &str, picture: Option<&str>, token: &str) -> IdentityProfile {
        IdentityProfile {
            email: email.into(),
            name: name.into(),
            picture: picture.map(String::from),
            session_token: token.into(),
        }
    }

    fn setup() -> (AppState, Arc<MemoryStore>, Arc<FakeIdentity>) {
        let store = Arc::new(MemoryStore::default());
        let identity = Arc::new(FakeIdentity::default());
        let state = AppState::fake_with(store.clone(), identity.clone());
        (state, store, identity)
    }

    #[test]
    fn cookie_takes_priority_over_bearer() {
        assert_eq!(
            extract_credential(Some("cookie-tok"), Some("Bearer header-tok")).as_deref(),
            Some("cookie-tok")
        );
        assert_eq!(
            extract_credential(None, Some("Bearer header-tok")).as_deref(),
            Some("header-tok")
        );
        assert_eq!(
            extract_credential(Some(""), Some("Bearer header-tok")).as_deref(),
            Some("header-tok")
        );
        assert_eq!(extract_credential(None, Some("Basic abc")), None);
        assert_eq!(extract_credential(None, Some("Bearer ")), None);
        assert_eq!(extract_credential(None, None), None);
    }

    #[tokio::test]
    async fn missing_credential_is_unauthenticated() {
        let (state, _, _) = setup();
        let err = authenticate(&state, None, OffsetDateTime::now_utc())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(ref m) if m == "Not authenticated"));
    }

    #[tokio::test]
    async fn unknown_token_is_invalid_session() {
        let (state, _, _) = setup();
        let err = authenticate(&state, Some("nope"), OffsetDateTime::now_utc())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(ref m) if m == "Invalid session"));
    }

    #[tokio::test]
    async fn valid_session_resolves_user_and_is_kept() {
        let (state, store, identity) = setup();
        identity.register("sid", profile("ada@example.com", "Ada", None, "tok-1"));
        let now = OffsetDateTime::now_utc();
        let outcome = login(&state, "sid", now).await.unwrap();

        let user = authenticate(&state, Some("tok-1"), now).await.unwrap();
        assert_eq!(user.user_id, outcome.user.user_id);
        assert_eq!(user.user_id, outcome.session.user_id);
        assert!(store.has_session("tok-1"));
    }

    #[tokio::test]
    async fn expired_session_is_deleted() {
        let (state, store, identity) = setup();
        identity.register("sid", profile("ada@example.com", "Ada", None, "tok-old"));
        let then = OffsetDateTime::now_utc() - Duration::days(30);
        login(&state, "sid", then).await.unwrap();

        let now = OffsetDateTime::now_utc();
        let err = authenticate(&state, Some("tok-old"), now).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(ref m) if m == "Session expired"));
        assert!(!store.has_session("tok-old"));

        let again = authenticate(&state, Some("tok-old"), now).await.unwrap_err();
        assert!(matches!(again, AppError::Unauthenticated(ref m) if m == "Invalid session"));
    }

    #[tokio::test]
    async fn session_for_missing_user_is_not_found() {
        let (state, _, _) = setup();
        let now = OffsetDateTime::now_utc();
        state
            .sessions
            .insert(Session {
                session_token: "orphan".into(),
                user_id: "user_gone".into(),
                created_at: now,
                expires_at: now + Duration::days(1),
            })
            .await
            .unwrap();
        let err = authenticate(&state, Some("orphan"), now).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn repeat_login_updates_profile_and_keeps_id() {
        let (state, store, identity) = setup();
        identity.register("first", profile("ada@example.com", "Ada", Some("https://p/1"), "tok-1"));
        identity.register("second", profile("ada@example.com", "Ada L.", Some("https://p/2"), "tok-2"));

        let t0 = OffsetDateTime::now_utc();
        let first = login(&state, "first", t0).await.unwrap();
        let second = login(&state, "second", t0 + Duration::minutes(5)).await.unwrap();

        assert_eq!(first.user.user_id, second.user.user_id);
        assert_eq!(second.user.name, "Ada L.");
        assert_eq!(second.user.picture.as_deref(), Some("https://p/2"));
        assert_eq!(second.user.created_at, first.user.created_at);
        assert_eq!(store.user_count(), 1);
        assert!(store.has_session("tok-1"));
        assert!(store.has_session("tok-2"));
    }

    #[tokio::test]
    async fn email_is_stored_as_exchanged() {
        let (state, store, identity) = setup();
        identity.register("upper", profile("Ada@Example.com", "Ada", None, "tok-1"));
        identity.register("lower", profile("ada@example.com", "Ada", None, "tok-2"));
        let now = OffsetDateTime::now_utc();

        let upper = login(&state, "upper", now).await.unwrap();
        let lower = login(&state, "lower", now).await.unwrap();

        assert_eq!(upper.user.email, "Ada@Example.com");
        assert_ne!(upper.user.user_id, lower.user.user_id);
        assert_eq!(store.user_count(), 2);
    }

    #[tokio::test]
    async fn login_sets_seven_day_expiry() {
        let (state, _, identity) = setup();
        identity.register("sid", profile("ada@example.com", "Ada", None, "tok"));
        let now = OffsetDateTime::now_utc();
        let outcome = login(&state, "sid", now).await.unwrap();
        assert_eq!(outcome.session.expires_at - outcome.session.created_at, Duration::days(7));
    }

    #[tokio::test]
    async fn failed_exchange_is_bad_request() {
        let (state, store, _) = setup();
        let err = login(&state, "unknown", OffsetDateTime::now_utc())
            .await
            .unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert!(msg.starts_with("Auth failed:")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.user_count(), 0);
    }
}
