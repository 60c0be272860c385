use async_trait::async_trait;
use time::OffsetDateTime;

use super::repo_types::{Session, SessionLookup};
use crate::db::PgStore;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: Session) -> anyhow::Result<()>;

    /// Resolve `token` as of `now`. An expired session is deleted before
    /// `Expired` is returned.
    async fn lookup(&self, token: &str, now: OffsetDateTime) -> anyhow::Result<SessionLookup>;

    /// Returns whether a session was removed.
    async fn delete(&self, token: &str) -> anyhow::Result<bool>;
}

#[async_trait]
impl SessionStore for PgStore {
    async fn insert(&self, session: Session) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (session_token, user_id, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&session.session_token)
        .bind(&session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn lookup(&self, token: &str, now: OffsetDateTime) -> anyhow::Result<SessionLookup> {
        let evicted = sqlx::query_scalar::<_, String>(
            r#"
            DELETE FROM sessions
             WHERE session_token = $1 AND expires_at < $2
            RETURNING session_token
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        if evicted.is_some() {
            return Ok(SessionLookup::Expired);
        }

        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT session_token, user_id, created_at, expires_at
              FROM sessions
             WHERE session_token = $1 AND expires_at >= $2
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match session {
            Some(s) => SessionLookup::Active(s),
            None => SessionLookup::Missing,
        })
    }

    async fn delete(&self, token: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM sessions WHERE session_token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
