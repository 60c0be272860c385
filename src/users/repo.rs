use async_trait::async_trait;

use super::repo_types::{NewUser, User};
use crate::db::PgStore;

/// Maximum number of users returned by a directory listing.
pub const USER_LIST_CAP: i64 = 1000;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Insert a user keyed by email, or refresh `name`/`picture` of the
    /// existing one. Returns the stored record.
    async fn upsert_by_email(&self, user: NewUser) -> anyhow::Result<User>;
    async fn find_by_id(&self, user_id: &str) -> anyhow::Result<Option<User>>;
    async fn list(&self, limit: i64) -> anyhow::Result<Vec<User>>;
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn upsert_by_email(&self, user: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, email, name, picture, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO UPDATE
               SET name = EXCLUDED.name,
                   picture = EXCLUDED.picture
            RETURNING user_id, email, name, picture, created_at
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.picture)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, user_id: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, email, name, picture, created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list(&self, limit: i64) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, email, name, picture, created_at
            FROM users
            ORDER BY created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
