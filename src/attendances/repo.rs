use async_trait::async_trait;

use super::repo_types::{Attendance, AttendancePatch, AttendanceRow, DateRange};
use crate::db::PgStore;

/// Maximum number of records returned by a listing.
pub const ATTENDANCE_LIST_CAP: i64 = 10_000;

#[async_trait]
pub trait AttendanceLedger: Send + Sync {
    async fn list(&self, range: Option<&DateRange>, limit: i64) -> anyhow::Result<Vec<Attendance>>;

    /// Returns `None` when the owner already has a record for that date.
    async fn insert(&self, record: Attendance) -> anyhow::Result<Option<Attendance>>;

    /// Returns `None` unless `attendance_id` exists and belongs to `user_id`.
    async fn update_owned(
        &self,
        attendance_id: &str,
        user_id: &str,
        patch: &AttendancePatch,
    ) -> anyhow::Result<Option<Attendance>>;

    async fn delete_owned(&self, attendance_id: &str, user_id: &str) -> anyhow::Result<bool>;
}

fn into_records(rows: Vec<AttendanceRow>) -> anyhow::Result<Vec<Attendance>> {
    rows.into_iter().map(Attendance::try_from).collect()
}

#[async_trait]
impl AttendanceLedger for PgStore {
    async fn list(&self, range: Option<&DateRange>, limit: i64) -> anyhow::Result<Vec<Attendance>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT attendance_id, user_id, user_name, user_picture, date, status, notes, created_at
              FROM attendances
             WHERE ($1::text IS NULL OR date >= $1)
               AND ($2::text IS NULL OR date < $2)
             ORDER BY date ASC, created_at ASC
             LIMIT $3
            "#,
        )
        .bind(range.map(|r| r.start.as_str()))
        .bind(range.map(|r| r.end.as_str()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        into_records(rows)
    }

    async fn insert(&self, record: Attendance) -> anyhow::Result<Option<Attendance>> {
        let row = sqlx::query_as::<_, AttendanceRow>(
            r#"
            INSERT INTO attendances
                (attendance_id, user_id, user_name, user_picture, date, status, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id, date) DO NOTHING
            RETURNING attendance_id, user_id, user_name, user_picture, date, status, notes, created_at
            "#,
        )
        .bind(&record.attendance_id)
        .bind(&record.user_id)
        .bind(&record.user_name)
        .bind(&record.user_picture)
        .bind(&record.date)
        .bind(record.status.as_str())
        .bind(&record.notes)
        .bind(record.created_at)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Attendance::try_from).transpose()
    }

    async fn update_owned(
        &self,
        attendance_id: &str,
        user_id: &str,
        patch: &AttendancePatch,
    ) -> anyhow::Result<Option<Attendance>> {
        let row = sqlx::query_as::<_, AttendanceRow>(
            r#"
            UPDATE attendances
               SET status = COALESCE($3, status),
                   notes  = CASE WHEN $4 THEN $5 ELSE notes END
             WHERE attendance_id = $1 AND user_id = $2
            RETURNING attendance_id, user_id, user_name, user_picture, date, status, notes, created_at
            "#,
        )
        .bind(attendance_id)
        .bind(user_id)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.notes.is_some())
        .bind(patch.notes.clone().flatten())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Attendance::try_from).transpose()
    }

    async fn delete_owned(&self, attendance_id: &str, user_id: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM attendances WHERE attendance_id = $1 AND user_id = $2")
            .bind(attendance_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
