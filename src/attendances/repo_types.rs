use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Present,
    Remote,
    Absent,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Present => "present",
            Status::Remote => "remote",
            Status::Absent => "absent",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Status::Present),
            "remote" => Ok(Status::Remote),
            "absent" => Ok(Status::Absent),
            other => anyhow::bail!("unknown attendance status {other:?}"),
        }
    }
}

/// Attendance row as stored; `status` is plain text in the table.
#[derive(Debug, FromRow)]
pub struct AttendanceRow {
    pub attendance_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_picture: Option<String>,
    pub date: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub attendance_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_picture: Option<String>,
    /// `YYYY-MM-DD`
    pub date: String,
    pub status: Status,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<AttendanceRow> for Attendance {
    type Error = anyhow::Error;

    fn try_from(r: AttendanceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            attendance_id: r.attendance_id,
            user_id: r.user_id,
            user_name: r.user_name,
            user_picture: r.user_picture,
            date: r.date,
            status: r.status.parse()?,
            notes: r.notes,
            created_at: r.created_at,
        })
    }
}

/// Half-open `[start, end)` range over zero-padded date strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Changes applied by an update. `None` leaves the field untouched;
/// `notes: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendancePatch {
    pub status: Option<Status>,
    pub notes: Option<Option<String>>,
}
