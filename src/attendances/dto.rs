use serde::{Deserialize, Deserializer};

use super::repo_types::{AttendancePatch, Status};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAttendanceRequest {
    pub date: String,
    pub status: Status,
    #[serde(default)]
    pub notes: Option<String>,
}

/// `notes` distinguishes "absent" (unchanged) from `null` (clear).
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAttendanceRequest {
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "provided")]
    pub notes: Option<Option<String>>,
}

fn provided<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(d).map(Some)
}

impl From<UpdateAttendanceRequest> for AttendancePatch {
    fn from(r: UpdateAttendanceRequest) -> Self {
        Self {
            status: r.status,
            notes: r.notes,
        }
    }
}
