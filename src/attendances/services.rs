use lazy_static::lazy_static;
use regex::Regex;
use time::{macros::format_description, Date, OffsetDateTime};
use tracing::{info, warn};

use super::{
    dto::{CreateAttendanceRequest, ListQuery},
    repo::ATTENDANCE_LIST_CAP,
    repo_types::{Attendance, AttendancePatch, DateRange},
};
use crate::{
    error::{AppError, AppResult},
    ids,
    state::AppState,
    users::User,
};

/// Accepts only real calendar dates written as zero-padded `YYYY-MM-DD`,
/// so that string order matches date order.
pub fn validate_date(date: &str) -> AppResult<()> {
    lazy_static! {
        static ref DATE_RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    }
    let bad = || AppError::BadRequest(format!("Invalid date {date:?}, expected YYYY-MM-DD"));
    if !DATE_RE.is_match(date) {
        return Err(bad());
    }
    Date::parse(date, format_description!("[year]-[month]-[day]")).map_err(|_| bad())?;
    Ok(())
}

/// `[YYYY-MM-01, next-month-01)`.
pub fn month_range(year: i32, month: u32) -> AppResult<DateRange> {
    if !(1..=12).contains(&month) {
        return Err(AppError::BadRequest(format!("Invalid month {month}")));
    }
    if !(1..=9999).contains(&year) {
        return Err(AppError::BadRequest(format!("Invalid year {year}")));
    }
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    Ok(DateRange {
        start: format!("{year:04}-{month:02}-01"),
        end: format!("{next_year:04}-{next_month:02}-01"),
    })
}

/// Office-wide listing: every user's records, optionally limited to one month.
pub async fn list(state: &AppState, query: &ListQuery) -> AppResult<Vec<Attendance>> {
    // Zero means "unset", as an absent parameter does.
    let range = match (query.year, query.month) {
        (Some(year), Some(month)) if year != 0 && month != 0 => Some(month_range(year, month)?),
        _ => None,
    };
    Ok(state
        .attendances
        .list(range.as_ref(), ATTENDANCE_LIST_CAP)
        .await?)
}

pub async fn create(
    state: &AppState,
    owner: &User,
    req: CreateAttendanceRequest,
    now: OffsetDateTime,
) -> AppResult<Attendance> {
    validate_date(&req.date)?;

    let record = Attendance {
        attendance_id: ids::attendance_id(),
        user_id: owner.user_id.clone(),
        user_name: owner.name.clone(),
        user_picture: owner.picture.clone(),
        date: req.date,
        status: req.status,
        notes: req.notes,
        created_at: now,
    };
    let date = record.date.clone();

    match state.attendances.insert(record).await? {
        Some(created) => {
            info!(
                attendance_id = %created.attendance_id,
                user_id = %owner.user_id,
                date = %created.date,
                status = %created.status,
                "attendance created"
            );
            Ok(created)
        }
        None => {
            warn!(user_id = %owner.user_id, %date, "duplicate attendance");
            Err(AppError::Conflict("Attendance already exists for this date".into()))
        }
    }
}

pub async fn update(
    state: &AppState,
    owner: &User,
    attendance_id: &str,
    patch: AttendancePatch,
) -> AppResult<Attendance> {
    state
        .attendances
        .update_owned(attendance_id, &owner.user_id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Attendance not found".into()))
}

pub async fn delete(state: &AppState, owner: &User, attendance_id: &str) -> AppResult<()> {
    if state
        .attendances
        .delete_owned(attendance_id, &owner.user_id)
        .await?
    {
        info!(%attendance_id, user_id = %owner.user_id, "attendance deleted");
        Ok(())
    } else {
        Err(AppError::NotFound("Attendance not found".into()))
    }
}
