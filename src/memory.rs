//! In-memory stores and a scripted identity exchange for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::{OffsetDateTime, UtcOffset};

use crate::{
    attendances::{
        repo_types::{Attendance, AttendancePatch, DateRange},
        AttendanceLedger,
    },
    auth::{
        repo_types::{Session, SessionLookup},
        SessionStore,
    },
    identity::{validate_profile, IdentityExchange, IdentityProfile},
    users::{NewUser, User, UserDirectory},
};

/// Same comparison the `sessions` table makes on TIMESTAMPTZ: both sides in UTC.
fn is_expired(session: &Session, now: OffsetDateTime) -> bool {
    session.expires_at.to_offset(UtcOffset::UTC) < now.to_offset(UtcOffset::UTC)
}

fn in_range(range: &DateRange, date: &str) -> bool {
    range.start.as_str() <= date && date < range.end.as_str()
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    sessions: HashMap<String, Session>,
    attendances: Vec<Attendance>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn has_session(&self, token: &str) -> bool {
        self.inner.lock().unwrap().sessions.contains_key(token)
    }

    pub fn user_count(&self) -> usize {
        self.inner.lock().unwrap().users.len()
    }

    pub fn attendance_count(&self) -> usize {
        self.inner.lock().unwrap().attendances.len()
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn upsert_by_email(&self, user: NewUser) -> anyhow::Result<User> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner.users.iter_mut().find(|u| u.email == user.email) {
            existing.name = user.name;
            existing.picture = user.picture;
            return Ok(existing.clone());
        }
        let created = User {
            user_id: user.user_id,
            email: user.email,
            name: user.name,
            picture: user.picture,
            created_at: user.created_at,
        };
        inner.users.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, user_id: &str) -> anyhow::Result<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn list(&self, limit: i64) -> anyhow::Result<Vec<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().take(limit as usize).cloned().collect())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert(&self, session: Session) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        anyhow::ensure!(
            !inner.sessions.contains_key(&session.session_token),
            "duplicate session token"
        );
        inner.sessions.insert(session.session_token.clone(), session);
        Ok(())
    }

    async fn lookup(&self, token: &str, now: OffsetDateTime) -> anyhow::Result<SessionLookup> {
        let mut inner = self.inner.lock().unwrap();
        let Some(session) = inner.sessions.get(token) else {
            return Ok(SessionLookup::Missing);
        };
        if is_expired(session, now) {
            inner.sessions.remove(token);
            return Ok(SessionLookup::Expired);
        }
        Ok(SessionLookup::Active(session.clone()))
    }

    async fn delete(&self, token: &str) -> anyhow::Result<bool> {
        Ok(self.inner.lock().unwrap().sessions.remove(token).is_some())
    }
}

#[async_trait]
impl AttendanceLedger for MemoryStore {
    async fn list(&self, range: Option<&DateRange>, limit: i64) -> anyhow::Result<Vec<Attendance>> {
        let inner = self.inner.lock().unwrap();
        let mut out: Vec<Attendance> = inner
            .attendances
            .iter()
            .filter(|a| range.map_or(true, |r| in_range(r, &a.date)))
            .cloned()
            .collect();
        out.sort_by(|a, b| (&a.date, a.created_at).cmp(&(&b.date, b.created_at)));
        out.truncate(limit as usize);
        Ok(out)
    }

    async fn insert(&self, record: Attendance) -> anyhow::Result<Option<Attendance>> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .attendances
            .iter()
            .any(|a| a.user_id == record.user_id && a.date == record.date)
        {
            return Ok(None);
        }
        inner.attendances.push(record.clone());
        Ok(Some(record))
    }

    async fn update_owned(
        &self,
        attendance_id: &str,
        user_id: &str,
        patch: &AttendancePatch,
    ) -> anyhow::Result<Option<Attendance>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(rec) = inner
            .attendances
            .iter_mut()
            .find(|a| a.attendance_id == attendance_id && a.user_id == user_id)
        else {
            return Ok(None);
        };
        if let Some(status) = patch.status {
            rec.status = status;
        }
        if let Some(notes) = &patch.notes {
            rec.notes = notes.clone();
        }
        Ok(Some(rec.clone()))
    }

    async fn delete_owned(&self, attendance_id: &str, user_id: &str) -> anyhow::Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.attendances.len();
        inner
            .attendances
            .retain(|a| !(a.attendance_id == attendance_id && a.user_id == user_id));
        Ok(inner.attendances.len() != before)
    }
}

/// Identity exchange answering from a table of registered session ids.
#[derive(Default)]
pub struct FakeIdentity {
    profiles: Mutex<HashMap<String, IdentityProfile>>,
}

impl FakeIdentity {
    pub fn register(&self, session_id: &str, profile: IdentityProfile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(session_id.to_string(), profile);
    }
}

#[async_trait]
impl IdentityExchange for FakeIdentity {
    async fn exchange(&self, session_id: &str) -> anyhow::Result<IdentityProfile> {
        let profile = self
            .profiles
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("HTTP status client error (401 Unauthorized)"))?;
        validate_profile(&profile)?;
        Ok(profile)
    }
}
