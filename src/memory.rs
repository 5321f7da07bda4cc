//! In-memory `AcademyStore` for tests. Mirrors the Postgres semantics that
//! matter: unique email, active-only name lookup with lowest-id tie-break.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::customers::repo_types::{NewUser, User, UserId, UserStatus};
use crate::db::{round2, AcademyStore, StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    users: Mutex<Vec<User>>,
    progress: Mutex<Vec<f64>>,
    failing: AtomicBool,
    blind_email_lookup: AtomicBool,
    calls: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn with_progress(self, values: &[f64]) -> Self {
        self.inner.progress.lock().unwrap().extend_from_slice(values);
        self
    }

    /// Every subsequent call fails like a dropped connection.
    pub fn failing(self) -> Self {
        self.inner.failing.store(true, Ordering::SeqCst);
        self
    }

    /// `find_user_by_email` always misses, as if another request inserted
    /// the row between the lookup and the insert.
    pub fn blind_email_lookup(self) -> Self {
        self.inner.blind_email_lookup.store(true, Ordering::SeqCst);
        self
    }

    pub fn push_user(&self, user: NewUser, status: UserStatus) -> UserId {
        append(&mut self.inner.users.lock().unwrap(), user, status)
    }

    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    pub fn user_count(&self) -> usize {
        self.inner.users.lock().unwrap().len()
    }

    fn enter(&self) -> StoreResult<()> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn append(users: &mut Vec<User>, user: NewUser, status: UserStatus) -> UserId {
    let id = users.len() as UserId + 1;
    users.push(User {
        id,
        name: user.name,
        gender: user.gender,
        email: user.email,
        phone: user.phone,
        status,
        created_at: OffsetDateTime::now_utc(),
    });
    id
}

#[async_trait]
impl AcademyStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.enter()?;
        if self.inner.blind_email_lookup.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let users = self.inner.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: &NewUser) -> StoreResult<UserId> {
        self.enter()?;
        // Check and insert under one guard, like the unique constraint.
        let mut users = self.inner.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateKey);
        }
        Ok(append(&mut users, user.clone(), UserStatus::Active))
    }

    async fn find_user_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        self.enter()?;
        let users = self.inner.users.lock().unwrap();
        Ok(users
            .iter()
            .filter(|u| u.name == name && u.status == UserStatus::Active)
            .min_by_key(|u| u.id)
            .cloned())
    }

    async fn count_active_users(&self) -> StoreResult<i64> {
        self.enter()?;
        let users = self.inner.users.lock().unwrap();
        Ok(users.iter().filter(|u| u.status == UserStatus::Active).count() as i64)
    }

    async fn count_progress_rows(&self) -> StoreResult<i64> {
        self.enter()?;
        Ok(self.inner.progress.lock().unwrap().len() as i64)
    }

    async fn average_progress(&self) -> StoreResult<f64> {
        self.enter()?;
        let progress = self.inner.progress.lock().unwrap();
        if progress.is_empty() {
            return Ok(0.0);
        }
        Ok(round2(progress.iter().sum::<f64>() / progress.len() as f64))
    }
}
