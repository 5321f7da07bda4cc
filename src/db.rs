use async_trait::async_trait;
use sqlx::{Executor, PgPool};
use thiserror::Error;

use crate::customers::repo_types::{CustomerRow, NewUser, ParseEnumError, User, UserId, UserStatus};

const SCHEMA: &str = include_str!("../schema.sql");

#[derive(Debug, Error)]
pub enum StoreError {
    /// The email is already claimed by another row.
    #[error("duplicate key: email already exists")]
    DuplicateKey,

    #[error("corrupt row: {0}")]
    Corrupt(#[from] ParseEnumError),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateKey,
            _ => StoreError::Database(e),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations the request handlers need.
#[async_trait]
pub trait AcademyStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Fails with [`StoreError::DuplicateKey`] when the email is taken, even
    /// if a preceding `find_user_by_email` saw it free.
    async fn insert_user(&self, user: &NewUser) -> StoreResult<UserId>;
    /// Active users only. Names are not unique; the lowest id wins.
    async fn find_user_by_name(&self, name: &str) -> StoreResult<Option<User>>;
    async fn count_active_users(&self) -> StoreResult<i64>;
    async fn count_progress_rows(&self) -> StoreResult<i64>;
    /// Mean progress rounded to 2 decimals; `0.0` when there are no rows.
    async fn average_progress(&self) -> StoreResult<f64>;
}

pub(crate) fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

/// Applies the idempotent table definitions.
pub async fn ensure_schema(db: &PgPool) -> anyhow::Result<()> {
    db.execute(SCHEMA).await?;
    Ok(())
}

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AcademyStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r#"
            SELECT id, name, gender, email, phone, status, created_at
            FROM customers
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn insert_user(&self, user: &NewUser) -> StoreResult<UserId> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO customers (name, gender, email, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(user.gender.as_str())
        .bind(&user.email)
        .bind(&user.phone)
        .fetch_one(&self.db)
        .await?;
        Ok(id)
    }

    async fn find_user_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r#"
            SELECT id, name, gender, email, phone, status, created_at
            FROM customers
            WHERE name = $1 AND status = $2
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(name)
        .bind(UserStatus::Active.as_str())
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn count_active_users(&self) -> StoreResult<i64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers WHERE status = $1")
            .bind(UserStatus::Active.as_str())
            .fetch_one(&self.db)
            .await?;
        Ok(n)
    }

    async fn count_progress_rows(&self) -> StoreResult<i64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM course_progress")
            .fetch_one(&self.db)
            .await?;
        Ok(n)
    }

    async fn average_progress(&self) -> StoreResult<f64> {
        let avg = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(progress_percentage)::float8 FROM course_progress",
        )
        .fetch_one(&self.db)
        .await?;
        Ok(round2(avg.unwrap_or(0.0)))
    }
}
