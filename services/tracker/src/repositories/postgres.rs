//! PostgreSQL repositories

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{PgPool, migrate::Migrator};
use tracing::{debug, info};
use uuid::Uuid;

use super::{IntervalRepository, UserRepository};
use crate::{
    clock::Day,
    models::{NewInterval, NewUser, TimeInterval, UserAccount, hash_password},
};

/// Schema of the tracker tables
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Interval repository
#[derive(Clone)]
pub struct PgIntervalRepository {
    pool: PgPool,
}

impl PgIntervalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IntervalRepository for PgIntervalRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeInterval>> {
        let interval = sqlx::query_as::<_, TimeInterval>(
            r#"
            SELECT id, owner_id, start, stop
            FROM intervals
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(interval)
    }

    async fn find_most_recent(&self, owner_id: Uuid) -> Result<Option<TimeInterval>> {
        let interval = sqlx::query_as::<_, TimeInterval>(
            r#"
            SELECT id, owner_id, start, stop
            FROM intervals
            WHERE owner_id = $1
            ORDER BY start DESC, (stop IS NULL) DESC, id
            LIMIT 1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(interval)
    }

    async fn find_for_day(&self, owner_id: Uuid, day: &Day) -> Result<Vec<TimeInterval>> {
        debug!("Loading intervals of {} for {}", owner_id, day.date);

        let intervals = sqlx::query_as::<_, TimeInterval>(
            r#"
            SELECT id, owner_id, start, stop
            FROM intervals
            WHERE owner_id = $1 AND start >= $2 AND start < $3
            ORDER BY start ASC
            "#,
        )
        .bind(owner_id)
        .bind(day.start)
        .bind(day.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(intervals)
    }

    async fn count_for_owner(&self, owner_id: Uuid) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM intervals WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn create(&self, new_interval: &NewInterval) -> Result<TimeInterval> {
        let interval = sqlx::query_as::<_, TimeInterval>(
            r#"
            INSERT INTO intervals (id, owner_id, start, stop)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, start, stop
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_interval.owner_id)
        .bind(new_interval.start)
        .bind(new_interval.stop)
        .fetch_one(&self.pool)
        .await?;

        Ok(interval)
    }

    async fn update(&self, interval: &TimeInterval) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE intervals
            SET start = $2, stop = $3
            WHERE id = $1
            "#,
        )
        .bind(interval.id)
        .bind(interval.start)
        .bind(interval.stop)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// User repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>> {
        debug!("Finding user by username: {}", username);

        let user = sqlx::query_as::<_, UserAccount>(
            r#"
            SELECT id, username, password_hash, overtime, worktime, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>> {
        let user = sqlx::query_as::<_, UserAccount>(
            r#"
            SELECT id, username, password_hash, overtime, worktime, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, new_user: &NewUser) -> Result<UserAccount> {
        info!("Creating new user: {}", new_user.username);

        let password_hash = hash_password(&new_user.password)?;

        let user = sqlx::query_as::<_, UserAccount>(
            r#"
            INSERT INTO users (id, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, overtime, worktime, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_password(&self, user: &UserAccount) -> Result<bool> {
        info!("Updating password of user: {}", user.username);

        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
