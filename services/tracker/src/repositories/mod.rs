//! Persistence contracts for intervals and accounts
//!
//! The tracker only talks to these traits. [`postgres`] backs them with sqlx,
//! [`memory`] keeps everything in process for tests and local runs.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    clock::Day,
    models::{NewInterval, NewUser, TimeInterval, UserAccount},
};

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryIntervalRepository, InMemoryUserRepository};
pub use postgres::{PgIntervalRepository, PgUserRepository};

#[async_trait]
pub trait IntervalRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeInterval>>;

    /// The owner's interval with the latest `start`. Among equal starts an open
    /// interval wins, then the smallest id.
    async fn find_most_recent(&self, owner_id: Uuid) -> Result<Option<TimeInterval>>;

    /// The owner's intervals starting within `day`, oldest first
    async fn find_for_day(&self, owner_id: Uuid, day: &Day) -> Result<Vec<TimeInterval>>;

    async fn count_for_owner(&self, owner_id: Uuid) -> Result<u64>;

    /// Store a new interval; the repository assigns its id
    async fn create(&self, new_interval: &NewInterval) -> Result<TimeInterval>;

    /// Overwrite `start` and `stop`. Returns false when no such interval exists.
    async fn update(&self, interval: &TimeInterval) -> Result<bool>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>>;

    /// Create an account, hashing the plaintext password of `new_user`
    async fn create(&self, new_user: &NewUser) -> Result<UserAccount>;

    /// Persist `user.password_hash`. Returns false when no such account exists.
    async fn update_password(&self, user: &UserAccount) -> Result<bool>;
}
