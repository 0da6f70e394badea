//! In-memory repositories for tests and local development

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::{cmp::Reverse, collections::HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{IntervalRepository, UserRepository};
use crate::{
    clock::Day,
    models::{NewInterval, NewUser, TimeInterval, UserAccount, hash_password},
};

#[derive(Default)]
pub struct InMemoryIntervalRepository {
    intervals: RwLock<HashMap<Uuid, TimeInterval>>,
}

impl InMemoryIntervalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IntervalRepository for InMemoryIntervalRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeInterval>> {
        Ok(self.intervals.read().await.get(&id).cloned())
    }

    async fn find_most_recent(&self, owner_id: Uuid) -> Result<Option<TimeInterval>> {
        let guard = self.intervals.read().await;
        Ok(guard
            .values()
            .filter(|interval| interval.owner_id == owner_id)
            // Equal starts: the open interval wins, then the smallest id
            .max_by_key(|interval| {
                (interval.start, interval.is_open(), Reverse(interval.id))
            })
            .cloned())
    }

    async fn find_for_day(&self, owner_id: Uuid, day: &Day) -> Result<Vec<TimeInterval>> {
        let guard = self.intervals.read().await;
        let mut intervals: Vec<TimeInterval> = guard
            .values()
            .filter(|interval| interval.owner_id == owner_id && day.contains(interval.start))
            .cloned()
            .collect();

        intervals.sort_by_key(|interval| interval.start);
        Ok(intervals)
    }

    async fn count_for_owner(&self, owner_id: Uuid) -> Result<u64> {
        let guard = self.intervals.read().await;
        Ok(guard
            .values()
            .filter(|interval| interval.owner_id == owner_id)
            .count() as u64)
    }

    async fn create(&self, new_interval: &NewInterval) -> Result<TimeInterval> {
        let interval = TimeInterval {
            id: Uuid::new_v4(),
            owner_id: new_interval.owner_id,
            start: new_interval.start,
            stop: new_interval.stop,
        };

        self.intervals
            .write()
            .await
            .insert(interval.id, interval.clone());
        Ok(interval)
    }

    async fn update(&self, interval: &TimeInterval) -> Result<bool> {
        let mut guard = self.intervals.write().await;
        match guard.get_mut(&interval.id) {
            Some(stored) => {
                stored.start = interval.start;
                stored.stop = interval.stop;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, UserAccount>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>> {
        let guard = self.users.read().await;
        Ok(guard
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn create(&self, new_user: &NewUser) -> Result<UserAccount> {
        let mut guard = self.users.write().await;
        if guard.values().any(|user| user.username == new_user.username) {
            anyhow::bail!("username {} is already taken", new_user.username);
        }

        let now = Utc::now();
        let user = UserAccount {
            id: Uuid::new_v4(),
            username: new_user.username.clone(),
            password_hash: hash_password(&new_user.password)?,
            overtime: 0,
            worktime: 0,
            created_at: now,
            updated_at: now,
        };

        guard.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_password(&self, user: &UserAccount) -> Result<bool> {
        let mut guard = self.users.write().await;
        match guard.get_mut(&user.id) {
            Some(stored) => {
                stored.password_hash = user.password_hash.clone();
                stored.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, FixedClock};
    use chrono::{DateTime, Duration};
    use rstest::{fixture, rstest};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[fixture]
    fn repository() -> InMemoryIntervalRepository {
        InMemoryIntervalRepository::new()
    }

    #[rstest]
    #[tokio::test]
    async fn test_latest_start_is_most_recent(
        repository: InMemoryIntervalRepository,
    ) {
        let owner = Uuid::new_v4();
        let early = at("2011-04-04T08:00:00Z");
        repository
            .create(&NewInterval {
                owner_id: owner,
                start: early + Duration::hours(3),
                stop: None,
            })
            .await
            .unwrap();
        repository
            .create(&NewInterval {
                owner_id: owner,
                start: early,
                stop: Some(early + Duration::hours(1)),
            })
            .await
            .unwrap();

        let latest = repository.find_most_recent(owner).await.unwrap().unwrap();
        assert_eq!(latest.start, early + Duration::hours(3));
        assert!(repository.find_most_recent(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn test_equal_starts_prefer_the_open_interval(repository: InMemoryIntervalRepository) {
        let owner = Uuid::new_v4();
        let start = at("2011-04-04T08:00:00Z");
        for stop in [Some(start + Duration::hours(1)), None, Some(start + Duration::hours(2))] {
            repository
                .create(&NewInterval {
                    owner_id: owner,
                    start,
                    stop,
                })
                .await
                .unwrap();
        }

        let latest = repository.find_most_recent(owner).await.unwrap().unwrap();
        assert!(latest.is_open());
    }

    #[rstest]
    #[tokio::test]
    async fn test_day_listing_is_limited_to_the_owner(
        repository: InMemoryIntervalRepository,
    ) {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let day = FixedClock::new(at("2011-04-04T12:00:00Z")).today();

        for (owner_id, start) in [
            (owner, "2011-04-04T09:00:00Z"),
            (owner, "2011-04-04T00:00:00Z"),
            (owner, "2011-04-03T23:59:59Z"),
            (owner, "2011-04-05T00:00:00Z"),
            (other, "2011-04-04T10:00:00Z"),
        ] {
            repository
                .create(&NewInterval::open(owner_id, at(start)))
                .await
                .unwrap();
        }

        let intervals = repository.find_for_day(owner, &day).await.unwrap();
        let starts: Vec<_> = intervals.iter().map(|i| i.start).collect();
        assert_eq!(
            starts,
            vec![at("2011-04-04T00:00:00Z"), at("2011-04-04T09:00:00Z")]
        );
        assert_eq!(repository.count_for_owner(owner).await.unwrap(), 4);
    }

    #[rstest]
    #[tokio::test]
    async fn test_missing_interval_is_not_updated(repository: InMemoryIntervalRepository) {
        let ghost = TimeInterval {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            start: Utc::now(),
            stop: None,
        };
        assert!(!repository.update(&ghost).await.unwrap());
    }

    #[tokio::test]
    async fn test_reject_duplicate_usernames() {
        let users = InMemoryUserRepository::new();
        let new_user = NewUser {
            username: "admin".to_string(),
            password: "geheim".to_string(),
        };

        let created = users.create(&new_user).await.unwrap();
        assert!(created.verify_password("geheim"));
        assert!(users.create(&new_user).await.is_err());

        let found = users.find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(users.find_by_username("adminx").await.unwrap().is_none());
    }
}
