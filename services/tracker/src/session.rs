//! Server-side login sessions
//!
//! The browser only holds an opaque random token; the store maps it to the
//! logged-in user's id.

use anyhow::{Context, Result};
use async_trait::async_trait;
use common::cache::RedisPool;
use rand::{Rng, distributions::Alphanumeric};
use std::{collections::HashMap, time::Duration};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

const TOKEN_LENGTH: usize = 48;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Start a session for `user_id` and return its token
    async fn create(&self, user_id: Uuid) -> Result<String>;

    /// The user behind `token`, if the session is still alive
    async fn get(&self, token: &str) -> Result<Option<Uuid>>;

    async fn clear(&self, token: &str) -> Result<()>;
}

fn new_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Sessions kept in Redis under `session:<token>`, expiring after `ttl` of inactivity
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: RedisPool,
    ttl: Duration,
}

impl RedisSessionStore {
    pub fn new(redis: RedisPool, ttl: Duration) -> Self {
        Self { redis, ttl }
    }

    fn key(token: &str) -> String {
        format!("session:{}", token)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, user_id: Uuid) -> Result<String> {
        info!("Creating session for user: {}", user_id);

        let token = new_token();
        self.redis
            .set(&Self::key(&token), &user_id.to_string(), Some(self.ttl))
            .await?;
        Ok(token)
    }

    async fn get(&self, token: &str) -> Result<Option<Uuid>> {
        let key = Self::key(token);
        let Some(value) = self.redis.get(&key).await? else {
            debug!("No live session for token");
            return Ok(None);
        };

        let user_id = Uuid::parse_str(&value).context("Corrupt session entry")?;
        self.redis.touch(&key, self.ttl).await?;
        Ok(Some(user_id))
    }

    async fn clear(&self, token: &str) -> Result<()> {
        self.redis.delete(&Self::key(token)).await
    }
}

/// Process-local sessions, never expiring
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Uuid>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, user_id: Uuid) -> Result<String> {
        let token = new_token();
        self.sessions.write().await.insert(token.clone(), user_id);
        Ok(token)
    }

    async fn get(&self, token: &str) -> Result<Option<Uuid>> {
        Ok(self.sessions.read().await.get(token).copied())
    }

    async fn clear(&self, token: &str) -> Result<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }
}
