//! Service settings
//!
//! Infrastructure connections (`DATABASE_*`, `REDIS_*`) are read by the
//! `common` crate. Everything specific to this service comes from
//! `FLOWTIME_*` variables layered over the defaults below.

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;

/// Where intervals, accounts and sessions live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// PostgreSQL for data, Redis for sessions
    Postgres,
    /// Everything in process; lost on restart
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub bind_address: String,
    pub backend: Backend,
    pub session_ttl_seconds: u64,
    pub secure_cookies: bool,
    /// Account created at startup by the memory backend
    pub seed_username: Option<String>,
    pub seed_password: Option<String>,
}

impl AppConfig {
    /// Load settings from the environment
    ///
    /// # Environment Variables
    /// - `FLOWTIME_BIND_ADDRESS` (default: "0.0.0.0:3000")
    /// - `FLOWTIME_BACKEND`: `postgres` or `memory` (default: postgres)
    /// - `FLOWTIME_SESSION_TTL_SECONDS` (default: 43200)
    /// - `FLOWTIME_SECURE_COOKIES` (default: false)
    /// - `FLOWTIME_SEED_USERNAME`, `FLOWTIME_SEED_PASSWORD`: optional account for the memory backend
    pub fn from_env() -> Result<Self> {
        let config = Config::builder()
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("backend", "postgres")?
            .set_default("session_ttl_seconds", 43_200)?
            .set_default("secure_cookies", false)?
            .add_source(Environment::with_prefix("FLOWTIME").try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            backend: Backend::Memory,
            session_ttl_seconds: 43_200,
            secure_cookies: false,
            seed_username: None,
            seed_password: None,
        }
    }
}
