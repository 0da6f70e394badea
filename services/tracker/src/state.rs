//! Application state shared across handlers

use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    auth::Authenticator,
    clock::Clock,
    config::AppConfig,
    repositories::{IntervalRepository, UserRepository},
    session::SessionStore,
    tracker::WorkingStateTracker,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub tracker: WorkingStateTracker,
    pub authenticator: Authenticator,
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionStore>,
    pub config: Arc<AppConfig>,
    /// Present with the postgres backend; used by the health check
    pub db_pool: Option<PgPool>,
}

impl AppState {
    pub fn new(
        intervals: Arc<dyn IntervalRepository>,
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        config: AppConfig,
    ) -> Self {
        Self {
            tracker: WorkingStateTracker::new(intervals, clock),
            authenticator: Authenticator::new(users.clone()),
            users,
            sessions,
            config: Arc::new(config),
            db_pool: None,
        }
    }

    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
