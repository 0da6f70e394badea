//! Time interval model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One span of work. An interval without `stop` is still running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TimeInterval {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub start: DateTime<Utc>,
    /// Expected to be after `start`; not enforced.
    pub stop: Option<DateTime<Utc>>,
}

impl TimeInterval {
    pub fn is_open(&self) -> bool {
        self.stop.is_none()
    }

    /// Elapsed time up to `stop`, or up to `now` while the interval is open
    pub fn duration_at(&self, now: DateTime<Utc>) -> Duration {
        self.stop.unwrap_or(now) - self.start
    }

    /// Elapsed time up to `stop`, or up to the current system time
    pub fn duration(&self) -> Duration {
        self.duration_at(Utc::now())
    }
}

/// New interval creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInterval {
    pub owner_id: Uuid,
    pub start: DateTime<Utc>,
    pub stop: Option<DateTime<Utc>>,
}

impl NewInterval {
    /// An interval starting at `start` that is still running
    pub fn open(owner_id: Uuid, start: DateTime<Utc>) -> Self {
        Self {
            owner_id,
            start,
            stop: None,
        }
    }
}
