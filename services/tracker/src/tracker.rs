//! Working state of a user: clocking in and out, today's intervals, edits
//!
//! "Currently working" is derived from the user's most recent interval: the
//! user is working exactly when that interval has no stop time. Concurrent
//! toggles for the same user are not coordinated; the last write wins.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    clock::Clock,
    durations,
    error::{TrackerError, TrackerResult},
    forms::IntervalEdit,
    models::{NewInterval, TimeInterval},
    repositories::IntervalRepository,
};

/// Today's intervals of one user, with their total
#[derive(Debug, Clone)]
pub struct DailySummary {
    pub day: NaiveDate,
    pub intervals: Vec<TimeInterval>,
    pub total: Duration,
    pub working: bool,
    /// Instant open intervals were measured up to
    pub as_of: DateTime<Utc>,
}

#[derive(Clone)]
pub struct WorkingStateTracker {
    intervals: Arc<dyn IntervalRepository>,
    clock: Arc<dyn Clock>,
}

impl WorkingStateTracker {
    pub fn new(intervals: Arc<dyn IntervalRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { intervals, clock }
    }

    /// True iff the user's most recent interval is still open
    pub async fn is_working(&self, user_id: Uuid) -> TrackerResult<bool> {
        let latest = self.intervals.find_most_recent(user_id).await?;
        Ok(latest.is_some_and(|interval| interval.is_open()))
    }

    /// Close the open interval, or open a new one when none is running
    pub async fn toggle(&self, user_id: Uuid) -> TrackerResult<TimeInterval> {
        let now = self.clock.now();

        match self.intervals.find_most_recent(user_id).await? {
            Some(mut interval) if interval.is_open() => {
                interval.stop = Some(now);
                if !self.intervals.update(&interval).await? {
                    return Err(TrackerError::NotFound);
                }
                info!("User {} clocked out of interval {}", user_id, interval.id);
                Ok(interval)
            }
            _ => {
                let interval = self
                    .intervals
                    .create(&NewInterval::open(user_id, now))
                    .await?;
                info!("User {} clocked in with interval {}", user_id, interval.id);
                Ok(interval)
            }
        }
    }

    /// The user's intervals starting today, oldest first
    pub async fn intervals_today(&self, user_id: Uuid) -> TrackerResult<Vec<TimeInterval>> {
        let today = self.clock.today();
        Ok(self.intervals.find_for_day(user_id, &today).await?)
    }

    pub async fn daily_summary(&self, user_id: Uuid) -> TrackerResult<DailySummary> {
        let day = self.clock.today().date;
        let as_of = self.clock.now();
        let intervals = self.intervals_today(user_id).await?;
        let total = durations::sum_at(Some(&intervals), as_of);
        let working = self.is_working(user_id).await?;

        Ok(DailySummary {
            day,
            intervals,
            total,
            working,
            as_of,
        })
    }

    /// Look up one of the user's intervals. Other users' intervals are not found.
    pub async fn find_interval(&self, user_id: Uuid, id: Uuid) -> TrackerResult<TimeInterval> {
        match self.intervals.find_by_id(id).await? {
            Some(interval) if interval.owner_id == user_id => Ok(interval),
            _ => Err(TrackerError::NotFound),
        }
    }

    /// Rewrite start and stop of one of the user's intervals
    pub async fn edit_interval(
        &self,
        user_id: Uuid,
        id: Uuid,
        edit: IntervalEdit,
    ) -> TrackerResult<TimeInterval> {
        let mut interval = self.find_interval(user_id, id).await?;
        interval.start = edit.start;
        interval.stop = edit.stop;

        if !self.intervals.update(&interval).await? {
            return Err(TrackerError::NotFound);
        }

        info!("User {} edited interval {}", user_id, interval.id);
        Ok(interval)
    }
}
