//! Time source for the tracker
//!
//! Every operation that depends on "now" or "today" receives a [`Clock`]
//! instead of reading the system time directly, so tests can pin time.

use chrono::{
    DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone,
    Utc,
};
use std::sync::RwLock;

/// A calendar day and the UTC instants bounding it: `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Day {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Day {
    /// The day `date` runs from its local midnight to the next local midnight in `tz`
    pub fn in_timezone<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Self {
        let next = date.succ_opt().unwrap_or(date);
        Self {
            date,
            start: local_midnight(date, tz),
            end: local_midnight(next, tz),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight: NaiveDateTime = date.and_time(chrono::NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => t.with_timezone(&Utc),
        // Midnight skipped by a DST jump: the day starts at the transition,
        // which is midnight under the offset in force the day before.
        LocalResult::None => match tz.offset_from_local_datetime(&(midnight - Duration::days(1))) {
            LocalResult::Single(offset) | LocalResult::Ambiguous(offset, _) => {
                let shift = Duration::seconds(i64::from(offset.fix().local_minus_utc()));
                Utc.from_utc_datetime(&(midnight - shift))
            }
            LocalResult::None => Utc.from_utc_datetime(&midnight),
        },
    }
}

/// Source of the current instant and the current calendar day
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> Day;
}

/// Wall clock, days in the process's local timezone
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> Day {
        Day::in_timezone(Local::now().date_naive(), &Local)
    }
}

/// Manually driven clock for tests
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
    offset: FixedOffset,
}

impl FixedClock {
    /// A clock frozen at `now`, with days computed in UTC
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_offset(now, Utc.fix())
    }

    pub fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: RwLock::new(now),
            offset,
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }

    fn today(&self) -> Day {
        let local = self.now().with_timezone(&self.offset);
        Day::in_timezone(local.date_naive(), &self.offset)
    }
}
