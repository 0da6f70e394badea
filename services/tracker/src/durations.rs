//! Duration aggregation and display rules

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::models::TimeInterval;

/// Total duration of `intervals`, open ones measured up to now.
///
/// A missing collection and an empty one both sum to zero.
pub fn sum(intervals: Option<&[TimeInterval]>) -> Duration {
    sum_at(intervals, Utc::now())
}

/// Total duration of `intervals`, open ones measured up to `now`
pub fn sum_at(intervals: Option<&[TimeInterval]>, now: DateTime<Utc>) -> Duration {
    intervals
        .unwrap_or_default()
        .iter()
        .fold(Duration::zero(), |total, interval| {
            total + interval.duration_at(now)
        })
}

/// Render as `H:MM:SS`. Hours are not padded; negative durations render as zero.
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.num_seconds().max(0);
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Render the wall-clock time of `instant` in `tz` as `HH:MM`
pub fn format_clock<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant.with_timezone(tz).format("%H:%M").to_string()
}
