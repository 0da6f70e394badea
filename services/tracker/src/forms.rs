//! Form payloads and their validation

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::{
    error::{TrackerError, TrackerResult},
    models::TimeInterval,
};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_TIMESTAMP: &str = "Not a valid datetime value.";

/// Timestamp layouts accepted by the interval form, tried in order
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Display layout for timestamps in forms
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Per-field validation messages
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when nothing was reported, otherwise a validation error
    pub fn into_result(self) -> TrackerResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(TrackerError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Login form as posted by the browser
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// Both fields are required
    pub fn validate(&self) -> TrackerResult<()> {
        let mut errors = FieldErrors::default();
        if self.username.trim().is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors.into_result()
    }
}

/// Interval edit form. Timestamps are raw text in local time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntervalForm {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub stop: String,
}

/// Validated interval edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalEdit {
    pub start: DateTime<Utc>,
    pub stop: Option<DateTime<Utc>>,
}

impl IntervalForm {
    /// Pre-fill the form from a stored interval, rendered in `tz`
    pub fn from_interval<Tz: TimeZone>(interval: &TimeInterval, tz: &Tz) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        let render = |ts: DateTime<Utc>| ts.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string();
        Self {
            start: render(interval.start),
            stop: interval.stop.map(render).unwrap_or_default(),
        }
    }

    /// `start` is required; an empty `stop` leaves the interval open
    pub fn validate<Tz: TimeZone>(&self, tz: &Tz) -> TrackerResult<IntervalEdit> {
        let mut errors = FieldErrors::default();

        let start = match self.start.trim() {
            "" => {
                errors.add("start", REQUIRED);
                None
            }
            raw => parse_timestamp(raw, tz).or_else(|| {
                errors.add("start", INVALID_TIMESTAMP);
                None
            }),
        };

        let stop = match self.stop.trim() {
            "" => None,
            raw => parse_timestamp(raw, tz).or_else(|| {
                errors.add("stop", INVALID_TIMESTAMP);
                None
            }),
        };

        match start {
            Some(start) if errors.is_empty() => Ok(IntervalEdit { start, stop }),
            _ => Err(TrackerError::Validation(errors)),
        }
    }
}

/// Parse a local timestamp in any accepted layout
pub fn parse_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let naive = TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())?;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => Some(t.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}
