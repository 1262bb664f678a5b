//! Round-trip timestamp payload for `datetime'…'` literals

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A timestamp that preserves whether the source text carried an offset.
///
/// `datetime'2010-01-01T12:00:00Z'` and `datetime'2010-01-01T12:00:00'`
/// are distinct values with distinct canonical renderings; comparisons
/// treat unzoned values as UTC.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum DateTimeValue {
    /// Carried an explicit offset (or `Z`)
    Offset(DateTime<FixedOffset>),
    /// No offset in the source text
    Unzoned(NaiveDateTime),
}

impl DateTimeValue {
    /// Parse ISO-8601 text, with or without an offset. A bare date is
    /// accepted and treated as midnight.
    pub fn parse(text: &str) -> Result<Self, chrono::ParseError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(DateTimeValue::Offset(dt));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(DateTimeValue::Unzoned(dt));
        }
        let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")?;
        Ok(DateTimeValue::Unzoned(
            date.and_hms_opt(0, 0, 0).unwrap_or_default(),
        ))
    }

    /// Stable re-encoding; decoding it again yields an equal value.
    /// UTC offsets render as `Z`, fractional seconds only when present.
    pub fn canonical(&self) -> String {
        match self {
            DateTimeValue::Offset(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            DateTimeValue::Unzoned(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        }
    }

    /// The instant on the UTC timeline used for ordering; unzoned values
    /// are read as UTC.
    fn utc_instant(&self) -> NaiveDateTime {
        match self {
            DateTimeValue::Offset(dt) => dt.naive_utc(),
            DateTimeValue::Unzoned(dt) => *dt,
        }
    }
}

impl PartialEq for DateTimeValue {
    fn eq(&self, other: &Self) -> bool {
        self.utc_instant() == other.utc_instant()
    }
}

impl Eq for DateTimeValue {}

impl PartialOrd for DateTimeValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateTimeValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.utc_instant().cmp(&other.utc_instant())
    }
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}
