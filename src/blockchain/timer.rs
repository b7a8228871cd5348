// src/blockchain/timer.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("invalid ISO-8601 timestamp '{0}'")]
    Invalid(String),
}

/// Parses an ISO-8601 instant. Offsets are honoured; a naive date-time or a
/// bare date is read as UTC.
pub fn parse_iso(input: &str) -> Result<DateTime<Utc>, TimestampError> {
    let trimmed = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimestampError::Invalid(input.to_string()))
}

pub fn to_iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Clamps an instant so it never precedes `launch`.
pub fn floor_instant(instant: DateTime<Utc>, launch: DateTime<Utc>) -> DateTime<Utc> {
    instant.max(launch)
}

/// Checks an ISO string against the network launch time. Returns the input
/// (re-serialized in UTC) when it is not earlier than `launch`, otherwise the
/// launch time itself.
pub fn must_from_launch_time(iso: &str, launch: DateTime<Utc>) -> Result<String, TimestampError> {
    parse_iso(iso).map(|instant| to_iso(floor_instant(instant, launch)))
}
