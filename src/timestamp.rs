//! ISO-8601 reading times to InfluxDB timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 time and pin it to UTC.
///
/// A UTC offset in the input is dropped, not applied: `12:00:00+02:00`
/// becomes `12:00:00Z`. Reduced precision is accepted down to the hour
/// (`2020-01-01T10`) and a bare date is midnight.
pub fn parse_as_utc(time: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(time) {
        return Some(dt.naive_local().and_utc());
    }

    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(time, fmt).ok())
    {
        return Some(dt.naive_local().and_utc());
    }

    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(time, fmt).ok())
    {
        return Some(naive.and_utc());
    }

    if let Some(naive) = parse_date_hour(time) {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(time, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// `YYYY-MM-DDTHH` or `YYYY-MM-DD HH`, which chrono's format strings cannot
/// express without a minute.
fn parse_date_hour(time: &str) -> Option<NaiveDateTime> {
    let (date, hour) = time.split_once(['T', ' '])?;
    if hour.len() != 2 || !hour.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let time = NaiveTime::from_hms_opt(hour.parse().ok()?, 0, 0)?;
    Some(date.and_time(time))
}

/// Nanoseconds since the Unix epoch for an ISO-8601 time, see [`parse_as_utc`].
///
/// Computed from microseconds through floating point seconds, so times far
/// from the epoch lose precision in the last digits.
pub fn epoch_nanos(time: &str) -> Option<i64> {
    let micros = parse_as_utc(time)?.timestamp_micros();
    let seconds = micros as f64 / 1_000_000.0;
    Some((seconds * 1_000_000_000.0).floor() as i64)
}
