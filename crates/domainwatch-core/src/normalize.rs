//! Field value normalization
//!
//! Pure canonicalization helpers used by the field comparators, so that
//! semantically equal values compare equal regardless of casing, timezone,
//! or representation. Nothing here errors: an unparseable date normalizes
//! to [`DayStamp::Unknown`], a sentinel that only equals itself. Invalid
//! vs invalid therefore compares equal, while invalid vs valid compares
//! different: an unparseable date is information worth flagging, not
//! worth crashing on.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Canonical string form: trimmed, lowercased, absent treated as empty
pub fn normalize_str(value: Option<&str>) -> String {
    value.unwrap_or_default().trim().to_lowercase()
}

/// A date reduced to a UTC calendar day, or the unparseable sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStamp {
    /// Parsed successfully; time-of-day discarded
    Day(NaiveDate),
    /// Input was absent, empty, or unparseable
    Unknown,
}

impl DayStamp {
    /// True when the input parsed
    pub fn is_known(&self) -> bool {
        matches!(self, DayStamp::Day(_))
    }
}

/// Parse a date-like string into a UTC calendar day
///
/// Accepted forms, tried in order: RFC 3339, RFC 2822, `%Y-%m-%d`, and
/// `%Y-%m-%dT%H:%M:%S` (naive, assumed UTC). Everything else is
/// [`DayStamp::Unknown`].
pub fn normalize_date(value: Option<&str>) -> DayStamp {
    let raw = value.unwrap_or_default().trim();
    if raw.is_empty() {
        return DayStamp::Unknown;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return DayStamp::Day(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return DayStamp::Day(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return DayStamp::Day(d);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return DayStamp::Day(dt.date());
    }

    DayStamp::Unknown
}

/// Absolute day difference between two values, when both parse
pub fn day_delta(a: DayStamp, b: DayStamp) -> Option<i64> {
    match (a, b) {
        (DayStamp::Day(a), DayStamp::Day(b)) => Some((a - b).num_days().abs()),
        _ => None,
    }
}
