use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::error::{DashboardError, Result};
use crate::models::Frequency;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Resolve a timezone name, falling back to UTC with a warning when it is not
/// a recognised IANA identifier.
pub fn resolve_timezone(tz_name: &str) -> Tz {
    tz_name.parse::<Tz>().unwrap_or_else(|_| {
        warn!(
            "unrecognised timezone \"{}\", falling back to UTC",
            tz_name
        );
        Tz::UTC
    })
}

/// Validate that `tz_name` is a recognised IANA timezone identifier.
pub fn validate_timezone(tz_name: &str) -> bool {
    tz_name.parse::<Tz>().is_ok()
}

/// Today's calendar date as seen from `tz_name`.
pub fn today_in(tz_name: &str) -> NaiveDate {
    Utc::now().with_timezone(&resolve_timezone(tz_name)).date_naive()
}

// ── Date parsing ──────────────────────────────────────────────────────────────

/// Date-only layouts accepted in source tables and on the command line.
const DATE_FMTS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Date-time layouts whose time part is discarded.
const DATETIME_FMTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a calendar date, discarding any time-of-day component.
///
/// Returns `None` for empty strings and unrecognised layouts; callers decide
/// whether that is fatal.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Parse a user-supplied date, e.g. a `--start` flag.
pub fn parse_user_date(s: &str) -> Result<NaiveDate> {
    parse_date(s).ok_or_else(|| DashboardError::InvalidDate(s.to_string()))
}

// ── Buckets ───────────────────────────────────────────────────────────────────

/// First day of the bucket that `date` falls in.
///
/// * `Day`   – the date itself.
/// * `Week`  – the Monday of its ISO week.
/// * `Month` – the first of its month.
pub fn bucket_start(date: NaiveDate, frequency: Frequency) -> NaiveDate {
    match frequency {
        Frequency::Day => date,
        Frequency::Week => {
            date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
        }
        // Day 1 exists in every month.
        Frequency::Month => date.with_day(1).unwrap_or(date),
    }
}

/// Display label of a bucket: `YYYY-MM` for months, `YYYY-MM-DD` otherwise.
pub fn bucket_label(bucket_start: NaiveDate, frequency: Frequency) -> String {
    match frequency {
        Frequency::Month => bucket_start.format("%Y-%m").to_string(),
        Frequency::Day | Frequency::Week => bucket_start.format("%Y-%m-%d").to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
