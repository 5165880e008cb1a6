//! Record and result types shared by the loader, the aggregation pipeline and
//! the report layer.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

// ── Source records ────────────────────────────────────────────────────────────

/// One row of the opened-tickets table (`FECHA APERTURA`, `PARTES ABIERTOS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub opening_date: NaiveDate,
    pub opened_count: u64,
}

/// One row of the invoiced-amount table (`FECHA CIERRE`, `IMPORTE TOTAL`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub closing_date: NaiveDate,
    pub total_amount: f64,
}

/// One row of the rejections table (`RECHAZO`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionRecord {
    pub is_rejected: bool,
}

/// A dated record carrying one numeric value to be summed into buckets.
pub trait DatedValue {
    /// Calendar date the record is filed under.
    fn date(&self) -> NaiveDate;
    /// Value contributed to the record's bucket.
    fn value(&self) -> f64;
}

impl DatedValue for TicketRecord {
    fn date(&self) -> NaiveDate {
        self.opening_date
    }

    fn value(&self) -> f64 {
        self.opened_count as f64
    }
}

impl DatedValue for InvoiceRecord {
    fn date(&self) -> NaiveDate {
        self.closing_date
    }

    fn value(&self) -> f64 {
        self.total_amount
    }
}

// ── DateRange ─────────────────────────────────────────────────────────────────

/// Inclusive calendar-date range selected by the user.
///
/// Construction does not enforce `start <= end`; a reversed range is a valid
/// value that simply contains no dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A single-day range.
    pub fn day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    /// `true` when `start <= end`.
    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    /// Inclusive membership test. Always `false` for a reversed range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// `true` when this range lies entirely within `outer`.
    pub fn is_within(&self, outer: &DateRange) -> bool {
        outer.start <= self.start && self.end <= outer.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

// ── Frequency ────────────────────────────────────────────────────────────────

/// Bucket width used when resampling a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// One bucket per calendar day.
    Day,
    /// One bucket per ISO week, Monday through Sunday.
    #[default]
    Week,
    /// One bucket per calendar month.
    Month,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Day, Frequency::Week, Frequency::Month];

    /// Lowercase name, e.g. `"week"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Day => "day",
            Frequency::Week => "week",
            Frequency::Month => "month",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = DashboardError;

    /// Accepts `day|week|month` (any case) and the codes `D|W|M`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "d" | "day" | "daily" => Ok(Frequency::Day),
            "w" | "week" | "weekly" => Ok(Frequency::Week),
            "m" | "month" | "monthly" => Ok(Frequency::Month),
            _ => Err(DashboardError::InvalidFrequency(s.to_string())),
        }
    }
}

// ── Aggregated output ─────────────────────────────────────────────────────────

/// Sum of all in-range values whose date falls in one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// First calendar day of the bucket.
    pub bucket_start: NaiveDate,
    pub value: f64,
}

/// Chronologically ordered buckets, one per non-empty bucket.
pub type AggregatedSeries = Vec<SeriesPoint>;

/// Counts of the two rejection categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RejectionSummary {
    pub rejected: u64,
    pub not_rejected: u64,
}

impl RejectionSummary {
    pub fn total(&self) -> u64 {
        self.rejected + self.not_rejected
    }

    /// `true` when no rows were counted; a pie built from this has no data.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Share of rejected rows as a percentage, `None` when empty.
    pub fn rejection_rate(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.rejected as f64 / self.total() as f64 * 100.0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    // ── DateRange ─────────────────────────────────────────────────────────────

    #[test]
    fn test_range_contains_is_inclusive() {
        let range = DateRange::new(date("2024-01-01"), date("2024-01-31"));
        assert!(range.contains(date("2024-01-01")));
        assert!(range.contains(date("2024-01-31")));
        assert!(!range.contains(date("2024-02-01")));
        assert!(!range.contains(date("2023-12-31")));
    }

    #[test]
    fn test_reversed_range_contains_nothing() {
        let range = DateRange::new(date("2024-02-01"), date("2024-01-01"));
        assert!(!range.is_valid());
        assert!(!range.contains(date("2024-01-15")));
        assert!(!range.contains(date("2024-02-01")));
    }

    #[test]
    fn test_range_is_within() {
        let outer = DateRange::new(date("2023-10-20"), date("2024-12-31"));
        assert!(DateRange::new(date("2024-01-01"), date("2024-02-01")).is_within(&outer));
        assert!(!DateRange::new(date("2023-01-01"), date("2024-02-01")).is_within(&outer));
    }

    #[test]
    fn test_range_display() {
        let range = DateRange::day(date("2024-03-05"));
        assert_eq!(range.to_string(), "2024-03-05 .. 2024-03-05");
    }

    // ── Frequency ─────────────────────────────────────────────────────────────

    #[test]
    fn test_frequency_parses_names_and_codes() {
        assert_eq!("day".parse::<Frequency>().unwrap(), Frequency::Day);
        assert_eq!("W".parse::<Frequency>().unwrap(), Frequency::Week);
        assert_eq!(" Month ".parse::<Frequency>().unwrap(), Frequency::Month);
        assert_eq!("m".parse::<Frequency>().unwrap(), Frequency::Month);
    }

    #[test]
    fn test_frequency_rejects_unknown() {
        let err = "hour".parse::<Frequency>().unwrap_err();
        assert!(matches!(err, DashboardError::InvalidFrequency(s) if s == "hour"));
    }

    #[test]
    fn test_frequency_default_is_week() {
        assert_eq!(Frequency::default(), Frequency::Week);
    }

    #[test]
    fn test_frequency_serde_lowercase() {
        let json = serde_json::to_string(&Frequency::Month).unwrap();
        assert_eq!(json, "\"month\"");
        let back: Frequency = serde_json::from_str("\"day\"").unwrap();
        assert_eq!(back, Frequency::Day);
    }

    // ── DatedValue ────────────────────────────────────────────────────────────

    #[test]
    fn test_dated_value_impls() {
        let ticket = TicketRecord {
            opening_date: date("2024-01-02"),
            opened_count: 3,
        };
        assert_eq!(ticket.date(), date("2024-01-02"));
        assert_eq!(ticket.value(), 3.0);

        let invoice = InvoiceRecord {
            closing_date: date("2024-01-03"),
            total_amount: 120.5,
        };
        assert_eq!(invoice.date(), date("2024-01-03"));
        assert_eq!(invoice.value(), 120.5);
    }

    // ── RejectionSummary ──────────────────────────────────────────────────────

    #[test]
    fn test_rejection_rate() {
        let summary = RejectionSummary {
            rejected: 1,
            not_rejected: 3,
        };
        assert_eq!(summary.total(), 4);
        assert!((summary.rejection_rate().unwrap() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejection_rate_empty_is_none() {
        let summary = RejectionSummary::default();
        assert!(summary.is_empty());
        assert!(summary.rejection_rate().is_none());
    }
}
