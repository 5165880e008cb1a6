use crate::models::{RejectionRecord, RejectionSummary, SeriesPoint};

/// Arithmetic mean of the bucket values.
///
/// Returns `None` for an empty series. This is the "no value" sentinel: the
/// caller omits the mean annotation rather than treating it as an error.
pub fn mean(series: &[SeriesPoint]) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    let total: f64 = series.iter().map(|p| p.value).sum();
    Some(total / series.len() as f64)
}

/// Sum of the bucket values; `0.0` for an empty series.
pub fn total(series: &[SeriesPoint]) -> f64 {
    series.iter().map(|p| p.value).sum()
}

/// Count rejected and non-rejected rows. No date filtering is applied.
pub fn summarize_rejections(records: &[RejectionRecord]) -> RejectionSummary {
    records
        .iter()
        .fold(RejectionSummary::default(), |mut acc, record| {
            if record.is_rejected {
                acc.rejected += 1;
            } else {
                acc.not_rejected += 1;
            }
            acc
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(d: &str, value: f64) -> SeriesPoint {
        SeriesPoint {
            bucket_start: NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(),
            value,
        }
    }

    fn flags(values: &[bool]) -> Vec<RejectionRecord> {
        values
            .iter()
            .map(|&is_rejected| RejectionRecord { is_rejected })
            .collect()
    }

    #[test]
    fn test_mean_of_series() {
        let series = vec![point("2024-01-01", 8.0), point("2024-02-01", 4.0)];
        assert_eq!(mean(&series), Some(6.0));
    }

    #[test]
    fn test_mean_single_bucket() {
        assert_eq!(mean(&[point("2024-01-01", 8.0)]), Some(8.0));
    }

    #[test]
    fn test_mean_empty_is_none() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_total() {
        let series = vec![point("2024-01-01", 1.5), point("2024-01-02", 2.5)];
        assert_eq!(total(&series), 4.0);
        assert_eq!(total(&[]), 0.0);
    }

    #[test]
    fn test_summarize_rejections_counts_both_categories() {
        let summary = summarize_rejections(&flags(&[true, false, false, true, true]));
        assert_eq!(summary.rejected, 3);
        assert_eq!(summary.not_rejected, 2);
    }

    #[test]
    fn test_summarize_rejections_empty() {
        let summary = summarize_rejections(&[]);
        assert_eq!(summary, RejectionSummary::default());
        assert!(summary.is_empty());
    }

    #[test]
    fn test_summarize_rejections_all_accepted() {
        let summary = summarize_rejections(&flags(&[false, false]));
        assert_eq!(summary.rejected, 0);
        assert_eq!(summary.not_rejected, 2);
        assert_eq!(summary.rejection_rate(), Some(0.0));
    }
}
