//! Date-range filtering and resampling of dated series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use dashboard_core::models::{AggregatedSeries, DateRange, DatedValue, Frequency, SeriesPoint};
use dashboard_core::time_utils::bucket_start;

/// Stateless helper that groups dated records into frequency buckets.
pub struct SeriesAggregator;

impl SeriesAggregator {
    /// Keep the records dated within `range` (inclusive), group them into
    /// `frequency` buckets and sum each bucket.
    ///
    /// Only buckets holding at least one in-range record are emitted, in
    /// ascending order. A reversed range yields an empty series.
    pub fn aggregate<R: DatedValue>(
        records: &[R],
        range: DateRange,
        frequency: Frequency,
    ) -> AggregatedSeries {
        if !range.is_valid() {
            return Vec::new();
        }

        // BTreeMap keeps buckets in chronological order.
        let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for record in records.iter().filter(|r| range.contains(r.date())) {
            *buckets
                .entry(bucket_start(record.date(), frequency))
                .or_insert(0.0) += record.value();
        }

        buckets
            .into_iter()
            .map(|(bucket_start, value)| SeriesPoint {
                bucket_start,
                value,
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
