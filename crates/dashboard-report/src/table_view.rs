//! Plain-text tables for a [`DashboardReport`].
//!
//! One block per series with a row per bucket, followed by the mean and total
//! rows, then the rejection split.

use std::fmt::Write as _;

use dashboard_core::formatting::{self, NOT_AVAILABLE};
use dashboard_core::models::{Frequency, RejectionSummary};
use dashboard_core::time_utils::bucket_label;
use dashboard_data::analysis::{DashboardReport, SeriesSummary};

/// How the values of a series are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Integral counts, no decimals.
    Count,
    /// Money, two decimals and a currency suffix.
    Amount,
}

impl ValueKind {
    fn format(&self, value: f64) -> String {
        match self {
            ValueKind::Count => formatting::format_number(value, 0),
            ValueKind::Amount => formatting::format_amount(value),
        }
    }

    fn format_mean(&self, mean: Option<f64>) -> String {
        match (self, mean) {
            (_, None) => NOT_AVAILABLE.to_string(),
            (ValueKind::Count, Some(m)) => formatting::format_optional(Some(m), 1),
            (ValueKind::Amount, Some(m)) => formatting::format_amount(m),
        }
    }
}

/// A single printable row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRowData {
    pub period: String,
    pub value: String,
}

const PERIOD_WIDTH: usize = 12;
const VALUE_WIDTH: usize = 18;

/// Render the complete report.
pub fn render_report(report: &DashboardReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Service dashboard: {} ({})",
        report.range, report.frequency
    );
    match report.selectable {
        Some(bounds) => {
            let _ = writeln!(out, "Selectable range: {}", bounds);
        }
        None => {
            let _ = writeln!(out, "Selectable range: {}", NOT_AVAILABLE);
        }
    }
    out.push('\n');

    out.push_str(&render_series(
        &format!("Opened tickets per {}", report.frequency),
        &report.opened_tickets,
        report.frequency,
        ValueKind::Count,
    ));
    out.push('\n');
    out.push_str(&render_series(
        &format!("Invoiced amount per {}", report.frequency),
        &report.invoiced_amount,
        report.frequency,
        ValueKind::Amount,
    ));
    out.push('\n');
    out.push_str(&render_rejections(&report.rejections));
    out
}

/// Rows for a series, one per bucket.
pub fn series_rows(
    series: &SeriesSummary,
    frequency: Frequency,
    kind: ValueKind,
) -> Vec<TableRowData> {
    series
        .points
        .iter()
        .map(|p| TableRowData {
            period: bucket_label(p.bucket_start, frequency),
            value: kind.format(p.value),
        })
        .collect()
}

/// Render one series block. An empty series prints a "no data" line and a
/// mean of `n/a`.
pub fn render_series(
    title: &str,
    series: &SeriesSummary,
    frequency: Frequency,
    kind: ValueKind,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);
    push_row(&mut out, "Period", series.label);
    let _ = writeln!(out, "  {}", "-".repeat(PERIOD_WIDTH + VALUE_WIDTH + 1));

    let rows = series_rows(series, frequency, kind);
    if rows.is_empty() {
        let _ = writeln!(out, "  (no data in range)");
    }
    for row in &rows {
        push_row(&mut out, &row.period, &row.value);
    }

    push_row(&mut out, "Mean", &kind.format_mean(series.mean));
    push_row(&mut out, "Total", &kind.format(series.total));
    out
}

/// Render the rejected / not-rejected split.
pub fn render_rejections(summary: &RejectionSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Rejections");
    if summary.is_empty() {
        let _ = writeln!(out, "  (no data)");
        return out;
    }
    push_row(
        &mut out,
        "Rejected",
        &formatting::format_number(summary.rejected as f64, 0),
    );
    push_row(
        &mut out,
        "Not rejected",
        &formatting::format_number(summary.not_rejected as f64, 0),
    );
    push_row(
        &mut out,
        "Rate",
        &formatting::format_percentage(summary.rejection_rate()),
    );
    out
}

/// Left-aligned period, right-aligned value. Widths count chars so the euro
/// sign does not skew alignment.
fn push_row(out: &mut String, period: &str, value: &str) {
    let pad = VALUE_WIDTH.saturating_sub(value.chars().count());
    let _ = writeln!(
        out,
        "  {:<width$} {}{}",
        period,
        " ".repeat(pad),
        value,
        width = PERIOD_WIDTH
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_core::models::{DateRange, SeriesPoint};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn summary(label: &'static str, points: &[(&str, f64)], mean: Option<f64>) -> SeriesSummary {
        let points: Vec<SeriesPoint> = points
            .iter()
            .map(|&(d, value)| SeriesPoint {
                bucket_start: date(d),
                value,
            })
            .collect();
        let total = points.iter().map(|p| p.value).sum();
        SeriesSummary {
            label,
            frequency: Frequency::Month,
            points,
            mean,
            total,
        }
    }

    fn report() -> DashboardReport {
        DashboardReport {
            range: DateRange::new(date("2024-01-01"), date("2024-02-29")),
            frequency: Frequency::Month,
            opened_tickets: summary(
                "PARTES ABIERTOS",
                &[("2024-01-01", 8.0), ("2024-02-01", 7.0)],
                Some(7.5),
            ),
            invoiced_amount: summary("IMPORTE TOTAL", &[], None),
            rejections: RejectionSummary {
                rejected: 3,
                not_rejected: 2,
            },
            selectable: Some(DateRange::new(date("2023-10-20"), date("2024-12-31"))),
        }
    }

    #[test]
    fn test_series_rows_use_month_labels() {
        let r = report();
        let rows = series_rows(&r.opened_tickets, Frequency::Month, ValueKind::Count);
        assert_eq!(
            rows,
            vec![
                TableRowData {
                    period: "2024-01".to_string(),
                    value: "8".to_string()
                },
                TableRowData {
                    period: "2024-02".to_string(),
                    value: "7".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_render_report_contains_sections() {
        let text = render_report(&report());
        assert!(text.starts_with("Service dashboard: 2024-01-01 .. 2024-02-29 (month)"));
        assert!(text.contains("Selectable range: 2023-10-20 .. 2024-12-31"));
        assert!(text.contains("Opened tickets per month"));
        assert!(text.contains("Invoiced amount per month"));
        assert!(text.contains("Rejections"));
    }

    #[test]
    fn test_empty_series_shows_na_mean() {
        let r = report();
        let text = render_series("Invoiced", &r.invoiced_amount, r.frequency, ValueKind::Amount);
        assert!(text.contains("(no data in range)"));
        let mean_line = text.lines().find(|l| l.trim_start().starts_with("Mean")).unwrap();
        assert!(mean_line.ends_with("n/a"));
    }

    #[test]
    fn test_count_mean_has_one_decimal() {
        let r = report();
        let text = render_series("Tickets", &r.opened_tickets, r.frequency, ValueKind::Count);
        let mean_line = text.lines().find(|l| l.trim_start().starts_with("Mean")).unwrap();
        assert!(mean_line.ends_with("7.5"));
        let total_line = text.lines().find(|l| l.trim_start().starts_with("Total")).unwrap();
        assert!(total_line.ends_with("15"));
    }

    #[test]
    fn test_amount_rows_align_with_euro_sign() {
        let s = summary("IMPORTE TOTAL", &[("2024-01-01", 1234.5)], Some(1234.5));
        let text = render_series("Invoiced", &s, Frequency::Month, ValueKind::Amount);
        let row = text.lines().find(|l| l.contains("2024-01")).unwrap();
        assert!(row.ends_with("1,234.50 €"));
        assert_eq!(row.chars().count(), 2 + PERIOD_WIDTH + 1 + VALUE_WIDTH);
    }

    #[test]
    fn test_render_rejections() {
        let text = render_rejections(&RejectionSummary {
            rejected: 3,
            not_rejected: 2,
        });
        assert!(text.contains("Rejected"));
        assert!(text.lines().any(|l| l.ends_with("60.0%")));
    }

    #[test]
    fn test_render_rejections_empty() {
        let text = render_rejections(&RejectionSummary::default());
        assert!(text.contains("(no data)"));
    }
}
