//! Per-interaction report pipeline.
//!
//! The three tables are loaded once into [`DashboardTables`]; every change of
//! date range or frequency then runs [`build_report`], a pure function of the
//! tables and the selection.

use std::path::Path;
use std::time::Instant;

use chrono::NaiveDate;
use dashboard_core::calculations::{mean, summarize_rejections, total};
use dashboard_core::error::Result;
use dashboard_core::models::{
    AggregatedSeries, DateRange, Frequency, InvoiceRecord, RejectionRecord, RejectionSummary,
    TicketRecord,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregator::SeriesAggregator;
use crate::reader::{load_invoices, load_rejections, load_tickets};

/// Earliest date a user control may offer, regardless of the data.
pub const SELECTABLE_FLOOR: NaiveDate = match NaiveDate::from_ymd_opt(2023, 10, 20) {
    Some(d) => d,
    None => panic!("invalid floor date"),
};

// ── Tables ────────────────────────────────────────────────────────────────────

/// The three source tables, immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct DashboardTables {
    pub rejections: Vec<RejectionRecord>,
    pub tickets: Vec<TicketRecord>,
    pub invoices: Vec<InvoiceRecord>,
}

impl DashboardTables {
    /// Load all three tables, failing on the first malformed file.
    pub fn load(rejections: &Path, tickets: &Path, invoices: &Path) -> Result<Self> {
        let started = Instant::now();
        let tables = Self {
            rejections: load_rejections(rejections)?,
            tickets: load_tickets(tickets)?,
            invoices: load_invoices(invoices)?,
        };
        info!(
            rejections = tables.rejections.len(),
            tickets = tables.tickets.len(),
            invoices = tables.invoices.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "tables loaded"
        );
        Ok(tables)
    }

    /// Earliest ticket opening date (records are date-sorted by the loader,
    /// but this does not rely on it).
    pub fn first_ticket_date(&self) -> Option<NaiveDate> {
        self.tickets.iter().map(|t| t.opening_date).min()
    }
}

// ── Report types ──────────────────────────────────────────────────────────────

/// One resampled series with its statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    /// Source column the series was built from.
    pub label: &'static str,
    /// Bucket width the points were resampled at.
    pub frequency: Frequency,
    pub points: AggregatedSeries,
    /// `None` when the series is empty.
    pub mean: Option<f64>,
    pub total: f64,
}

impl SeriesSummary {
    fn new(label: &'static str, frequency: Frequency, points: AggregatedSeries) -> Self {
        Self {
            label,
            frequency,
            mean: mean(&points),
            total: total(&points),
            points,
        }
    }
}

/// Everything a presentation layer needs for one interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub range: DateRange,
    pub frequency: Frequency,
    pub opened_tickets: SeriesSummary,
    pub invoiced_amount: SeriesSummary,
    pub rejections: RejectionSummary,
    /// Range a date control may offer, `None` without ticket data.
    pub selectable: Option<DateRange>,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Run both aggregations and the rejection summary for one selection.
///
/// `today` caps the selectable bounds. A selection outside those bounds is
/// logged but still honoured.
pub fn build_report(
    tables: &DashboardTables,
    range: DateRange,
    frequency: Frequency,
    today: NaiveDate,
) -> DashboardReport {
    if !range.is_valid() {
        warn!("start date is after end date ({}); series will be empty", range);
    }

    let selectable = selectable_bounds(tables, today);
    if let Some(bounds) = selectable {
        if range.is_valid() && !range.is_within(&bounds) {
            warn!("selected range {} extends beyond available data {}", range, bounds);
        }
    }

    let opened_tickets = SeriesSummary::new(
        crate::reader::columns::OPENED_COUNT,
        frequency,
        SeriesAggregator::aggregate(&tables.tickets, range, frequency),
    );
    let invoiced_amount = SeriesSummary::new(
        crate::reader::columns::TOTAL_AMOUNT,
        frequency,
        SeriesAggregator::aggregate(&tables.invoices, range, frequency),
    );
    let rejections = summarize_rejections(&tables.rejections);

    tracing::debug!(
        %range,
        %frequency,
        ticket_buckets = opened_tickets.points.len(),
        invoice_buckets = invoiced_amount.points.len(),
        "report built"
    );

    DashboardReport {
        range,
        frequency,
        opened_tickets,
        invoiced_amount,
        rejections,
        selectable,
    }
}

/// `[max(first ticket date, SELECTABLE_FLOOR), today]`.
///
/// `None` when there are no tickets or the lower bound is after `today`.
pub fn selectable_bounds(tables: &DashboardTables, today: NaiveDate) -> Option<DateRange> {
    let first = tables.first_ticket_date()?;
    let bounds = DateRange::new(first.max(SELECTABLE_FLOOR), today);
    bounds.is_valid().then_some(bounds)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
