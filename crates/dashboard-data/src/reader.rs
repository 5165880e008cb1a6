//! CSV loading for the three extracted tables.
//!
//! Each loader locates its columns by header name, parses every row strictly
//! and fails the whole load on the first malformed date or number. The
//! returned records are sorted by date.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{InvoiceRecord, RejectionRecord, TicketRecord};
use dashboard_core::time_utils::parse_date;
use tracing::{debug, warn};

/// Header names as written by the extraction script.
pub mod columns {
    pub const REJECTED: &str = "RECHAZO";
    pub const OPENING_DATE: &str = "FECHA APERTURA";
    pub const OPENED_COUNT: &str = "PARTES ABIERTOS";
    pub const CLOSING_DATE: &str = "FECHA CIERRE";
    pub const TOTAL_AMOUNT: &str = "IMPORTE TOTAL";
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the opened-tickets table.
pub fn load_tickets(path: &Path) -> Result<Vec<TicketRecord>> {
    let table = CsvTable::open(path)?;
    let date_idx = table.column(columns::OPENING_DATE)?;
    let count_idx = table.column(columns::OPENED_COUNT)?;

    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let opening_date = table.date_at(row, date_idx, columns::OPENING_DATE)?;
        let opened_count = table.count_at(row, count_idx, columns::OPENED_COUNT)?;
        records.push(TicketRecord {
            opening_date,
            opened_count,
        });
    }
    records.sort_by_key(|r| r.opening_date);

    debug!("Loaded {} ticket rows from {}", records.len(), path.display());
    Ok(records)
}

/// Load the invoiced-amount table.
pub fn load_invoices(path: &Path) -> Result<Vec<InvoiceRecord>> {
    let table = CsvTable::open(path)?;
    let date_idx = table.column(columns::CLOSING_DATE)?;
    let amount_idx = table.column(columns::TOTAL_AMOUNT)?;

    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let closing_date = table.date_at(row, date_idx, columns::CLOSING_DATE)?;
        let total_amount = table.amount_at(row, amount_idx, columns::TOTAL_AMOUNT)?;
        records.push(InvoiceRecord {
            closing_date,
            total_amount,
        });
    }
    records.sort_by_key(|r| r.closing_date);

    debug!("Loaded {} invoice rows from {}", records.len(), path.display());
    Ok(records)
}

/// Load the rejections table. Rows with an empty `RECHAZO` cell are skipped.
pub fn load_rejections(path: &Path) -> Result<Vec<RejectionRecord>> {
    let table = CsvTable::open(path)?;
    let flag_idx = table.column(columns::REJECTED)?;

    let mut records = Vec::with_capacity(table.rows.len());
    let mut skipped = 0usize;
    for row in &table.rows {
        let raw = row.record.get(flag_idx).unwrap_or("");
        match parse_flag(raw) {
            Ok(Some(is_rejected)) => records.push(RejectionRecord { is_rejected }),
            Ok(None) => skipped += 1,
            Err(()) => {
                return Err(DashboardError::InvalidFlag {
                    path: table.path.clone(),
                    row: row.line,
                    column: columns::REJECTED.to_string(),
                    value: raw.to_string(),
                })
            }
        }
    }

    if skipped > 0 {
        warn!(
            "Skipped {} rows with an empty {} value in {}",
            skipped,
            columns::REJECTED,
            path.display()
        );
    }
    debug!(
        "Loaded {} rejection rows from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

// ── Cell parsing ──────────────────────────────────────────────────────────────

/// Interpret a yes/no cell. `Ok(None)` means the cell is empty.
pub(crate) fn parse_flag(raw: &str) -> std::result::Result<Option<bool>, ()> {
    let value = raw.trim().to_lowercase();
    match value.as_str() {
        "" => Ok(None),
        "true" | "1" | "1.0" | "si" | "sí" | "s" | "yes" | "y" | "x" => Ok(Some(true)),
        "false" | "0" | "0.0" | "no" | "n" => Ok(Some(false)),
        _ => Err(()),
    }
}

/// Parse a non-negative number. An empty cell counts as zero.
///
/// A single `,` is accepted as the decimal separator when no `.` is present.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let value = raw.trim();
    if value.is_empty() {
        return Some(0.0);
    }

    let parsed = value.parse::<f64>().ok().or_else(|| {
        if !value.contains('.') && value.matches(',').count() == 1 {
            value.replace(',', ".").parse::<f64>().ok()
        } else {
            None
        }
    })?;

    (parsed.is_finite() && parsed >= 0.0).then_some(parsed)
}

/// Parse a non-negative integral count, tolerating a `.0` suffix.
pub fn parse_count(raw: &str) -> Option<u64> {
    let value = parse_amount(raw)?;
    (value.fract() == 0.0 && value <= u64::MAX as f64).then_some(value as u64)
}

// ── CsvTable ──────────────────────────────────────────────────────────────────

struct CsvRow {
    /// 1-based line number in the source file.
    line: usize,
    record: csv::StringRecord,
}

/// A fully-read CSV file with its header row.
struct CsvTable {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<CsvRow>,
}

impl CsvTable {
    fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|source| DashboardError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(std::io::BufReader::new(file));

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| DashboardError::csv(path, e.to_string()))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| DashboardError::csv(path, e.to_string()))?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(rows.len() + 2);
            rows.push(CsvRow { line, record });
        }

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DashboardError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }

    fn date_at(&self, row: &CsvRow, idx: usize, column: &str) -> Result<NaiveDate> {
        let raw = row.record.get(idx).unwrap_or("");
        parse_date(raw).ok_or_else(|| DashboardError::DateParse {
            path: self.path.clone(),
            row: row.line,
            column: column.to_string(),
            value: raw.to_string(),
        })
    }

    fn amount_at(&self, row: &CsvRow, idx: usize, column: &str) -> Result<f64> {
        let raw = row.record.get(idx).unwrap_or("");
        parse_amount(raw).ok_or_else(|| self.number_error(row, column, raw))
    }

    fn count_at(&self, row: &CsvRow, idx: usize, column: &str) -> Result<u64> {
        let raw = row.record.get(idx).unwrap_or("");
        parse_count(raw).ok_or_else(|| self.number_error(row, column, raw))
    }

    fn number_error(&self, row: &CsvRow, column: &str, raw: &str) -> DashboardError {
        DashboardError::NumberParse {
            path: self.path.clone(),
            row: row.line,
            column: column.to_string(),
            value: raw.to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
