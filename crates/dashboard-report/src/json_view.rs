//! JSON rendering of a [`DashboardReport`].
//!
//! Dates serialise as `YYYY-MM-DD`; an absent mean or selectable range is
//! `null`.

use dashboard_data::analysis::DashboardReport;

/// Pretty-printed JSON document for `report`.
pub fn render_json(report: &DashboardReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
