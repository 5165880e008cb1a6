//! Presentation of dashboard reports as plain-text tables or JSON.

pub mod json_view;
pub mod table_view;

pub use dashboard_core as core;
