//! Shared types for the service dashboard: records, date ranges and
//! frequencies, statistics over aggregated series, settings, and errors.

pub mod calculations;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{DashboardError, Result};
