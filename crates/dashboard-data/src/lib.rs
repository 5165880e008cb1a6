//! Data layer for the service dashboard.
//!
//! Loads the extracted CSV tables, resamples the dated series into
//! day / week / month buckets and assembles the per-interaction report.

pub mod aggregator;
pub mod analysis;
pub mod reader;

pub use dashboard_core as core;
