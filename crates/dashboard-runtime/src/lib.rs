//! Setup-phase runtime for the service dashboard.
//!
//! Locates the office suite, keeps its automation server alive while the
//! extraction script refreshes the CSV inputs, and stops it again.

pub mod discovery;
pub mod server;
pub mod setup;

pub use dashboard_core as core;
