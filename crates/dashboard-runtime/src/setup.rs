//! Optional setup phase: refresh the CSV inputs before the report is built.
//!
//! The extraction script is run with the office suite's bundled interpreter
//! while a local automation server is reachable. The server is stopped
//! afterwards whether or not the script succeeded.

use std::path::Path;
use std::process::Stdio;

use dashboard_core::error::{DashboardError, Result};
use tokio::process::Command;
use tracing::{error, info, warn};

use crate::server::{LocalAutomationServer, ServerStatus};

/// Run `interpreter script` to completion.
///
/// A non-zero exit status is reported as [`DashboardError::Extraction`].
pub async fn run_extraction(interpreter: &Path, script: &Path) -> Result<()> {
    info!("Running extraction script {}", script.display());
    let status = Command::new(interpreter)
        .arg(script)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .map_err(|e| {
            DashboardError::Extraction(format!(
                "failed to launch {}: {e}",
                interpreter.display()
            ))
        })?;

    if !status.success() {
        return Err(DashboardError::Extraction(format!(
            "{} exited with {status}",
            script.display()
        )));
    }
    info!("Extraction finished");
    Ok(())
}

/// Bring up `server`, run the extraction script, then shut the server down.
///
/// Shutdown runs on every path once the server is up. A shutdown failure is
/// logged; the extraction result takes precedence.
pub async fn run_setup<S: LocalAutomationServer>(
    server: &mut S,
    interpreter: &Path,
    script: &Path,
) -> Result<()> {
    if !script.is_file() {
        return Err(DashboardError::Extraction(format!(
            "extraction script not found: {}",
            script.display()
        )));
    }

    match server.ensure_running().await? {
        ServerStatus::AlreadyRunning => info!("Using running office automation server"),
        ServerStatus::Started => info!("Office automation server started for extraction"),
    }

    let result = run_extraction(interpreter, script).await;
    if let Err(e) = &result {
        error!("Extraction failed: {}", e);
    }

    if let Err(e) = server.shutdown().await {
        warn!("Failed to stop office automation server: {}", e);
        if result.is_ok() {
            return Err(e);
        }
    }
    result
}

// ── Tests ─────────────────────────────────────────────────────────────────────
