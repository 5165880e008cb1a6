mod bootstrap;

use std::future::Future;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use dashboard_core::settings::Settings;
use dashboard_core::time_utils;
use dashboard_data::analysis::{build_report, DashboardTables};
use dashboard_report::json_view::render_json;
use dashboard_report::table_view::render_report;
use dashboard_runtime::discovery::{find_soffice_executable, office_python_path};
use dashboard_runtime::server::{LibreOfficeServer, LocalAutomationServer};
use dashboard_runtime::setup::run_setup;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Service dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Frequency: {}, Format: {}, Timezone: {}",
        settings.frequency,
        settings.format,
        settings.timezone
    );

    let output = run(&settings, refresh_inputs).await?;
    print!("{output}");
    Ok(())
}

/// Validate the selection, optionally refresh the inputs, then load and
/// render the report.
///
/// The date range is parsed before `refresh` runs so a bad `--start` or
/// `--end` never launches the setup phase.
async fn run<'a, F, Fut>(settings: &'a Settings, refresh: F) -> Result<String>
where
    F: FnOnce(&'a Settings) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let range = settings.date_range()?;

    if settings.extract {
        refresh(settings).await?;
    }

    let tables = DashboardTables::load(
        &settings.rejections_path(),
        &settings.tickets_path(),
        &settings.invoices_path(),
    )
    .with_context(|| format!("loading data from {}", settings.data_dir.display()))?;

    let today = time_utils::today_in(&settings.timezone);
    let report = build_report(&tables, range, settings.frequency, today);

    if settings.wants_json() {
        Ok(format!("{}\n", render_json(&report)?))
    } else {
        Ok(render_report(&report))
    }
}

/// Run the extraction script against a local automation server.
///
/// The server is stopped on success, on failure and on Ctrl+C.
async fn refresh_inputs(settings: &Settings) -> Result<()> {
    let soffice = find_soffice_executable(settings.soffice_path.as_deref())?;
    let python = office_python_path(&soffice)?;
    let mut server = LibreOfficeServer::new(
        soffice,
        settings.server_port,
        Duration::from_secs(settings.server_timeout),
    );

    tracing::info!("Running setup phase...");
    let interrupted = tokio::select! {
        result = run_setup(&mut server, &python, &settings.extraction_script) => {
            result.context("setup phase failed")?;
            false
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; stopping setup phase");
            true
        }
    };

    if interrupted {
        server.shutdown().await?;
        bail!("setup phase interrupted");
    }
    Ok(())
}
