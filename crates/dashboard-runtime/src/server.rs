//! The local office automation server used by the extraction script.
//!
//! [`LocalAutomationServer`] is the seam between the setup phase and the
//! platform. [`LibreOfficeServer`] is the real implementation: it reuses a
//! server that already listens on the UNO port, otherwise launches a headless
//! instance and owns it until [`LocalAutomationServer::shutdown`].

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use dashboard_core::error::{DashboardError, Result};
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

/// Default UNO socket port.
pub const DEFAULT_PORT: u16 = 2002;

/// How long a terminated server gets to exit before it is killed.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// Outcome of [`LocalAutomationServer::ensure_running`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    /// The port was already served by a process this instance did not
    /// launch; it is left alone on shutdown.
    AlreadyRunning,
    /// This instance launched the server and will stop it on shutdown.
    Started,
}

/// A server that must be reachable while the extraction script runs.
#[allow(async_fn_in_trait)]
pub trait LocalAutomationServer {
    /// Make the server reachable, launching it if needed.
    async fn ensure_running(&mut self) -> Result<ServerStatus>;

    /// Stop the server if this process launched it. Idempotent.
    async fn shutdown(&mut self) -> Result<()>;
}

// ── LibreOfficeServer ─────────────────────────────────────────────────────────

/// A headless `soffice` listening on a local UNO socket.
pub struct LibreOfficeServer {
    executable: PathBuf,
    port: u16,
    startup_timeout: Duration,
    child: Option<Child>,
}

impl LibreOfficeServer {
    pub fn new(executable: PathBuf, port: u16, startup_timeout: Duration) -> Self {
        Self {
            executable,
            port,
            startup_timeout,
            child: None,
        }
    }

    /// Command-line arguments for a headless server on `port`.
    pub fn launch_args(port: u16) -> Vec<String> {
        vec![
            "--headless".to_string(),
            format!("--accept=socket,host=localhost,port={port};urp;"),
            "--norestore".to_string(),
        ]
    }

    /// `true` when something accepts TCP connections on the configured port.
    pub async fn is_listening(&self) -> bool {
        is_port_open(self.port).await
    }

    /// `true` while this instance owns a launched server process.
    pub fn owns_process(&self) -> bool {
        self.child.is_some()
    }

    /// Poll until the port accepts connections.
    ///
    /// A launcher that exits early may have handed the request to an office
    /// instance that was already running; the port is probed once more
    /// before that counts as a failure.
    async fn wait_until_ready(&mut self) -> Result<ServerStatus> {
        let deadline = Instant::now() + self.startup_timeout;
        loop {
            if is_port_open(self.port).await {
                return Ok(ServerStatus::Started);
            }
            if let Some(child) = self.child.as_mut() {
                if let Some(status) = child.try_wait()? {
                    self.child = None;
                    let outcome = early_exit_outcome(status, is_port_open(self.port).await);
                    if outcome.is_ok() {
                        info!(
                            "office launcher exited; port {} served by an existing instance",
                            self.port
                        );
                    }
                    return outcome;
                }
            }
            if Instant::now() >= deadline {
                return Err(DashboardError::ServerStartup(format!(
                    "port {} not reachable after {}s",
                    self.port,
                    self.startup_timeout.as_secs()
                )));
            }
            time::sleep(POLL_INTERVAL).await;
        }
    }
}

impl LocalAutomationServer for LibreOfficeServer {
    async fn ensure_running(&mut self) -> Result<ServerStatus> {
        if self.owns_process() {
            return Ok(ServerStatus::Started);
        }
        if self.is_listening().await {
            debug!("automation server already reachable on port {}", self.port);
            return Ok(ServerStatus::AlreadyRunning);
        }

        info!("Starting office automation server on port {}...", self.port);
        let child = Command::new(&self.executable)
            .args(Self::launch_args(self.port))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            // Dropping the handle on any early exit path must not leak the server.
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DashboardError::ServerStartup(format!(
                    "failed to launch {}: {e}",
                    self.executable.display()
                ))
            })?;
        self.child = Some(child);

        match self.wait_until_ready().await {
            Ok(status) => {
                info!("Office automation server ready");
                Ok(status)
            }
            Err(e) => {
                let _ = self.shutdown().await;
                Err(e)
            }
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        info!(
            "Stopping office automation server (pid {})",
            child.id().map_or_else(|| "?".to_string(), |p| p.to_string())
        );
        terminate(&mut child);

        let waited = time::timeout(SHUTDOWN_GRACE, child.wait()).await;
        match waited {
            Ok(status) => {
                debug!("automation server exited: {:?}", status);
            }
            Err(_) => {
                warn!(
                    "automation server did not exit within {}s; killing it",
                    SHUTDOWN_GRACE.as_secs()
                );
                child.kill().await?;
            }
        }
        Ok(())
    }
}

/// Ask `child` to exit: SIGTERM on unix, a hard kill elsewhere.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // SAFETY: plain syscall on a pid we spawned and have not reaped.
            unsafe {
                libc::kill(pid as libc::pid_t, libc::SIGTERM);
            }
            return;
        }
    }
    let _ = child.start_kill();
}

/// Outcome when the launched process exits before the port was seen open.
///
/// A clean exit with the port now reachable means another office instance
/// took over the accept request.
fn early_exit_outcome(status: ExitStatus, port_open: bool) -> Result<ServerStatus> {
    if status.success() && port_open {
        return Ok(ServerStatus::AlreadyRunning);
    }
    Err(DashboardError::ServerStartup(format!(
        "soffice exited before accepting connections ({status})"
    )))
}

/// `true` when a TCP connection to `127.0.0.1:port` succeeds promptly.
pub async fn is_port_open(port: u16) -> bool {
    matches!(
        time::timeout(CONNECT_TIMEOUT, TcpStream::connect(("127.0.0.1", port))).await,
        Ok(Ok(_))
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
