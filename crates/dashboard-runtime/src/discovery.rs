//! Locating the office-suite executable and its bundled interpreter.
//!
//! Platform differences live here so the rest of the runtime only sees paths.

use std::path::{Path, PathBuf};

use dashboard_core::error::{DashboardError, Result};
use tracing::debug;

/// Fixed install locations probed on `os` (as in [`std::env::consts::OS`]).
///
/// `env` resolves environment variables; Windows locations depend on
/// `PROGRAMFILES` / `PROGRAMFILES(X86)`.
pub fn candidate_paths(os: &str, env: impl Fn(&str) -> Option<String>) -> Result<Vec<PathBuf>> {
    let paths = match os {
        "macos" => vec![
            PathBuf::from("/Applications/LibreOffice.app/Contents/MacOS/soffice"),
            PathBuf::from("/Applications/OpenOffice.app/Contents/MacOS/soffice"),
        ],
        "linux" => vec![
            PathBuf::from("/usr/bin/soffice"),
            PathBuf::from("/usr/local/bin/soffice"),
            PathBuf::from("/snap/bin/soffice"),
        ],
        "windows" => {
            let program_files =
                env("PROGRAMFILES").unwrap_or_else(|| r"C:\Program Files".to_string());
            let program_files_x86 =
                env("PROGRAMFILES(X86)").unwrap_or_else(|| r"C:\Program Files (x86)".to_string());
            [program_files, program_files_x86]
                .into_iter()
                .map(|base| {
                    PathBuf::from(base)
                        .join("LibreOffice")
                        .join("program")
                        .join("soffice.exe")
                })
                .collect()
        }
        other => {
            return Err(DashboardError::ServerNotFound(format!(
                "unsupported operating system: {other}"
            )))
        }
    };
    Ok(paths)
}

/// First existing file among `candidates`, then `fallback`.
pub fn first_existing(candidates: &[PathBuf], fallback: Option<&Path>) -> Option<PathBuf> {
    candidates
        .iter()
        .map(PathBuf::as_path)
        .chain(fallback)
        .find(|p| p.is_file())
        .map(Path::to_path_buf)
}

/// Locate `soffice` for the running platform.
///
/// The fixed install locations are probed first; `override_path` (normally
/// from `SOFFICE_PATH`) is used only when none of them exists.
pub fn find_soffice_executable(override_path: Option<&Path>) -> Result<PathBuf> {
    let candidates = candidate_paths(std::env::consts::OS, |k| std::env::var(k).ok())?;
    let found = first_existing(&candidates, override_path).ok_or_else(|| {
        DashboardError::ServerNotFound(
            "could not find 'soffice'; install LibreOffice or set SOFFICE_PATH".to_string(),
        )
    })?;
    debug!("using office executable {}", found.display());
    Ok(found)
}

/// Location of the interpreter bundled with the office suite, relative to
/// the installation that contains `soffice`.
///
/// Symlinks are resolved first, so `/usr/bin/soffice` maps into the real
/// installation directory.
pub fn office_python_path_for(os: &str, soffice: &Path) -> Result<PathBuf> {
    let resolved = std::fs::canonicalize(soffice).unwrap_or_else(|_| soffice.to_path_buf());
    let base = resolved
        .parent()
        .and_then(Path::parent)
        .ok_or_else(|| {
            DashboardError::ServerNotFound(format!(
                "cannot derive installation directory from {}",
                resolved.display()
            ))
        })?;

    let python = match os {
        "macos" => base.join("Resources").join("python"),
        "linux" => base.join("program").join("python"),
        "windows" => base.join("program").join("python.exe"),
        other => {
            return Err(DashboardError::ServerNotFound(format!(
                "unsupported operating system: {other}"
            )))
        }
    };

    if !python.is_file() {
        return Err(DashboardError::ServerNotFound(format!(
            "bundled interpreter not found at '{}'",
            python.display()
        )));
    }
    Ok(python)
}

/// [`office_python_path_for`] on the running platform.
pub fn office_python_path(soffice: &Path) -> Result<PathBuf> {
    office_python_path_for(std::env::consts::OS, soffice)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
