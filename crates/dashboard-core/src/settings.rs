use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{DateRange, Frequency};
use crate::time_utils;

/// Directory under the home directory holding persisted state and logs.
pub const STATE_DIR_NAME: &str = ".service-dashboard";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Opened tickets, invoiced amount and rejections over a date range
#[derive(Parser, Debug, Clone)]
#[command(
    name = "service-dashboard",
    about = "Opened tickets, invoiced amount and rejections over a date range",
    version
)]
pub struct Settings {
    /// Directory containing the extracted CSV tables
    #[arg(long, env = "DASHBOARD_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Rejections table file name
    #[arg(long, default_value = "rechazos.csv")]
    pub rejections_file: String,

    /// Opened-tickets table file name
    #[arg(long, default_value = "partes_abiertos_por_dia.csv")]
    pub tickets_file: String,

    /// Invoiced-amount table file name
    #[arg(long, default_value = "importe_por_dia.csv")]
    pub invoices_file: String,

    /// First day of the range (inclusive)
    #[arg(long, default_value = "2024-09-01")]
    pub start: String,

    /// Last day of the range (inclusive); defaults to today
    #[arg(long)]
    pub end: Option<String>,

    /// Bucket width: day, week or month (D/W/M also accepted)
    #[arg(long, default_value = "week", value_parser = parse_frequency)]
    pub frequency: Frequency,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    pub format: String,

    /// Timezone used to resolve "today" (auto-detected if not specified)
    #[arg(long, default_value = "auto", value_parser = parse_timezone)]
    pub timezone: String,

    /// Start the office automation server and run the extraction script first
    #[arg(long)]
    pub extract: bool,

    /// Path to the office-suite executable
    #[arg(long, env = "SOFFICE_PATH")]
    pub soffice_path: Option<PathBuf>,

    /// Extraction script run with the office suite's bundled interpreter
    #[arg(long, default_value = "scripts/multiple_consulta.py")]
    pub extraction_script: PathBuf,

    /// Port the automation server listens on
    #[arg(long, default_value = "2002")]
    pub server_port: u16,

    /// Seconds to wait for the automation server to accept connections (1-600)
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..=600))]
    pub server_timeout: u64,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

fn parse_frequency(s: &str) -> std::result::Result<Frequency, String> {
    s.parse::<Frequency>().map_err(|e| e.to_string())
}

/// `auto` or an IANA timezone identifier.
fn parse_timezone(s: &str) -> std::result::Result<String, String> {
    if s == "auto" || time_utils::validate_timezone(s) {
        Ok(s.to_string())
    } else {
        Err(format!("unknown timezone '{s}'"))
    }
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.service-dashboard/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl LastUsedParams {
    /// Default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(STATE_DIR_NAME).join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with explicit args and config
    /// path.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins. The date range and input location are never persisted.
        if !is_arg_explicitly_set(&matches, "frequency") {
            if let Some(v) = last.frequency {
                settings.frequency = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format.filter(|f| f == "table" || f == "json") {
                settings.format = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone.filter(|tz| time_utils::validate_timezone(tz)) {
                settings.timezone = v;
            }
        }

        settings = Self::resolve_auto_values(settings);

        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// Resolve `"auto"` sentinel values and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = time_utils::get_system_timezone();
        }
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// The selected range; a missing `--end` resolves to today in the
    /// configured timezone.
    pub fn date_range(&self) -> Result<DateRange> {
        let start = time_utils::parse_user_date(&self.start)?;
        let end = match &self.end {
            Some(s) => time_utils::parse_user_date(s)?,
            None => time_utils::today_in(&self.timezone),
        };
        Ok(DateRange::new(start, end))
    }

    pub fn rejections_path(&self) -> PathBuf {
        self.data_dir.join(&self.rejections_file)
    }

    pub fn tickets_path(&self) -> PathBuf {
        self.data_dir.join(&self.tickets_file)
    }

    pub fn invoices_path(&self) -> PathBuf {
        self.data_dir.join(&self.invoices_file)
    }

    pub fn wants_json(&self) -> bool {
        self.format == "json"
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            frequency: Some(s.frequency),
            format: Some(s.format.clone()),
            timezone: Some(s.timezone.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
