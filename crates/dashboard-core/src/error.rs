use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the service dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected the file (bad quoting, ragged rows, encoding).
    #[error("Malformed CSV in {path}: {message}")]
    Csv { path: PathBuf, message: String },

    /// A column the dashboard needs is absent from the header row.
    #[error("Missing column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// A date cell is empty or does not match any accepted format.
    #[error("{path}, row {row}: cannot parse date '{value}' in column '{column}'")]
    DateParse {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    /// A numeric cell is not a non-negative number.
    #[error("{path}, row {row}: cannot parse number '{value}' in column '{column}'")]
    NumberParse {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    /// A rejection flag is neither true-like nor false-like.
    #[error("{path}, row {row}: '{value}' is not a yes/no value in column '{column}'")]
    InvalidFlag {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    /// A frequency string is not one of day / week / month.
    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    /// A user-supplied date string could not be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// The office-suite executable (or its bundled interpreter) was not found.
    #[error("Office automation server not found: {0}")]
    ServerNotFound(String),

    /// The automation server was launched but never became reachable.
    #[error("Office automation server did not start: {0}")]
    ServerStartup(String),

    /// The extraction script exited unsuccessfully or could not be spawned.
    #[error("Extraction script failed: {0}")]
    Extraction(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;

impl DashboardError {
    /// Wrap a CSV reader failure for `path`.
    pub fn csv(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        DashboardError::Csv {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = DashboardError::FileRead {
            path: PathBuf::from("/data/rechazos.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/data/rechazos.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_missing_column() {
        let err = DashboardError::MissingColumn {
            path: PathBuf::from("importe_por_dia.csv"),
            column: "IMPORTE TOTAL".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing column 'IMPORTE TOTAL' in importe_por_dia.csv"
        );
    }

    #[test]
    fn test_error_display_date_parse() {
        let err = DashboardError::DateParse {
            path: PathBuf::from("partes.csv"),
            row: 4,
            column: "FECHA APERTURA".to_string(),
            value: "31/02".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "partes.csv, row 4: cannot parse date '31/02' in column 'FECHA APERTURA'"
        );
    }

    #[test]
    fn test_error_display_csv() {
        let err = DashboardError::csv("x.csv", "found record with 3 fields");
        let msg = err.to_string();
        assert!(msg.contains("Malformed CSV in x.csv"));
        assert!(msg.contains("3 fields"));
    }

    #[test]
    fn test_error_display_invalid_frequency() {
        let err = DashboardError::InvalidFrequency("hourly".to_string());
        assert_eq!(err.to_string(), "Invalid frequency: hourly");
    }

    #[test]
    fn test_error_display_extraction() {
        let err = DashboardError::Extraction("exit status: 1".to_string());
        assert_eq!(err.to_string(), "Extraction script failed: exit status: 1");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: DashboardError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
