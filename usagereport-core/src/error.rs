//! Error taxonomy for the report pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors raised while building or writing a usage report
#[derive(Debug, Error)]
pub enum ReportError {
    /// Input is missing required column positions or row counts
    #[error("schema error: {0}")]
    Schema(String),

    /// A cell could not be interpreted as the value its field requires
    #[error("parse error at row {row}, field '{field}': {message}")]
    Parse {
        /// 1-based worksheet row, as shown by spreadsheet applications
        row: u32,
        field: &'static str,
        message: String,
    },

    /// Nothing survived filtering and grouping
    #[error("empty report: no usage rows remain after excluding '{excluded_zone}'")]
    EmptyReport { excluded_zone: String },

    /// Records belong to more than one billing month
    #[error("period mismatch: expected {expected}, found {found} (row {row})")]
    PeriodMismatch {
        expected: String,
        found: String,
        row: u32,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    /// The spreadsheet library could not open or decode the input
    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// The output package could not be assembled
    #[error("failed to build xlsx package: {0}")]
    Package(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<zip::result::ZipError> for ReportError {
    fn from(err: zip::result::ZipError) -> Self {
        ReportError::Package(err.to_string())
    }
}
