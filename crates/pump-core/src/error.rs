use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the pump dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A file could not be opened, read or copied.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV export could not be parsed.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be parsed or produced.
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A duration cell was not of the form `H:MM`.
    #[error("Invalid duration format: {0:?}")]
    DurationFormat(String),

    /// A pump condition cell was not of the form `<number>mL`.
    #[error("Invalid volume format: {0:?}")]
    VolumeFormat(String),

    /// A `Start` timestamp string did not match any recognised format.
    #[error("Invalid timestamp format: {0:?}")]
    TimestampParse(String),

    /// The rolling window lies outside the accepted range.
    #[error("Rolling window {0} is outside the accepted range 5-14")]
    InvalidWindow(usize),

    /// The dataset directory does not exist.
    #[error("Data path not found: {0}")]
    DataDirNotFound(PathBuf),

    /// No dataset is stored under the requested label.
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    /// The dataset directory contains no CSV files.
    #[error("No CSV datasets found in {0}")]
    NoDatasets(PathBuf),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
