//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while reading input data.
///
/// Problems inside a readable file (missing columns, bad cells) are not
/// errors; they are collected in a [`crate::LoadReport`].
#[derive(Debug, Error)]
pub enum DataError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Spreadsheet could not be parsed
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// File extension not recognised as a workbook or CSV export
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// Workbook contains no sheets
    #[error("Workbook has no sheets: {0}")]
    EmptyWorkbook(String),

    /// A column required by the caller is absent
    #[error("Missing column: {0}")]
    MissingColumn(String),
}
