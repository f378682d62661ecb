//! Error types for the dashboard.

use thiserror::Error;

/// Result type for dashboard operations.
pub type Result<T> = std::result::Result<T, PlatterError>;

/// Errors surfaced by [`crate::Dashboard`] and [`crate::Session`].
#[derive(Debug, Error)]
pub enum PlatterError {
    /// Data error
    #[error(transparent)]
    Data(#[from] platter_data::DataError),

    /// Scoring error
    #[error(transparent)]
    Score(#[from] platter_scoring::ScoreError),

    /// Calculator error
    #[error(transparent)]
    Economics(#[from] platter_economics::EconomicsError),

    /// Export error
    #[error(transparent)]
    Export(#[from] platter_output::ExportError),

    /// Report error
    #[error(transparent)]
    Report(#[from] platter_output::ReportError),

    /// Session file could not be read
    #[error("Failed to read session file {path}: {source}")]
    SessionIo {
        /// Path that was read
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// Session file is not valid JSON for a [`crate::Session`]
    #[error("Invalid session file {path}: {source}")]
    SessionFormat {
        /// Path that was read
        path: String,
        /// Underlying error
        source: serde_json::Error,
    },
}
