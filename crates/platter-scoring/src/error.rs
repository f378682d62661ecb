//! Error types for scoring.

use crate::registry::Metric;
use thiserror::Error;

/// Result type for scoring operations.
pub type Result<T> = std::result::Result<T, ScoreError>;

/// Errors that can occur while scoring brands.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Data error
    #[error("Data error: {0}")]
    Data(#[from] platter_data::DataError),

    /// Weight is negative or not finite
    #[error("Invalid weight for {metric}: {value}")]
    InvalidWeight {
        /// Offending metric
        metric: Metric,
        /// Offending value
        value: f64,
    },

    /// Weights sum to zero
    #[error("Weights sum to zero; at least one metric needs a positive weight")]
    DegenerateWeights,

    /// No metric can be scored with the available columns
    #[error("No scorable metrics: every weighted metric is missing from the data")]
    NoScorableMetrics,

    /// Tier cutoffs out of range
    #[error("Invalid tier cutoffs: {0}")]
    InvalidCutoffs(String),

    /// Metric name not recognised
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
}
