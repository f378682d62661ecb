//! Error types for economics calculations.

use thiserror::Error;

/// Result type for economics calculations.
pub type Result<T> = std::result::Result<T, EconomicsError>;

/// Errors that can occur in the calculators.
#[derive(Debug, Error)]
pub enum EconomicsError {
    /// An assumption is outside its valid range
    #[error("Invalid assumption: {0}")]
    InvalidAssumption(String),

    /// Not enough data for the calculation
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

impl EconomicsError {
    pub(crate) fn invalid(what: impl Into<String>) -> Self {
        Self::InvalidAssumption(what.into())
    }
}
