//! Cross-sectional normalization expressions.
//!
//! Every normalized column lies in `[0, 1]` with 1 the best brand. A column
//! with no spread (max == min) normalizes to 0.5 for every brand.

use crate::registry::{Direction, Metric};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value substituted when a metric has zero variance.
pub const ZERO_VARIANCE_SCORE: f64 = 0.5;

/// Normalization method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// `(x - min) / (max - min)`
    #[default]
    MinMax,
    /// Average rank divided by the number of brands
    PercentRank,
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinMax => f.write_str("min-max"),
            Self::PercentRank => f.write_str("percent-rank"),
        }
    }
}

/// Add the min/max helper columns a metric's normalization needs.
pub fn range_columns(metric: Metric) -> [Expr; 2] {
    let column = metric.column();
    [
        col(column).min().alias(format!("{}_min", metric.name())),
        col(column).max().alias(format!("{}_max", metric.name())),
    ]
}

/// Normalized, direction-adjusted expression for a metric.
///
/// Expects the columns from [`range_columns`] to be present.
pub fn normalized(metric: Metric, method: Normalization) -> Expr {
    let column = metric.column();
    let min = col(format!("{}_min", metric.name()));
    let max = col(format!("{}_max", metric.name()));
    let spread = max - min.clone();

    let raw = match method {
        Normalization::MinMax => (col(column) - min) / spread.clone(),
        Normalization::PercentRank => {
            col(column)
                .rank(
                    RankOptions {
                        method: RankMethod::Average,
                        descending: false,
                    },
                    None,
                )
                .cast(DataType::Float64)
                / len().cast(DataType::Float64)
        }
    };

    let oriented = match metric.direction() {
        Direction::HigherIsBetter => raw,
        Direction::LowerIsBetter => lit(1.0) - raw,
    };

    when(spread.gt(lit(0.0)))
        .then(oriented)
        .otherwise(lit(ZERO_VARIANCE_SCORE))
        .alias(metric.norm_column())
}
