#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/platter/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod normalize;
pub mod registry;
pub mod tiers;
pub mod weights;

pub use engine::{
    ScoreBand, ScoreResult, ScoreWarning, Scoreboard, ScoringConfig, ScoringEngine, score_band,
};
pub use error::{Result, ScoreError};
pub use normalize::{Normalization, ZERO_VARIANCE_SCORE};
pub use registry::{Direction, Metric, MetricInfo, available_metrics, get_metric_info};
pub use tiers::{Tier, TierCutoffs};
pub use weights::Weights;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
