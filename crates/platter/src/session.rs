//! User-adjustable assumptions.
//!
//! A session starts at the built-in defaults. A JSON file may override any
//! subset of fields; the file is read once and never written back.

use crate::error::{PlatterError, Result};
use platter_data::LoadOptions;
use platter_economics::{
    CostAssumptions, FeeOptimizer, GrowthAssumptions, LtvAssumptions, PnlAssumptions,
    RestaurantCosts, RetentionModel, ScenarioLevers, SimulationConfig, StepElasticity, TargetFees,
};
use platter_scoring::ScoringConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up under the user's config directory.
pub const SESSION_FILE: &str = "session.json";

/// Every scalar a user can adjust.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    /// Sheet names and enterprise threshold
    pub load: LoadOptions,
    /// Weights, normalization and tier cutoffs
    pub scoring: ScoringConfig,
    /// Per-tier fee and volume adjustments
    pub simulation: SimulationConfig,
    /// Per-tier target fees
    pub target_fees: TargetFees,
    /// Step elasticity used with the target fees
    pub elasticity: StepElasticity,
    /// Fee grid search
    pub optimizer: FeeOptimizer,
    /// Per-trip platform costs
    pub costs: CostAssumptions,
    /// Platform P&L inputs
    pub pnl: PnlAssumptions,
    /// P&L scenario levers
    pub levers: ScenarioLevers,
    /// Growth rates
    pub growth: GrowthAssumptions,
    /// Customer lifetime value inputs
    pub ltv: LtvAssumptions,
    /// Restaurant-side costs
    pub restaurant: RestaurantCosts,
    /// Cohort retention model
    pub retention: RetentionModel,
}

impl Session {
    /// Default session file location, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("platter").join(SESSION_FILE))
    }

    /// Load a session.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used when present and the built-in defaults otherwise.
    ///
    /// # Errors
    ///
    /// The file cannot be read or is not a valid session.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path),
                None => {
                    tracing::debug!("no session file; using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Read a session from a JSON file.
    ///
    /// # Errors
    ///
    /// The file cannot be read or is not a valid session.
    pub fn from_file(path: &Path) -> Result<Self> {
        let path_str = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| PlatterError::SessionIo {
            path: path_str.clone(),
            source,
        })?;
        let session = Self::from_json(&text).map_err(|source| PlatterError::SessionFormat {
            path: path_str.clone(),
            source,
        })?;
        tracing::info!(path = %path_str, "loaded session");
        Ok(session)
    }

    /// Parse a session from JSON; absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Malformed JSON or a field of the wrong type.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Check every assumption block.
    ///
    /// # Errors
    ///
    /// The first invalid block.
    pub fn validate(&self) -> Result<()> {
        self.scoring.cutoffs.validate()?;
        self.simulation.validate()?;
        self.optimizer.validate()?;
        self.costs.validate()?;
        self.levers.validate()?;
        self.growth.validate()?;
        self.ltv.validate()?;
        self.restaurant.validate()?;
        self.retention.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platter_scoring::Metric;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let session = Session::from_json(
            r#"{"scoring": {"weights": {"trip_volume": 1.0}}, "costs": {"courier_cost_per_trip": 6.0}}"#,
        )
        .unwrap();

        assert_eq!(session.scoring.weights.get(Metric::TripVolume), 1.0);
        assert_eq!(session.scoring.weights.get(Metric::CourierWait), 0.0);
        assert_eq!(session.costs.courier_cost_per_trip, 6.0);
        assert_eq!(session.costs.processing_fee, CostAssumptions::default().processing_fee);
        assert_eq!(session.simulation, SimulationConfig::default());
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(Session::from_json("{}").unwrap(), Session::default());
        assert!(Session::default().validate().is_ok());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Session::load(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(matches!(err, PlatterError::SessionIo { .. }));
    }
}
