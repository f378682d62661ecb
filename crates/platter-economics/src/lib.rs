#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/platter/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod density;
pub mod elasticity;
pub mod error;
pub mod growth;
pub mod ltv;
pub mod pnl;
pub mod restaurant;
pub mod retention;
pub mod revenue;
pub mod simulation;
pub mod unit;

pub use density::{DensityAnalysis, DensityBucket, DensityBucketSummary, DensityCorrelations, analyze_density};
pub use elasticity::{
    FeeOptimizer, FeeRecommendation, MAX_GRID_POINTS, StepElasticity, TargetFeeImpact, TargetFees,
    adjusted_revenue, apply_target_fees,
};
pub use error::{EconomicsError, Result};
pub use growth::{
    GrowthAssumptions, GrowthPoint, GrowthProjection, MAX_GROWTH_PERIODS, compound, project_growth,
};
pub use ltv::{CustomerLtv, HEALTHY_LTV_CAC, LtvAssumptions, RetentionCurve, customer_ltv};
pub use pnl::{PlatformPnl, PnlAssumptions, Scenario, ScenarioKind, ScenarioLevers};
pub use restaurant::{RestaurantCosts, RestaurantProfitability, restaurant_profitability};
pub use retention::{CohortRetention, MAX_COHORT_MONTHS, RetentionModel, cohort_retention};
pub use revenue::{BrandRevenue, annual_revenue, brand_revenue, revenue_table, total_revenue};
pub use simulation::{
    BASELINE_MARKET_SHARE, FEE_CAP, FEE_FLOOR, FeeDirection, Simulation, SimulationConfig,
    SimulationRow, SimulationTotals, TierAdjustment, TierImpact,
};
pub use unit::{CostAssumptions, CostBreakdown, UnitEconomics, contribution_margin, unit_economics};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
