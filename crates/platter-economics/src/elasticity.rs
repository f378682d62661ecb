//! Fee elasticity.
//!
//! Three views of how volume responds to the marketplace fee:
//!
//! - a constant linear elasticity applied to revenue directly,
//! - an asymmetric step elasticity (volume moves a fixed amount per 5%
//!   relative fee change, more for cuts than for rises) used to move each
//!   tier to a target fee,
//! - a grid search for the revenue-maximizing fee change under a constant
//!   elasticity.

use crate::error::{EconomicsError, Result};
use crate::revenue::annual_revenue;
use platter_data::BrandRecord;
use platter_scoring::{Scoreboard, Tier};
use serde::{Deserialize, Serialize};

/// Revenue after a relative fee change under a linear elasticity.
///
/// `adjusted = base × (1 + elasticity × fee_delta_pct)`, where
/// `fee_delta_pct` is a fraction (0.05 for +5%).
pub fn adjusted_revenue(base_revenue: f64, elasticity: f64, fee_delta_pct: f64) -> f64 {
    base_revenue * (1.0 + elasticity * fee_delta_pct)
}

/// Asymmetric step elasticity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepElasticity {
    /// Relative fee change per step (default: 0.05)
    pub step: f64,
    /// Volume gained per step of fee decrease (default: 0.20)
    pub decrease_lift: f64,
    /// Volume lost per step of fee increase (default: 0.10)
    pub increase_drop: f64,
}

impl Default for StepElasticity {
    fn default() -> Self {
        Self {
            step: 0.05,
            decrease_lift: 0.20,
            increase_drop: 0.10,
        }
    }
}

impl StepElasticity {
    /// Relative volume change for a relative fee change.
    pub fn volume_change(&self, fee_change_pct: f64) -> f64 {
        let steps = fee_change_pct / self.step;
        if fee_change_pct < 0.0 {
            -steps * self.decrease_lift
        } else {
            -steps * self.increase_drop
        }
    }
}

/// Absolute target fee per tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetFees {
    /// Gold target fee (default: 0.15)
    pub gold: f64,
    /// Silver target fee (default: 0.20)
    pub silver: f64,
    /// Bronze target fee (default: 0.22)
    pub bronze: f64,
}

impl Default for TargetFees {
    fn default() -> Self {
        Self {
            gold: 0.15,
            silver: 0.20,
            bronze: 0.22,
        }
    }
}

impl TargetFees {
    /// Target fee for a tier.
    pub const fn for_tier(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Gold => self.gold,
            Tier::Silver => self.silver,
            Tier::Bronze => self.bronze,
        }
    }
}

/// One brand moved to its tier's target fee.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetFeeImpact {
    /// Brand name
    pub name: String,
    /// Tier
    pub tier: Tier,
    /// Current fee
    pub current_fee: f64,
    /// Target fee
    pub new_fee: f64,
    /// Relative fee change
    pub fee_change_pct: f64,
    /// Relative volume change
    pub volume_change_pct: f64,
    /// Current trips
    pub current_trips: f64,
    /// Trips after the change
    pub new_trips: f64,
    /// Current revenue
    pub current_revenue: f64,
    /// Revenue after the change
    pub new_revenue: f64,
}

/// Move every scored brand to its tier's target fee.
///
/// Brands with a zero current fee have no defined relative change and are
/// treated as unchanged in volume.
pub fn apply_target_fees(
    board: &Scoreboard,
    targets: &TargetFees,
    elasticity: &StepElasticity,
) -> Vec<TargetFeeImpact> {
    board
        .results
        .iter()
        .map(|result| {
            let record = &result.brand;
            let new_fee = targets.for_tier(result.tier);
            let fee_change_pct = if record.marketplace_fee > 0.0 {
                (new_fee - record.marketplace_fee) / record.marketplace_fee
            } else {
                0.0
            };
            let volume_change_pct = elasticity.volume_change(fee_change_pct);
            let new_trips = record.annual_trips * (1.0 + volume_change_pct);

            TargetFeeImpact {
                name: record.name.clone(),
                tier: result.tier,
                current_fee: record.marketplace_fee,
                new_fee,
                fee_change_pct,
                volume_change_pct,
                current_trips: record.annual_trips,
                new_trips,
                current_revenue: annual_revenue(record),
                new_revenue: new_trips * record.basket_size * new_fee,
            }
        })
        .collect()
}

/// Largest number of fee changes the optimizer evaluates per brand.
pub const MAX_GRID_POINTS: usize = 10_000;

/// Grid search for the revenue-maximizing relative fee change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeOptimizer {
    /// Constant elasticity of trips to the fee (default: -1.5)
    pub elasticity: f64,
    /// Smallest relative change tried (default: -0.05)
    pub min_change: f64,
    /// Largest relative change tried (default: 0.05)
    pub max_change: f64,
    /// Grid step (default: 0.005)
    pub step: f64,
}

impl Default for FeeOptimizer {
    fn default() -> Self {
        Self {
            elasticity: -1.5,
            min_change: -0.05,
            max_change: 0.05,
            step: 0.005,
        }
    }
}

/// Revenue-maximizing fee for one brand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeRecommendation {
    /// Brand name
    pub name: String,
    /// Current fee
    pub current_fee: f64,
    /// Recommended fee (the current fee when no change helps)
    pub optimal_fee: f64,
    /// Relative fee change, percent
    pub fee_change_pct: f64,
    /// Trips at the recommended fee
    pub projected_trips: f64,
    /// Revenue at the recommended fee
    pub projected_revenue: f64,
    /// Revenue gain over today
    pub revenue_change: f64,
    /// Revenue gain over today, percent (0 when current revenue is 0)
    pub revenue_change_pct: f64,
}

impl FeeOptimizer {
    /// Check the grid is usable.
    ///
    /// # Errors
    ///
    /// Every bound must be finite, the step positive, the range non-empty
    /// and above -100%, and the grid no larger than [`MAX_GRID_POINTS`].
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("elasticity", self.elasticity),
            ("min change", self.min_change),
            ("max change", self.max_change),
            ("step", self.step),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(EconomicsError::invalid(format!(
                    "optimizer {name} {value} must be finite"
                )));
            }
        }
        if !(self.step > 0.0) {
            return Err(EconomicsError::invalid("optimizer step must be positive"));
        }
        if !(self.min_change <= self.max_change) || self.min_change <= -1.0 {
            return Err(EconomicsError::invalid(format!(
                "optimizer range {}..{} is not valid",
                self.min_change, self.max_change
            )));
        }
        let points = ((self.max_change - self.min_change) / self.step).round();
        if !(points < MAX_GRID_POINTS as f64) {
            return Err(EconomicsError::invalid(format!(
                "optimizer grid of {points} steps exceeds {MAX_GRID_POINTS} points"
            )));
        }
        Ok(())
    }

    /// Relative changes on the grid, inclusive of both ends.
    ///
    /// Holds at most [`MAX_GRID_POINTS`] values; an unvalidated grid with a
    /// non-finite span yields only `min_change`.
    pub fn grid(&self) -> Vec<f64> {
        let steps = ((self.max_change - self.min_change) / self.step).round();
        let steps = if steps.is_finite() && steps > 0.0 {
            (steps as usize).min(MAX_GRID_POINTS - 1)
        } else {
            0
        };
        (0..=steps)
            .map(|i| self.min_change + i as f64 * self.step)
            .collect()
    }

    /// Best fee for one brand.
    pub fn optimize(&self, record: &BrandRecord) -> FeeRecommendation {
        let current_revenue = annual_revenue(record);
        let mut best = (record.marketplace_fee, record.annual_trips, current_revenue);

        for change in self.grid() {
            let fee = record.marketplace_fee * (1.0 + change);
            let trips = record.annual_trips * (1.0 + change * self.elasticity);
            let revenue = trips * record.basket_size * fee;
            if revenue > best.2 {
                best = (fee, trips, revenue);
            }
        }

        let (optimal_fee, projected_trips, projected_revenue) = best;
        let pct = |delta: f64, base: f64| if base != 0.0 { delta / base * 100.0 } else { 0.0 };

        FeeRecommendation {
            name: record.name.clone(),
            current_fee: record.marketplace_fee,
            optimal_fee,
            fee_change_pct: pct(optimal_fee - record.marketplace_fee, record.marketplace_fee),
            projected_trips,
            projected_revenue,
            revenue_change: projected_revenue - current_revenue,
            revenue_change_pct: pct(projected_revenue - current_revenue, current_revenue),
        }
    }

    /// Best fee for every brand.
    ///
    /// # Errors
    ///
    /// See [`FeeOptimizer::validate`].
    pub fn optimize_all(&self, records: &[BrandRecord]) -> Result<Vec<FeeRecommendation>> {
        self.validate()?;
        Ok(records.iter().map(|r| self.optimize(r)).collect())
    }
}
