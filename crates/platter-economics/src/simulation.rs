//! Tiered fee simulation.
//!
//! Each tier gets a fee adjustment in percentage points and an assumed volume
//! lift in percent. The proposed fee is clamped to a floor and a cap; brands
//! whose unclamped fee lands strictly outside that band are flagged.

use crate::error::{EconomicsError, Result};
use crate::revenue::annual_revenue;
use platter_scoring::{Scoreboard, Tier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Lowest marketplace fee a simulation may propose.
pub const FEE_FLOOR: f64 = 0.10;

/// Highest marketplace fee a simulation may propose.
pub const FEE_CAP: f64 = 0.30;

/// Market share the trip change is applied to.
pub const BASELINE_MARKET_SHARE: f64 = 0.18;

/// Fee and volume assumptions for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierAdjustment {
    /// Fee change in percentage points (-2.0 means 20% → 18%)
    pub fee_change_pp: f64,
    /// Volume change in percent
    pub volume_lift_pct: f64,
}

impl TierAdjustment {
    /// Adjustment from percentage points and percent.
    pub const fn new(fee_change_pp: f64, volume_lift_pct: f64) -> Self {
        Self {
            fee_change_pp,
            volume_lift_pct,
        }
    }
}

/// Simulation assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Gold tier (default: -2pp fee, +20% volume)
    pub gold: TierAdjustment,
    /// Silver tier (default: -0.5pp fee, +10% volume)
    pub silver: TierAdjustment,
    /// Bronze tier (default: +2pp fee, -5% volume)
    pub bronze: TierAdjustment,
    /// Fee floor (default: 0.10)
    pub fee_floor: f64,
    /// Fee cap (default: 0.30)
    pub fee_cap: f64,
    /// Baseline market share (default: 0.18)
    pub baseline_market_share: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gold: TierAdjustment::new(-2.0, 20.0),
            silver: TierAdjustment::new(-0.5, 10.0),
            bronze: TierAdjustment::new(2.0, -5.0),
            fee_floor: FEE_FLOOR,
            fee_cap: FEE_CAP,
            baseline_market_share: BASELINE_MARKET_SHARE,
        }
    }
}

impl SimulationConfig {
    /// Adjustment for a tier.
    pub const fn adjustment(&self, tier: Tier) -> TierAdjustment {
        match tier {
            Tier::Gold => self.gold,
            Tier::Silver => self.silver,
            Tier::Bronze => self.bronze,
        }
    }

    /// Whether every tier adjustment equals its default.
    pub fn is_at_defaults(&self) -> bool {
        let defaults = Self::default();
        self.gold == defaults.gold && self.silver == defaults.silver && self.bronze == defaults.bronze
    }

    /// Check the assumptions are usable.
    ///
    /// # Errors
    ///
    /// The fee band must satisfy `0 <= floor <= cap <= 1`, every value must
    /// be finite and no volume lift may go below -100%.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fee_floor)
            || !(0.0..=1.0).contains(&self.fee_cap)
            || self.fee_floor > self.fee_cap
        {
            return Err(EconomicsError::invalid(format!(
                "fee band {}..{} is not valid",
                self.fee_floor, self.fee_cap
            )));
        }
        for tier in Tier::ALL {
            let adj = self.adjustment(tier);
            if !adj.fee_change_pp.is_finite() || !adj.volume_lift_pct.is_finite() {
                return Err(EconomicsError::invalid(format!("{tier} adjustment is not finite")));
            }
            if adj.volume_lift_pct < -100.0 {
                return Err(EconomicsError::invalid(format!(
                    "{tier} volume lift {}% is below -100%",
                    adj.volume_lift_pct
                )));
            }
        }
        Ok(())
    }

    /// Run the simulation over a scored board.
    ///
    /// # Errors
    ///
    /// See [`SimulationConfig::validate`].
    pub fn simulate(&self, board: &Scoreboard) -> Result<Simulation> {
        self.validate()?;

        let rows: Vec<SimulationRow> = board
            .results
            .iter()
            .map(|result| {
                let record = &result.brand;
                let adj = self.adjustment(result.tier);
                let raw_fee = round6(record.marketplace_fee + adj.fee_change_pp / 100.0);
                let new_fee = raw_fee.clamp(self.fee_floor, self.fee_cap);
                let new_trips = record.annual_trips * (1.0 + adj.volume_lift_pct / 100.0);
                let current_revenue = annual_revenue(record);
                let new_revenue = new_trips * record.basket_size * new_fee;
                let revenue_delta = new_revenue - current_revenue;

                SimulationRow {
                    name: record.name.clone(),
                    tier: result.tier,
                    rank: result.rank,
                    annual_trips: record.annual_trips,
                    basket_size: record.basket_size,
                    current_fee: record.marketplace_fee,
                    current_revenue,
                    fee_change_pp: adj.fee_change_pp,
                    volume_lift_pct: adj.volume_lift_pct,
                    new_fee,
                    new_trips,
                    new_revenue,
                    revenue_delta,
                    revenue_delta_pct: percent_of(revenue_delta, current_revenue),
                    direction: FeeDirection::of(adj.fee_change_pp),
                    capped: raw_fee > self.fee_cap,
                    floored: raw_fee < self.fee_floor,
                }
            })
            .collect();

        let totals = SimulationTotals::from_rows(&rows, self.baseline_market_share);
        debug!(
            brands = rows.len(),
            revenue_delta = totals.revenue_delta,
            capped = totals.capped,
            floored = totals.floored,
            "Fee simulation complete"
        );
        Ok(Simulation { rows, totals })
    }
}

/// Sign of a proposed fee change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeDirection {
    /// Fee goes up
    Increase,
    /// Fee goes down
    Decrease,
    /// No change
    Unchanged,
}

impl FeeDirection {
    fn of(change: f64) -> Self {
        if change > 0.0 {
            Self::Increase
        } else if change < 0.0 {
            Self::Decrease
        } else {
            Self::Unchanged
        }
    }
}

impl fmt::Display for FeeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Increase => "↑",
            Self::Decrease => "↓",
            Self::Unchanged => "—",
        })
    }
}

/// One brand in the simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRow {
    /// Brand name
    pub name: String,
    /// Tier
    pub tier: Tier,
    /// Rank
    pub rank: usize,
    /// Current annual trips
    pub annual_trips: f64,
    /// Average basket
    pub basket_size: f64,
    /// Current fee
    pub current_fee: f64,
    /// Current annual revenue
    pub current_revenue: f64,
    /// Intended fee change, pp (before clamping)
    pub fee_change_pp: f64,
    /// Volume lift, percent
    pub volume_lift_pct: f64,
    /// Proposed fee after clamping
    pub new_fee: f64,
    /// Projected annual trips
    pub new_trips: f64,
    /// Projected annual revenue
    pub new_revenue: f64,
    /// `new_revenue - current_revenue`
    pub revenue_delta: f64,
    /// Delta as a percent of current revenue (0 when current revenue is 0)
    pub revenue_delta_pct: f64,
    /// Direction of the intended fee change
    pub direction: FeeDirection,
    /// Unclamped fee was above the cap
    pub capped: bool,
    /// Unclamped fee was below the floor
    pub floored: bool,
}

/// Per-tier revenue bridge.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TierImpact {
    /// Brands in the tier
    pub brands: usize,
    /// Current revenue
    pub current_revenue: f64,
    /// Projected revenue
    pub new_revenue: f64,
    /// Mean current fee
    pub avg_current_fee: f64,
    /// Mean proposed fee
    pub avg_new_fee: f64,
    /// Current trips
    pub current_trips: f64,
    /// Projected trips
    pub new_trips: f64,
    /// Revenue delta
    pub revenue_delta: f64,
    /// Revenue delta, percent
    pub revenue_delta_pct: f64,
}

/// Aggregate simulation results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationTotals {
    /// Current revenue
    pub current_revenue: f64,
    /// Projected revenue
    pub new_revenue: f64,
    /// Revenue delta
    pub revenue_delta: f64,
    /// Current trips
    pub current_trips: f64,
    /// Projected trips
    pub new_trips: f64,
    /// Trip change, percent
    pub trip_change_pct: f64,
    /// Implied market share after the trip change (fraction)
    pub market_share: f64,
    /// Brands clamped at the cap
    pub capped: usize,
    /// Brands clamped at the floor
    pub floored: usize,
    /// Brands with an intended increase
    pub fee_increases: usize,
    /// Brands with an intended decrease
    pub fee_decreases: usize,
    /// Per-tier bridge; every tier is present
    pub by_tier: BTreeMap<Tier, TierImpact>,
}

impl SimulationTotals {
    fn from_rows(rows: &[SimulationRow], baseline_share: f64) -> Self {
        let current_revenue: f64 = rows.iter().map(|r| r.current_revenue).sum();
        let new_revenue: f64 = rows.iter().map(|r| r.new_revenue).sum();
        let current_trips: f64 = rows.iter().map(|r| r.annual_trips).sum();
        let new_trips: f64 = rows.iter().map(|r| r.new_trips).sum();
        let trip_change_pct = percent_of(new_trips - current_trips, current_trips);

        let by_tier = Tier::ALL
            .into_iter()
            .map(|tier| {
                let tier_rows: Vec<&SimulationRow> = rows.iter().filter(|r| r.tier == tier).collect();
                (tier, TierImpact::from_rows(&tier_rows))
            })
            .collect();

        Self {
            current_revenue,
            new_revenue,
            revenue_delta: new_revenue - current_revenue,
            current_trips,
            new_trips,
            trip_change_pct,
            market_share: baseline_share * (1.0 + trip_change_pct / 100.0),
            capped: rows.iter().filter(|r| r.capped).count(),
            floored: rows.iter().filter(|r| r.floored).count(),
            fee_increases: rows.iter().filter(|r| r.fee_change_pp > 0.0).count(),
            fee_decreases: rows.iter().filter(|r| r.fee_change_pp < 0.0).count(),
            by_tier,
        }
    }
}

impl TierImpact {
    fn from_rows(rows: &[&SimulationRow]) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let n = rows.len() as f64;
        let current_revenue: f64 = rows.iter().map(|r| r.current_revenue).sum();
        let new_revenue: f64 = rows.iter().map(|r| r.new_revenue).sum();
        let delta = new_revenue - current_revenue;
        Self {
            brands: rows.len(),
            current_revenue,
            new_revenue,
            avg_current_fee: rows.iter().map(|r| r.current_fee).sum::<f64>() / n,
            avg_new_fee: rows.iter().map(|r| r.new_fee).sum::<f64>() / n,
            current_trips: rows.iter().map(|r| r.annual_trips).sum(),
            new_trips: rows.iter().map(|r| r.new_trips).sum(),
            revenue_delta: delta,
            revenue_delta_pct: percent_of(delta, current_revenue),
        }
    }
}

/// Simulation output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Simulation {
    /// One row per brand, in board order
    pub rows: Vec<SimulationRow>,
    /// Aggregates
    pub totals: SimulationTotals,
}

fn round6(x: f64) -> f64 {
    (x * 1e6).round() / 1e6
}

fn percent_of(delta: f64, base: f64) -> f64 {
    if base != 0.0 { delta / base * 100.0 } else { 0.0 }
}
