//! Restaurant-side profitability.
//!
//! A brand whose own margin on delivery orders is thin is a churn risk. The
//! restaurant keeps `basket × (1 − fee)` and pays food cost, labor and
//! packaging out of it.

use crate::error::{EconomicsError, Result};
use platter_data::BrandRecord;
use serde::{Deserialize, Serialize};

/// Restaurant cost assumptions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestaurantCosts {
    /// Cost of goods as a share of basket (default: 0.30)
    pub cogs_rate: f64,
    /// Labor per order (default: 5.00)
    pub labor_per_order: f64,
    /// Packaging per order (default: 1.50)
    pub packaging_per_order: f64,
    /// Margin below which a brand is at risk, percent (default: 5)
    pub at_risk_margin_pct: f64,
    /// Margin the fee reduction aims for, fraction (default: 0.10)
    pub target_margin: f64,
}

impl Default for RestaurantCosts {
    fn default() -> Self {
        Self {
            cogs_rate: 0.30,
            labor_per_order: 5.00,
            packaging_per_order: 1.50,
            at_risk_margin_pct: 5.0,
            target_margin: 0.10,
        }
    }
}

impl RestaurantCosts {
    /// Check the rates are usable.
    ///
    /// # Errors
    ///
    /// COGS and target margin must lie in `0..=1`; per-order costs must be
    /// non-negative.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.cogs_rate) || !(0.0..=1.0).contains(&self.target_margin) {
            return Err(EconomicsError::invalid("COGS rate and target margin must be within 0..=1"));
        }
        if !(self.labor_per_order >= 0.0) || !(self.packaging_per_order >= 0.0) {
            return Err(EconomicsError::invalid("per-order restaurant costs must be non-negative"));
        }
        Ok(())
    }

    /// Restaurant costs for one order of this basket.
    pub fn per_order(&self, basket: f64) -> f64 {
        basket * self.cogs_rate + self.labor_per_order + self.packaging_per_order
    }

    /// Profitability of one brand.
    pub fn evaluate(&self, record: &BrandRecord) -> RestaurantProfitability {
        let basket = record.basket_size;
        let revenue = basket * (1.0 - record.marketplace_fee);
        let costs = self.per_order(basket);
        let margin = revenue - costs;
        let margin_pct = if basket > 0.0 { margin / basket * 100.0 } else { 0.0 };

        // Highest fee that still leaves the target margin.
        let fee_reduction = if basket > 0.0 {
            let max_fee = 1.0 - self.target_margin - costs / basket;
            (record.marketplace_fee - max_fee).max(0.0)
        } else {
            0.0
        };

        RestaurantProfitability {
            name: record.name.clone(),
            revenue_per_order: revenue,
            cost_per_order: costs,
            margin_per_order: margin,
            margin_pct,
            annual_profit: margin * record.annual_trips,
            at_risk: margin < 0.0 || margin_pct < self.at_risk_margin_pct,
            fee_reduction_to_target: fee_reduction,
        }
    }
}

/// Restaurant-side economics of one brand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantProfitability {
    /// Brand name
    pub name: String,
    /// What the restaurant keeps per order
    pub revenue_per_order: f64,
    /// Food, labor and packaging per order
    pub cost_per_order: f64,
    /// Margin per order
    pub margin_per_order: f64,
    /// Margin as a percent of basket
    pub margin_pct: f64,
    /// Margin × annual trips
    pub annual_profit: f64,
    /// Negative or thin margin
    pub at_risk: bool,
    /// Fee reduction (absolute) needed to reach the target margin
    pub fee_reduction_to_target: f64,
}

/// Restaurant profitability for every brand.
///
/// # Errors
///
/// See [`RestaurantCosts::validate`].
pub fn restaurant_profitability(
    records: &[BrandRecord],
    costs: &RestaurantCosts,
) -> Result<Vec<RestaurantProfitability>> {
    costs.validate()?;
    Ok(records.iter().map(|r| costs.evaluate(r)).collect())
}
