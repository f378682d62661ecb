//! Platform profit and loss.
//!
//! The baseline aggregates every brand into one platform view: marketplace
//! plus delivery-fee revenue against courier, refund and fixed platform
//! costs. Scenarios pull one or more levers and report the change in
//! contribution margin against that baseline.

use crate::error::{EconomicsError, Result};
use crate::revenue::total_revenue;
use platter_data::BrandRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inputs to the baseline P&L.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PnlAssumptions {
    /// Delivery fee charged per order (default: 2.50)
    pub delivery_fee: f64,
    /// Courier cost per order (default: 5.00)
    pub courier_cost: f64,
    /// Share of orders refunded (default: 0.07)
    pub defect_rate: f64,
    /// Average refund per defective order (default: 15.00)
    pub avg_refund: f64,
    /// Fixed annual platform costs (default: 10,000,000)
    pub platform_costs: f64,
}

impl Default for PnlAssumptions {
    fn default() -> Self {
        Self {
            delivery_fee: 2.50,
            courier_cost: 5.00,
            defect_rate: 0.07,
            avg_refund: 15.00,
            platform_costs: 10e6,
        }
    }
}

/// Levers pulled by the scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioLevers {
    /// Delivery fee increase per order (default: 1.50)
    pub delivery_fee_increase: f64,
    /// Relative defect reduction (default: 0.50)
    pub defect_reduction: f64,
    /// Extra orders per courier, relative (default: 0.15)
    pub efficiency_gain: f64,
}

impl Default for ScenarioLevers {
    fn default() -> Self {
        Self {
            delivery_fee_increase: 1.50,
            defect_reduction: 0.50,
            efficiency_gain: 0.15,
        }
    }
}

impl ScenarioLevers {
    /// Check the levers are usable.
    ///
    /// # Errors
    ///
    /// Defect reduction must lie in `0..=1` and the efficiency gain must be
    /// above -100%.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.defect_reduction) {
            return Err(EconomicsError::invalid(format!(
                "defect reduction {} must be within 0..=1",
                self.defect_reduction
            )));
        }
        if !(self.efficiency_gain > -1.0) || !self.delivery_fee_increase.is_finite() {
            return Err(EconomicsError::invalid("efficiency gain must exceed -100%"));
        }
        Ok(())
    }
}

/// Platform P&L for one set of inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformPnl {
    /// Orders per year
    pub total_orders: f64,
    /// Trip-weighted mean basket
    pub avg_basket: f64,
    /// Delivery fee per order
    pub delivery_fee: f64,
    /// Courier cost per order
    pub courier_cost: f64,
    /// Refund rate
    pub defect_rate: f64,
    /// Refund per defect
    pub avg_refund: f64,
    /// Take-rate revenue
    pub marketplace_revenue: f64,
    /// Delivery fee revenue
    pub delivery_revenue: f64,
    /// Courier costs
    pub courier_costs: f64,
    /// Refund costs
    pub refund_costs: f64,
    /// Fixed platform costs
    pub platform_costs: f64,
}

impl PlatformPnl {
    /// Baseline P&L over every brand.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientData` when there are no orders.
    pub fn baseline(records: &[BrandRecord], assumptions: &PnlAssumptions) -> Result<Self> {
        let total_orders: f64 = records.iter().map(|r| r.annual_trips).sum();
        if !(total_orders > 0.0) {
            return Err(EconomicsError::InsufficientData(
                "baseline P&L needs at least one order".to_string(),
            ));
        }
        let avg_basket = records
            .iter()
            .map(|r| r.annual_trips * r.basket_size)
            .sum::<f64>()
            / total_orders;

        Ok(Self {
            total_orders,
            avg_basket,
            delivery_fee: assumptions.delivery_fee,
            courier_cost: assumptions.courier_cost,
            defect_rate: assumptions.defect_rate,
            avg_refund: assumptions.avg_refund,
            marketplace_revenue: total_revenue(records),
            delivery_revenue: total_orders * assumptions.delivery_fee,
            courier_costs: total_orders * assumptions.courier_cost,
            refund_costs: total_orders * assumptions.defect_rate * assumptions.avg_refund,
            platform_costs: assumptions.platform_costs,
        })
    }

    /// Marketplace plus delivery revenue.
    pub fn total_revenue(&self) -> f64 {
        self.marketplace_revenue + self.delivery_revenue
    }

    /// Courier, refund and platform costs.
    pub fn total_costs(&self) -> f64 {
        self.courier_costs + self.refund_costs + self.platform_costs
    }

    /// Revenue less costs.
    pub fn contribution_margin(&self) -> f64 {
        self.total_revenue() - self.total_costs()
    }

    /// Margin as a percent of revenue (0 without revenue).
    pub fn margin_pct(&self) -> f64 {
        let revenue = self.total_revenue();
        if revenue > 0.0 { self.contribution_margin() / revenue * 100.0 } else { 0.0 }
    }

    /// Higher delivery fee on the same orders.
    pub fn with_delivery_fee_increase(&self, increase: f64) -> Self {
        let delivery_fee = self.delivery_fee + increase;
        Self {
            delivery_fee,
            delivery_revenue: self.total_orders * delivery_fee,
            ..self.clone()
        }
    }

    /// Fewer refunds; revenue unchanged.
    pub fn with_defect_reduction(&self, reduction: f64) -> Self {
        let defect_rate = self.defect_rate * (1.0 - reduction);
        Self {
            defect_rate,
            refund_costs: self.total_orders * defect_rate * self.avg_refund,
            ..self.clone()
        }
    }

    /// Couriers carry more orders; variable lines scale, fixed costs do not.
    pub fn with_courier_efficiency(&self, gain: f64) -> Self {
        let k = 1.0 + gain;
        Self {
            total_orders: self.total_orders * k,
            marketplace_revenue: self.marketplace_revenue * k,
            delivery_revenue: self.delivery_revenue * k,
            courier_costs: self.courier_costs * k,
            refund_costs: self.refund_costs * k,
            ..self.clone()
        }
    }

    /// All three levers at once.
    pub fn with_levers(&self, levers: &ScenarioLevers) -> Self {
        let k = 1.0 + levers.efficiency_gain;
        let total_orders = self.total_orders * k;
        let delivery_fee = self.delivery_fee + levers.delivery_fee_increase;
        let defect_rate = self.defect_rate * (1.0 - levers.defect_reduction);
        Self {
            total_orders,
            delivery_fee,
            defect_rate,
            marketplace_revenue: self.marketplace_revenue * k,
            delivery_revenue: total_orders * delivery_fee,
            courier_costs: self.courier_costs * k,
            refund_costs: total_orders * defect_rate * self.avg_refund,
            ..self.clone()
        }
    }

    /// Every scenario against this baseline, in display order.
    ///
    /// # Errors
    ///
    /// See [`ScenarioLevers::validate`].
    pub fn scenarios(&self, levers: &ScenarioLevers) -> Result<Vec<Scenario>> {
        levers.validate()?;
        let base = self.contribution_margin();
        let scenario = |kind, pnl: Self| Scenario {
            kind,
            delta: pnl.contribution_margin() - base,
            pnl,
        };
        Ok(vec![
            scenario(
                ScenarioKind::DeliveryFee,
                self.with_delivery_fee_increase(levers.delivery_fee_increase),
            ),
            scenario(
                ScenarioKind::DefectReduction,
                self.with_defect_reduction(levers.defect_reduction),
            ),
            scenario(
                ScenarioKind::CourierEfficiency,
                self.with_courier_efficiency(levers.efficiency_gain),
            ),
            scenario(ScenarioKind::Combined, self.with_levers(levers)),
        ])
    }
}

/// Which lever a scenario pulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Delivery fee increase
    DeliveryFee,
    /// Defect reduction
    DefectReduction,
    /// Courier efficiency
    CourierEfficiency,
    /// All levers
    Combined,
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::DeliveryFee => "Delivery fee increase",
            Self::DefectReduction => "Defect reduction",
            Self::CourierEfficiency => "Courier efficiency",
            Self::Combined => "Combined",
        })
    }
}

/// A scenario and its change in contribution margin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    /// Lever
    pub kind: ScenarioKind,
    /// P&L under the scenario
    pub pnl: PlatformPnl,
    /// Margin change against the baseline
    pub delta: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use platter_data::BrandField;

    fn records() -> Vec<BrandRecord> {
        vec![
            BrandRecord::named("A")
                .with(BrandField::AnnualTrips, 1_000_000.0)
                .with(BrandField::BasketSize, 30.0)
                .with(BrandField::MarketplaceFee, 0.20),
            BrandRecord::named("B")
                .with(BrandField::AnnualTrips, 3_000_000.0)
                .with(BrandField::BasketSize, 20.0)
                .with(BrandField::MarketplaceFee, 0.25),
        ]
    }

    fn baseline() -> PlatformPnl {
        PlatformPnl::baseline(&records(), &PnlAssumptions::default()).unwrap()
    }

    #[test]
    fn test_baseline() {
        let pnl = baseline();
        assert_relative_eq!(pnl.total_orders, 4e6);
        assert_relative_eq!(pnl.avg_basket, 22.5, epsilon = 1e-12);
        // 6M + 15M take rate, 10M delivery
        assert_relative_eq!(pnl.total_revenue(), 31e6, epsilon = 1e-3);
        // 20M courier, 4.2M refunds, 10M platform
        assert_relative_eq!(pnl.total_costs(), 34.2e6, epsilon = 1e-3);
        assert_relative_eq!(pnl.contribution_margin(), -3.2e6, epsilon = 1e-3);
    }

    #[test]
    fn test_scenarios() {
        let pnl = baseline();
        let scenarios = pnl.scenarios(&ScenarioLevers::default()).unwrap();
        assert_eq!(scenarios.len(), 4);

        assert_eq!(scenarios[0].kind, ScenarioKind::DeliveryFee);
        assert_relative_eq!(scenarios[0].delta, 6e6, epsilon = 1e-3);

        assert_eq!(scenarios[1].kind, ScenarioKind::DefectReduction);
        assert_relative_eq!(scenarios[1].delta, 2.1e6, epsilon = 1e-3);

        // Variable margin of 31M - 24.2M scaled by 15%.
        assert_eq!(scenarios[2].kind, ScenarioKind::CourierEfficiency);
        assert_relative_eq!(scenarios[2].delta, 0.15 * 6.8e6, epsilon = 1e-3);
        assert_relative_eq!(scenarios[2].pnl.platform_costs, 10e6);

        let combined = &scenarios[3];
        assert!(combined.delta > scenarios[0].delta);
        assert_relative_eq!(combined.pnl.delivery_fee, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_no_orders() {
        assert!(matches!(
            PlatformPnl::baseline(&[], &PnlAssumptions::default()),
            Err(EconomicsError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_invalid_levers() {
        let levers = ScenarioLevers {
            defect_reduction: 1.5,
            ..ScenarioLevers::default()
        };
        assert!(baseline().scenarios(&levers).is_err());
    }
}
