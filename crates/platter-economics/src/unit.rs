//! Per-trip unit economics.
//!
//! `contribution_margin = revenue − courier − processing − defect − acquisition`,
//! all per trip. The defect cost is the defect rate times the support cost of
//! one defect; the acquisition cost is the first-time share times CAC.

use crate::error::{EconomicsError, Result};
use platter_data::BrandRecord;
use serde::{Deserialize, Serialize};

/// Platform cost assumptions, per trip unless stated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostAssumptions {
    /// Courier payout per trip (default: 5.00)
    pub courier_cost_per_trip: f64,
    /// Cost to acquire one first-time customer (default: 15.00)
    pub customer_acquisition_cost: f64,
    /// Payment processing per trip (default: 0.30)
    pub processing_fee: f64,
    /// Support cost of one defective order (default: 10.00)
    pub support_cost_per_defect: f64,
}

impl Default for CostAssumptions {
    fn default() -> Self {
        Self {
            courier_cost_per_trip: 5.0,
            customer_acquisition_cost: 15.0,
            processing_fee: 0.30,
            support_cost_per_defect: 10.0,
        }
    }
}

impl CostAssumptions {
    /// Check every cost is finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAssumption` naming the first bad cost.
    pub fn validate(&self) -> Result<()> {
        let costs = [
            ("courier cost", self.courier_cost_per_trip),
            ("acquisition cost", self.customer_acquisition_cost),
            ("processing fee", self.processing_fee),
            ("support cost", self.support_cost_per_defect),
        ];
        for (name, value) in costs {
            if !value.is_finite() || value < 0.0 {
                return Err(EconomicsError::invalid(format!("{name} must be non-negative, got {value}")));
            }
        }
        Ok(())
    }

    /// Per-trip cost components for a brand.
    pub fn breakdown(&self, record: &BrandRecord) -> CostBreakdown {
        CostBreakdown {
            courier: self.courier_cost_per_trip,
            processing: self.processing_fee,
            defect: record.defect_rate * self.support_cost_per_defect,
            acquisition: record.first_time_share * self.customer_acquisition_cost,
        }
    }
}

/// Per-trip cost components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Courier payout
    pub courier: f64,
    /// Payment processing
    pub processing: f64,
    /// Expected defect handling
    pub defect: f64,
    /// Amortized acquisition
    pub acquisition: f64,
}

impl CostBreakdown {
    /// Sum of all components.
    pub fn total(&self) -> f64 {
        self.courier + self.processing + self.defect + self.acquisition
    }

    /// Every component multiplied by `k`.
    pub fn scaled(&self, k: f64) -> Self {
        Self {
            courier: self.courier * k,
            processing: self.processing * k,
            defect: self.defect * k,
            acquisition: self.acquisition * k,
        }
    }
}

/// Revenue less every cost component.
pub fn contribution_margin(revenue: f64, costs: &CostBreakdown) -> f64 {
    revenue - costs.courier - costs.processing - costs.defect - costs.acquisition
}

/// Unit economics of one brand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitEconomics {
    /// Brand name
    pub name: String,
    /// Platform revenue per trip (basket × fee)
    pub revenue_per_trip: f64,
    /// Cost components per trip
    pub costs: CostBreakdown,
    /// Total cost per trip
    pub total_cost_per_trip: f64,
    /// Margin per trip
    pub margin_per_trip: f64,
    /// Margin as a percent of revenue (0 when revenue is 0)
    pub margin_pct: f64,
    /// Margin per trip × annual trips
    pub annual_margin: f64,
    /// Margin per trip is positive
    pub profitable: bool,
}

impl UnitEconomics {
    /// Unit economics for one brand.
    pub fn for_brand(record: &BrandRecord, assumptions: &CostAssumptions) -> Self {
        let revenue = record.revenue_per_order();
        let costs = assumptions.breakdown(record);
        let margin = contribution_margin(revenue, &costs);
        Self {
            name: record.name.clone(),
            revenue_per_trip: revenue,
            costs,
            total_cost_per_trip: costs.total(),
            margin_per_trip: margin,
            margin_pct: if revenue != 0.0 { margin / revenue * 100.0 } else { 0.0 },
            annual_margin: margin * record.annual_trips,
            profitable: margin > 0.0,
        }
    }
}

/// Unit economics for every brand.
///
/// # Errors
///
/// See [`CostAssumptions::validate`].
pub fn unit_economics(records: &[BrandRecord], assumptions: &CostAssumptions) -> Result<Vec<UnitEconomics>> {
    assumptions.validate()?;
    Ok(records
        .iter()
        .map(|r| UnitEconomics::for_brand(r, assumptions))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use platter_data::BrandField;

    fn brand() -> BrandRecord {
        BrandRecord::named("A")
            .with(BrandField::AnnualTrips, 1_000.0)
            .with(BrandField::BasketSize, 40.0)
            .with(BrandField::MarketplaceFee, 0.25)
            .with(BrandField::DefectRate, 0.05)
            .with(BrandField::FirstTimeShare, 0.10)
    }

    #[test]
    fn test_breakdown() {
        let unit = UnitEconomics::for_brand(&brand(), &CostAssumptions::default());
        assert_relative_eq!(unit.revenue_per_trip, 10.0, epsilon = 1e-12);
        assert_relative_eq!(unit.costs.defect, 0.5, epsilon = 1e-12);
        assert_relative_eq!(unit.costs.acquisition, 1.5, epsilon = 1e-12);
        assert_relative_eq!(unit.total_cost_per_trip, 7.3, epsilon = 1e-12);
        assert_relative_eq!(unit.margin_per_trip, 2.7, epsilon = 1e-12);
        assert_relative_eq!(unit.margin_pct, 27.0, epsilon = 1e-9);
        assert_relative_eq!(unit.annual_margin, 2_700.0, epsilon = 1e-9);
        assert!(unit.profitable);
    }

    #[test]
    fn test_zero_revenue_margin_pct() {
        let unit = UnitEconomics::for_brand(&BrandRecord::named("Z"), &CostAssumptions::default());
        assert_eq!(unit.margin_pct, 0.0);
        assert!(!unit.profitable);
    }

    #[test]
    fn test_margin_is_linear_in_costs() {
        let costs = CostBreakdown {
            courier: 3.0,
            processing: 0.5,
            defect: 0.25,
            acquisition: 1.25,
        };
        let revenue = 20.0;
        let single = 1.0 - contribution_margin(revenue, &costs) / revenue;
        let double = 1.0 - contribution_margin(revenue, &costs.scaled(2.0)) / revenue;
        assert_relative_eq!(double, 2.0 * single, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_cost_rejected() {
        let assumptions = CostAssumptions {
            processing_fee: -1.0,
            ..CostAssumptions::default()
        };
        assert!(unit_economics(&[brand()], &assumptions).is_err());
    }
}
