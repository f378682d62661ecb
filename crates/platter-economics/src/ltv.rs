//! Customer lifetime value against acquisition cost.

use crate::error::{EconomicsError, Result};
use platter_data::BrandRecord;
use serde::{Deserialize, Serialize};

/// LTV:CAC ratio above which unit economics are considered healthy.
pub const HEALTHY_LTV_CAC: f64 = 3.0;

/// Share of a cohort still ordering at each checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionCurve {
    /// Month 1 (default: 0.65)
    pub month_1: f64,
    /// Month 3 (default: 0.45)
    pub month_3: f64,
    /// Month 6 (default: 0.35)
    pub month_6: f64,
    /// Month 12 (default: 0.20)
    pub month_12: f64,
    /// Month 24 (default: 0.10)
    pub month_24: f64,
}

impl Default for RetentionCurve {
    fn default() -> Self {
        Self {
            month_1: 0.65,
            month_3: 0.45,
            month_6: 0.35,
            month_12: 0.20,
            month_24: 0.10,
        }
    }
}

impl RetentionCurve {
    /// Retained customer-months over the first year.
    ///
    /// Month 1 counts once, months 2–3 at the month-3 rate, 4–6 at the
    /// month-6 rate and 7–12 at the month-12 rate.
    pub fn first_year_months(&self) -> f64 {
        self.month_1 + 2.0 * self.month_3 + 3.0 * self.month_6 + 6.0 * self.month_12
    }
}

/// LTV inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LtvAssumptions {
    /// Retention curve
    pub retention: RetentionCurve,
    /// Orders per active month (default: 2.5)
    pub orders_per_month: f64,
    /// Cost to acquire one first-time customer (default: 15.00)
    pub acquisition_cost: f64,
}

impl Default for LtvAssumptions {
    fn default() -> Self {
        Self {
            retention: RetentionCurve::default(),
            orders_per_month: 2.5,
            acquisition_cost: 15.0,
        }
    }
}

impl LtvAssumptions {
    /// Check the curve lies in `0..=1` and the rates are non-negative.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAssumption` describing the bad input.
    pub fn validate(&self) -> Result<()> {
        let r = &self.retention;
        let points = [r.month_1, r.month_3, r.month_6, r.month_12, r.month_24];
        if points.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(EconomicsError::invalid("retention rates must be within 0..=1"));
        }
        if !(self.orders_per_month >= 0.0) || !(self.acquisition_cost >= 0.0) {
            return Err(EconomicsError::invalid(
                "orders per month and acquisition cost must be non-negative",
            ));
        }
        Ok(())
    }

    /// LTV metrics for one brand.
    pub fn evaluate(&self, record: &BrandRecord) -> CustomerLtv {
        let monthly = self.orders_per_month * record.basket_size * record.marketplace_fee;
        let ltv = monthly * self.retention.first_year_months();
        let cac = record.first_time_share * self.acquisition_cost;
        let ratio = (cac > 0.0).then(|| ltv / cac);

        CustomerLtv {
            name: record.name.clone(),
            monthly_contribution: monthly,
            ltv_12_month: ltv,
            cac,
            payback_months: (monthly > 0.0).then(|| cac / monthly),
            ltv_cac_ratio: ratio,
            healthy: ratio.is_some_and(|r| r > HEALTHY_LTV_CAC),
            lifetime_margin: ltv - cac,
        }
    }
}

/// LTV metrics for one brand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerLtv {
    /// Brand name
    pub name: String,
    /// Platform revenue per customer-month
    pub monthly_contribution: f64,
    /// Twelve-month LTV
    pub ltv_12_month: f64,
    /// Acquisition cost per customer
    pub cac: f64,
    /// Months to recover CAC; `None` without monthly revenue
    pub payback_months: Option<f64>,
    /// LTV / CAC; `None` when CAC is 0
    pub ltv_cac_ratio: Option<f64>,
    /// Ratio above [`HEALTHY_LTV_CAC`]
    pub healthy: bool,
    /// LTV less CAC
    pub lifetime_margin: f64,
}

/// LTV metrics for every brand.
///
/// # Errors
///
/// See [`LtvAssumptions::validate`].
pub fn customer_ltv(records: &[BrandRecord], assumptions: &LtvAssumptions) -> Result<Vec<CustomerLtv>> {
    assumptions.validate()?;
    Ok(records.iter().map(|r| assumptions.evaluate(r)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use platter_data::BrandField;

    #[test]
    fn test_first_year_months() {
        assert_relative_eq!(RetentionCurve::default().first_year_months(), 3.8, epsilon = 1e-12);
    }

    #[test]
    fn test_evaluate() {
        let record = BrandRecord::named("A")
            .with(BrandField::BasketSize, 20.0)
            .with(BrandField::MarketplaceFee, 0.20)
            .with(BrandField::FirstTimeShare, 0.10);
        let ltv = LtvAssumptions::default().evaluate(&record);

        assert_relative_eq!(ltv.monthly_contribution, 10.0, epsilon = 1e-12);
        assert_relative_eq!(ltv.ltv_12_month, 38.0, epsilon = 1e-9);
        assert_relative_eq!(ltv.cac, 1.5, epsilon = 1e-12);
        assert_relative_eq!(ltv.payback_months.unwrap(), 0.15, epsilon = 1e-12);
        assert_relative_eq!(ltv.ltv_cac_ratio.unwrap(), 38.0 / 1.5, epsilon = 1e-9);
        assert!(ltv.healthy);
        assert_relative_eq!(ltv.lifetime_margin, 36.5, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_cac_has_no_ratio() {
        let record = BrandRecord::named("A")
            .with(BrandField::BasketSize, 20.0)
            .with(BrandField::MarketplaceFee, 0.20);
        let ltv = LtvAssumptions::default().evaluate(&record);
        assert_eq!(ltv.ltv_cac_ratio, None);
        assert!(!ltv.healthy);

        let empty = LtvAssumptions::default().evaluate(&BrandRecord::named("B"));
        assert_eq!(empty.payback_months, None);
    }

    #[test]
    fn test_invalid_curve() {
        let assumptions = LtvAssumptions {
            retention: RetentionCurve {
                month_1: 1.2,
                ..RetentionCurve::default()
            },
            ..LtvAssumptions::default()
        };
        assert!(customer_ltv(&[], &assumptions).is_err());
    }
}
