//! Constant-rate growth projections.

use crate::error::{EconomicsError, Result};
use crate::revenue::annual_revenue;
use platter_data::BrandRecord;
use serde::{Deserialize, Serialize};

/// Longest projection, in periods, that [`GrowthAssumptions::validate`] accepts.
pub const MAX_GROWTH_PERIODS: u32 = 1_000;

/// `value × (1 + rate)^periods`.
pub fn compound(value: f64, rate: f64, periods: u32) -> f64 {
    value * (1.0 + rate).powf(f64::from(periods))
}

/// Growth rates per period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthAssumptions {
    /// Trip growth (default: 0.20)
    pub trip_growth: f64,
    /// Active location growth (default: 0.15)
    pub location_growth: f64,
    /// Basket growth (default: 0.05)
    pub basket_growth: f64,
    /// Number of compounding periods (default: 1)
    pub periods: u32,
}

impl Default for GrowthAssumptions {
    fn default() -> Self {
        Self {
            trip_growth: 0.20,
            location_growth: 0.15,
            basket_growth: 0.05,
            periods: 1,
        }
    }
}

impl GrowthAssumptions {
    /// Check every rate is finite and above -100%, and the horizon is at
    /// most [`MAX_GROWTH_PERIODS`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidAssumption` naming the first bad rate or the horizon.
    pub fn validate(&self) -> Result<()> {
        if self.periods > MAX_GROWTH_PERIODS {
            return Err(EconomicsError::invalid(format!(
                "{} periods exceeds the maximum of {MAX_GROWTH_PERIODS}",
                self.periods
            )));
        }
        let rates = [
            ("trip growth", self.trip_growth),
            ("location growth", self.location_growth),
            ("basket growth", self.basket_growth),
        ];
        for (name, rate) in rates {
            if !(rate > -1.0) || !rate.is_finite() {
                return Err(EconomicsError::invalid(format!("{name} {rate} must exceed -100%")));
            }
        }
        Ok(())
    }

    /// Project one brand.
    pub fn project(&self, record: &BrandRecord) -> GrowthProjection {
        let current_revenue = annual_revenue(record);
        let path: Vec<GrowthPoint> = (0..=self.periods).map(|p| self.point(record, p)).collect();
        let last = path.last().copied().unwrap_or_else(|| self.point(record, 0));
        let uplift = last.revenue - current_revenue;

        GrowthProjection {
            name: record.name.clone(),
            current_revenue,
            projected_trips: last.trips,
            projected_locations: last.locations,
            projected_basket: last.basket_size,
            projected_revenue: last.revenue,
            revenue_uplift: uplift,
            revenue_uplift_pct: if current_revenue != 0.0 {
                uplift / current_revenue * 100.0
            } else {
                0.0
            },
            path,
        }
    }

    fn point(&self, record: &BrandRecord, period: u32) -> GrowthPoint {
        let trips = compound(record.annual_trips, self.trip_growth, period);
        let basket_size = compound(record.basket_size, self.basket_growth, period);
        GrowthPoint {
            period,
            trips,
            locations: compound(record.active_locations, self.location_growth, period),
            basket_size,
            revenue: trips * basket_size * record.marketplace_fee,
        }
    }
}

/// State after a number of periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthPoint {
    /// Periods elapsed
    pub period: u32,
    /// Annual trips
    pub trips: f64,
    /// Active locations
    pub locations: f64,
    /// Average basket
    pub basket_size: f64,
    /// Marketplace revenue at the current fee
    pub revenue: f64,
}

/// Growth projection for one brand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthProjection {
    /// Brand name
    pub name: String,
    /// Revenue today
    pub current_revenue: f64,
    /// Trips after the last period
    pub projected_trips: f64,
    /// Locations after the last period
    pub projected_locations: f64,
    /// Basket after the last period
    pub projected_basket: f64,
    /// Revenue after the last period
    pub projected_revenue: f64,
    /// `projected_revenue - current_revenue`
    pub revenue_uplift: f64,
    /// Uplift, percent (0 when current revenue is 0)
    pub revenue_uplift_pct: f64,
    /// Period 0 through the last period
    pub path: Vec<GrowthPoint>,
}

/// Project every brand.
///
/// # Errors
///
/// See [`GrowthAssumptions::validate`].
pub fn project_growth(records: &[BrandRecord], assumptions: &GrowthAssumptions) -> Result<Vec<GrowthProjection>> {
    assumptions.validate()?;
    Ok(records.iter().map(|r| assumptions.project(r)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use platter_data::BrandField;
    use rstest::rstest;

    fn brand() -> BrandRecord {
        BrandRecord::named("A")
            .with(BrandField::AnnualTrips, 10_000.0)
            .with(BrandField::ActiveLocations, 20.0)
            .with(BrandField::BasketSize, 20.0)
            .with(BrandField::MarketplaceFee, 0.20)
    }

    #[rstest]
    #[case(100.0, 0.10, 0, 100.0)]
    #[case(100.0, 0.10, 1, 110.0)]
    #[case(100.0, 0.10, 2, 121.0)]
    #[case(100.0, -0.50, 2, 25.0)]
    fn test_compound(#[case] value: f64, #[case] rate: f64, #[case] periods: u32, #[case] want: f64) {
        assert_relative_eq!(compound(value, rate, periods), want, epsilon = 1e-9);
    }

    #[test]
    fn test_single_period_projection() {
        let projection = GrowthAssumptions::default().project(&brand());
        assert_relative_eq!(projection.projected_trips, 12_000.0, epsilon = 1e-9);
        assert_relative_eq!(projection.projected_locations, 23.0, epsilon = 1e-9);
        assert_relative_eq!(projection.projected_basket, 21.0, epsilon = 1e-9);
        assert_relative_eq!(projection.projected_revenue, 50_400.0, epsilon = 1e-6);
        assert_relative_eq!(projection.revenue_uplift_pct, 26.0, epsilon = 1e-9);
        assert_eq!(projection.path.len(), 2);
    }

    #[test]
    fn test_path_is_monotone_for_positive_rates() {
        let assumptions = GrowthAssumptions {
            periods: 4,
            ..GrowthAssumptions::default()
        };
        let projection = assumptions.project(&brand());
        assert_eq!(projection.path.len(), 5);
        assert!(projection.path.windows(2).all(|w| w[1].revenue > w[0].revenue));
        assert_relative_eq!(projection.path[0].revenue, projection.current_revenue);
    }

    #[test]
    fn test_compound_beyond_i32_range_keeps_growing() {
        let periods = u32::MAX;
        assert!(compound(100.0, 0.01, periods) > compound(100.0, 0.01, 1_000));
        assert!(compound(100.0, -0.01, periods) < 1e-9);
    }

    #[rstest]
    #[case(MAX_GROWTH_PERIODS, true)]
    #[case(MAX_GROWTH_PERIODS + 1, false)]
    #[case(i32::MAX as u32 + 1, false)]
    #[case(u32::MAX, false)]
    fn test_periods_limit(#[case] periods: u32, #[case] valid: bool) {
        let assumptions = GrowthAssumptions {
            periods,
            ..GrowthAssumptions::default()
        };
        assert_eq!(assumptions.validate().is_ok(), valid);
        if !valid {
            assert!(project_growth(&[brand()], &assumptions).is_err());
        }
    }

    #[test]
    fn test_rate_below_minus_one_rejected() {
        let assumptions = GrowthAssumptions {
            trip_growth: -1.0,
            ..GrowthAssumptions::default()
        };
        assert!(project_growth(&[brand()], &assumptions).is_err());
    }
}
