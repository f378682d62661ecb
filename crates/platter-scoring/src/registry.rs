//! Metric Registry
//!
//! The fixed set of brand metrics that can carry a scoring weight, with
//! their direction and default weight.

use platter_data::{BrandField, BrandRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ScoreError;

/// Whether a larger raw value is better or worse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Larger is better (volume, revenue)
    HigherIsBetter,
    /// Smaller is better (wait time, defects)
    LowerIsBetter,
}

/// Scoring metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Annualized trips
    TripVolume,
    /// Average courier wait
    CourierWait,
    /// Order defect rate
    DefectRate,
    /// Basket size × marketplace fee
    RevenuePerOrder,
    /// Average basket size
    BasketSize,
    /// Franchised share of locations
    FranchiseShare,
    /// Share of orders from first-time eaters
    FirstTimeShare,
    /// Active share of total locations
    LocationActivation,
}

/// Metric metadata
#[derive(Debug, Clone)]
pub struct MetricInfo {
    /// Metric
    pub metric: Metric,
    /// Short label for tables
    pub label: &'static str,
    /// Brief description of what the metric measures
    pub description: &'static str,
    /// Scoring direction
    pub direction: Direction,
    /// Weight in the default scoring profile
    pub default_weight: f64,
    /// Brand fields the metric is computed from
    pub required_fields: &'static [BrandField],
}

impl Metric {
    /// All metrics, in display order.
    pub const ALL: [Self; 8] = [
        Self::TripVolume,
        Self::CourierWait,
        Self::DefectRate,
        Self::RevenuePerOrder,
        Self::BasketSize,
        Self::FranchiseShare,
        Self::FirstTimeShare,
        Self::LocationActivation,
    ];

    /// Identifier used in configuration files and on the command line.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TripVolume => "trip_volume",
            Self::CourierWait => "courier_wait",
            Self::DefectRate => "defect_rate",
            Self::RevenuePerOrder => "revenue_per_order",
            Self::BasketSize => "basket_size",
            Self::FranchiseShare => "franchise_share",
            Self::FirstTimeShare => "first_time_share",
            Self::LocationActivation => "location_activation",
        }
    }

    /// Short label for tables.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::TripVolume => "Trip Volume",
            Self::CourierWait => "Courier Wait",
            Self::DefectRate => "Defect Rate",
            Self::RevenuePerOrder => "Revenue / Order",
            Self::BasketSize => "Basket Size",
            Self::FranchiseShare => "Franchised",
            Self::FirstTimeShare => "First-Time Share",
            Self::LocationActivation => "Activation",
        }
    }

    /// Scoring direction.
    pub const fn direction(&self) -> Direction {
        match self {
            Self::CourierWait | Self::DefectRate => Direction::LowerIsBetter,
            _ => Direction::HigherIsBetter,
        }
    }

    /// Weight in the default scoring profile.
    pub const fn default_weight(&self) -> f64 {
        match self {
            Self::TripVolume | Self::RevenuePerOrder => 35.0,
            Self::CourierWait => 18.0,
            Self::DefectRate => 12.0,
            _ => 0.0,
        }
    }

    /// Brand fields the metric is computed from.
    pub const fn required_fields(&self) -> &'static [BrandField] {
        match self {
            Self::TripVolume => &[BrandField::AnnualTrips],
            Self::CourierWait => &[BrandField::CourierWait],
            Self::DefectRate => &[BrandField::DefectRate],
            Self::RevenuePerOrder => &[BrandField::BasketSize, BrandField::MarketplaceFee],
            Self::BasketSize => &[BrandField::BasketSize],
            Self::FranchiseShare => &[BrandField::FranchiseShare],
            Self::FirstTimeShare => &[BrandField::FirstTimeShare],
            Self::LocationActivation => &[BrandField::ActiveLocations, BrandField::TotalLocations],
        }
    }

    /// Metadata for this metric.
    pub const fn info(&self) -> MetricInfo {
        MetricInfo {
            metric: *self,
            label: self.label(),
            description: match self {
                Self::TripVolume => "Annualized trips on the marketplace",
                Self::CourierWait => "Average minutes a courier waits at pickup",
                Self::DefectRate => "Share of orders with a defect",
                Self::RevenuePerOrder => "Marketplace revenue per order (basket × fee)",
                Self::BasketSize => "Average basket size",
                Self::FranchiseShare => "Share of locations that are franchised",
                Self::FirstTimeShare => "Share of orders from first-time eaters",
                Self::LocationActivation => "Active share of total locations",
            },
            direction: self.direction(),
            default_weight: self.default_weight(),
            required_fields: self.required_fields(),
        }
    }

    /// Column holding the raw metric in the scoring frame.
    pub const fn column(&self) -> &'static str {
        match self {
            Self::TripVolume => "annual_trips",
            Self::CourierWait => "courier_wait_minutes",
            Self::DefectRate => "defect_rate",
            Self::RevenuePerOrder => "revenue_per_order",
            Self::BasketSize => "basket_size",
            Self::FranchiseShare => "franchise_share",
            Self::FirstTimeShare => "first_time_share",
            Self::LocationActivation => "location_activation",
        }
    }

    /// Column holding the normalized metric in the scoring frame.
    pub fn norm_column(&self) -> String {
        format!("{}_norm", self.name())
    }

    /// Raw metric value for one brand.
    pub fn value(&self, record: &BrandRecord) -> f64 {
        match self {
            Self::TripVolume => record.annual_trips,
            Self::CourierWait => record.courier_wait_minutes,
            Self::DefectRate => record.defect_rate,
            Self::RevenuePerOrder => record.revenue_per_order(),
            Self::BasketSize => record.basket_size,
            Self::FranchiseShare => record.franchise_share,
            Self::FirstTimeShare => record.first_time_share,
            Self::LocationActivation => record.location_activation_rate(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Metric {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ScoreError::UnknownMetric(wanted.to_string()))
    }
}

/// Get all available metric info
pub fn available_metrics() -> Vec<MetricInfo> {
    Metric::ALL.iter().map(Metric::info).collect()
}

/// Get metric info by name
pub fn get_metric_info(name: &str) -> Option<MetricInfo> {
    name.parse::<Metric>().ok().map(|m| m.info())
}

/// Get a map of all metrics indexed by name
pub fn metric_map() -> HashMap<&'static str, MetricInfo> {
    available_metrics()
        .into_iter()
        .map(|m| (m.metric.name(), m))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_metrics_count() {
        assert_eq!(available_metrics().len(), 8);
    }

    #[test]
    fn test_default_weights_sum_to_100() {
        let total: f64 = available_metrics().iter().map(|m| m.default_weight).sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn test_directions() {
        assert_eq!(Metric::CourierWait.direction(), Direction::LowerIsBetter);
        assert_eq!(Metric::DefectRate.direction(), Direction::LowerIsBetter);
        assert_eq!(Metric::TripVolume.direction(), Direction::HigherIsBetter);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Trip_Volume".parse::<Metric>().unwrap(), Metric::TripVolume);
        assert!(matches!(
            "nps".parse::<Metric>(),
            Err(ScoreError::UnknownMetric(name)) if name == "nps"
        ));
        assert!(get_metric_info("defect_rate").is_some());
        assert!(metric_map().contains_key("location_activation"));
    }

    #[test]
    fn test_value() {
        let record = BrandRecord::named("A")
            .with(BrandField::BasketSize, 30.0)
            .with(BrandField::MarketplaceFee, 0.2);
        assert!((Metric::RevenuePerOrder.value(&record) - 6.0).abs() < 1e-12);
        assert_eq!(Metric::LocationActivation.value(&record), 0.0);
    }
}
