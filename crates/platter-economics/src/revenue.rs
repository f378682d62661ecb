//! Marketplace revenue per brand.
//!
//! Marketplace (take-rate) revenue = trips × basket × fee. This is the
//! platform's commission, not the restaurant's gross sales.

use platter_data::BrandRecord;
use serde::Serialize;

/// Revenue figures for one brand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandRevenue {
    /// Brand name
    pub name: String,
    /// Annual marketplace revenue
    pub annual_revenue: f64,
    /// Revenue per trip (basket × fee)
    pub revenue_per_trip: f64,
    /// Annual revenue per active location; `None` without active locations
    pub revenue_per_active_location: Option<f64>,
}

/// Annual marketplace revenue of a brand.
pub fn annual_revenue(record: &BrandRecord) -> f64 {
    record.annual_trips * record.basket_size * record.marketplace_fee
}

/// Revenue figures for one brand.
pub fn brand_revenue(record: &BrandRecord) -> BrandRevenue {
    let annual = annual_revenue(record);
    BrandRevenue {
        name: record.name.clone(),
        annual_revenue: annual,
        revenue_per_trip: record.revenue_per_order(),
        revenue_per_active_location: (record.active_locations > 0.0)
            .then(|| annual / record.active_locations),
    }
}

/// Revenue figures for every brand.
pub fn revenue_table(records: &[BrandRecord]) -> Vec<BrandRevenue> {
    records.iter().map(brand_revenue).collect()
}

/// Total annual marketplace revenue.
pub fn total_revenue(records: &[BrandRecord]) -> f64 {
    records.iter().map(annual_revenue).sum()
}
