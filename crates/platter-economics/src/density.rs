//! Location density against operating metrics.
//!
//! A brand's density score is its active location count over the mean
//! across brands. Brands are split into quartile buckets of that score and
//! the score is correlated with basket, defects, courier wait and
//! first-time share.

use crate::error::{EconomicsError, Result};
use ndarray::{Array1, ArrayView1};
use platter_data::BrandRecord;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Density quartile, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DensityBucket {
    /// Bottom quartile
    Low,
    /// Second quartile
    MediumLow,
    /// Third quartile
    MediumHigh,
    /// Top quartile
    High,
}

impl DensityBucket {
    /// All buckets, lowest first.
    pub const ALL: [Self; 4] = [Self::Low, Self::MediumLow, Self::MediumHigh, Self::High];

    /// Display label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Density",
            Self::MediumLow => "Medium-Low",
            Self::MediumHigh => "Medium-High",
            Self::High => "High Density",
        }
    }
}

impl fmt::Display for DensityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Pearson correlation of the density score with each metric.
///
/// `None` where the correlation is undefined (constant series).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensityCorrelations {
    /// vs average basket
    pub basket_size: Option<f64>,
    /// vs defect rate
    pub defect_rate: Option<f64>,
    /// vs courier wait
    pub courier_wait: Option<f64>,
    /// vs first-time share
    pub first_time_share: Option<f64>,
}

/// Aggregates for one density bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityBucketSummary {
    /// Bucket
    pub bucket: DensityBucket,
    /// Brands in the bucket
    pub brands: usize,
    /// Mean basket; `None` for an empty bucket
    pub avg_basket: Option<f64>,
    /// Mean defect rate
    pub avg_defect_rate: Option<f64>,
    /// Mean courier wait
    pub avg_courier_wait: Option<f64>,
    /// Mean first-time share
    pub avg_first_time_share: Option<f64>,
    /// Total trips
    pub total_trips: f64,
}

/// Density analysis output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityAnalysis {
    /// Density score per brand, input order
    pub scores: Vec<(String, f64)>,
    /// Bucket per brand, input order
    pub buckets: Vec<DensityBucket>,
    /// Correlations
    pub correlations: DensityCorrelations,
    /// One entry per bucket, lowest first
    pub summary: Vec<DensityBucketSummary>,
}

/// Pearson correlation; `None` with fewer than two points or zero variance.
pub fn pearson(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let dx = &x - x.mean()?;
    let dy = &y - y.mean()?;
    let sxx = dx.dot(&dx);
    let syy = dy.dot(&dy);
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some(dx.dot(&dy) / (sxx * syy).sqrt())
}

/// Quantile by linear interpolation over sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Quartile bucket of every value.
///
/// Bucket upper edges are the 25th, 50th and 75th percentiles; a value goes
/// to the first bucket whose edge it does not exceed.
pub fn quartile_buckets(values: ArrayView1<'_, f64>) -> Vec<DensityBucket> {
    if values.is_empty() {
        return Vec::new();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let edges = [0.25, 0.50, 0.75].map(|q| quantile(&sorted, q));

    values
        .iter()
        .map(|v| {
            let index = edges.iter().position(|edge| v <= edge).unwrap_or(3);
            DensityBucket::ALL[index]
        })
        .collect()
}

/// Run the density analysis.
///
/// # Errors
///
/// Returns `InsufficientData` when there are no brands or no brand has an
/// active location.
pub fn analyze_density(records: &[BrandRecord]) -> Result<DensityAnalysis> {
    let column = |f: fn(&BrandRecord) -> f64| records.iter().map(f).collect::<Array1<f64>>();

    let active = column(|r| r.active_locations);
    let mean_active = active
        .mean()
        .filter(|m| *m > 0.0)
        .ok_or_else(|| EconomicsError::InsufficientData("no active locations to compare".to_string()))?;
    let scores = &active / mean_active;

    let basket = column(|r| r.basket_size);
    let defect = column(|r| r.defect_rate);
    let wait = column(|r| r.courier_wait_minutes);
    let first_time = column(|r| r.first_time_share);
    let trips = column(|r| r.annual_trips);

    let correlations = DensityCorrelations {
        basket_size: pearson(scores.view(), basket.view()),
        defect_rate: pearson(scores.view(), defect.view()),
        courier_wait: pearson(scores.view(), wait.view()),
        first_time_share: pearson(scores.view(), first_time.view()),
    };

    let buckets = quartile_buckets(scores.view());
    let summary = DensityBucket::ALL
        .into_iter()
        .map(|bucket| {
            let members: Vec<usize> = buckets
                .iter()
                .enumerate()
                .filter(|(_, b)| **b == bucket)
                .map(|(i, _)| i)
                .collect();
            let mean = |values: &Array1<f64>| values.select(ndarray::Axis(0), &members).mean();
            DensityBucketSummary {
                bucket,
                brands: members.len(),
                avg_basket: mean(&basket),
                avg_defect_rate: mean(&defect),
                avg_courier_wait: mean(&wait),
                avg_first_time_share: mean(&first_time),
                total_trips: members.iter().map(|&i| trips[i]).sum(),
            }
        })
        .collect();

    debug!(brands = records.len(), mean_active, "Density analysis complete");

    Ok(DensityAnalysis {
        scores: records
            .iter()
            .zip(scores.iter())
            .map(|(r, s)| (r.name.clone(), *s))
            .collect(),
        buckets,
        correlations,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use platter_data::BrandField;

    #[test]
    fn test_pearson() {
        let x = array![1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(pearson(x.view(), (&x * 2.0).view()).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(pearson(x.view(), (&x * -1.0).view()).unwrap(), -1.0, epsilon = 1e-12);
        assert_eq!(pearson(x.view(), array![5.0, 5.0, 5.0, 5.0].view()), None);
        assert_eq!(pearson(array![1.0].view(), array![2.0].view()), None);
    }

    #[test]
    fn test_quartile_buckets() {
        let values = Array1::from_iter((1..=8).map(f64::from));
        let buckets = quartile_buckets(values.view());
        let counts: Vec<usize> = DensityBucket::ALL
            .iter()
            .map(|b| buckets.iter().filter(|x| *x == b).count())
            .collect();
        assert_eq!(counts, vec![2, 2, 2, 2]);
        assert_eq!(buckets[0], DensityBucket::Low);
        assert_eq!(buckets[7], DensityBucket::High);
    }

    #[test]
    fn test_analysis() {
        let records: Vec<BrandRecord> = (1..=8)
            .map(|i| {
                let x = f64::from(i);
                BrandRecord::named(format!("B{i}"))
                    .with(BrandField::ActiveLocations, x * 10.0)
                    .with(BrandField::BasketSize, 10.0 + x)
                    .with(BrandField::DefectRate, 0.10 - x * 0.01)
                    .with(BrandField::AnnualTrips, 1_000.0)
            })
            .collect();
        let analysis = analyze_density(&records).unwrap();

        assert_relative_eq!(analysis.scores[0].1, 10.0 / 45.0, epsilon = 1e-12);
        assert_relative_eq!(analysis.correlations.basket_size.unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(analysis.correlations.defect_rate.unwrap(), -1.0, epsilon = 1e-12);
        assert_eq!(analysis.correlations.courier_wait, None);

        assert_eq!(analysis.summary.len(), 4);
        let low = &analysis.summary[0];
        assert_eq!(low.brands, 2);
        assert_relative_eq!(low.avg_basket.unwrap(), 11.5, epsilon = 1e-12);
        assert_relative_eq!(low.total_trips, 2_000.0);
    }

    #[test]
    fn test_no_active_locations() {
        assert!(analyze_density(&[BrandRecord::named("A")]).is_err());
        assert!(analyze_density(&[]).is_err());
    }
}
