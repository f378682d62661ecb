//! Cohort retention by merchant quality.
//!
//! Monthly retention starts from a base rate and earns a bonus for low
//! defect rates, up to a ceiling. Retention after `m` months is the monthly
//! rate to the power `m`; expected lifetime is the geometric mean lifetime
//! `1 / (1 − rate)`.

use crate::error::{EconomicsError, Result};
use platter_data::BrandRecord;
use serde::{Deserialize, Serialize};

/// Retention model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionModel {
    /// Monthly retention before the quality bonus (default: 0.80)
    pub base_rate: f64,
    /// Bonus at a zero defect rate (default: 0.10)
    pub quality_bonus: f64,
    /// Ceiling on the monthly rate (default: 0.95)
    pub max_rate: f64,
    /// Months in the retention curve (default: 12)
    pub cohort_months: u32,
}

impl Default for RetentionModel {
    fn default() -> Self {
        Self {
            base_rate: 0.80,
            quality_bonus: 0.10,
            max_rate: 0.95,
            cohort_months: 12,
        }
    }
}

/// Longest retention curve, in months, that [`RetentionModel::validate`] accepts.
pub const MAX_COHORT_MONTHS: u32 = 1_200;

impl RetentionModel {
    /// Check the rates are usable.
    ///
    /// # Errors
    ///
    /// The ceiling must be below 1 so lifetimes stay finite, and the curve
    /// at most [`MAX_COHORT_MONTHS`] long.
    pub fn validate(&self) -> Result<()> {
        if self.cohort_months > MAX_COHORT_MONTHS {
            return Err(EconomicsError::invalid(format!(
                "{} cohort months exceeds the maximum of {MAX_COHORT_MONTHS}",
                self.cohort_months
            )));
        }
        if !(0.0..1.0).contains(&self.max_rate) {
            return Err(EconomicsError::invalid(format!(
                "retention ceiling {} must be within 0..1",
                self.max_rate
            )));
        }
        if !(self.base_rate >= 0.0) || !(self.quality_bonus >= 0.0) {
            return Err(EconomicsError::invalid("retention rates must be non-negative"));
        }
        Ok(())
    }

    /// Monthly retention for a defect rate.
    pub fn monthly_rate(&self, defect_rate: f64) -> f64 {
        (self.base_rate + (1.0 - defect_rate) * self.quality_bonus).min(self.max_rate)
    }

    /// Retention curve for one brand.
    pub fn evaluate(&self, record: &BrandRecord) -> CohortRetention {
        let rate = self.monthly_rate(record.defect_rate);
        let after = |months: u32| rate.powf(f64::from(months));
        CohortRetention {
            name: record.name.clone(),
            monthly_rate: rate,
            month_3: after(3),
            month_6: after(6),
            month_12: after(12),
            expected_lifetime_months: 1.0 / (1.0 - rate),
            curve: (1..=self.cohort_months).map(after).collect(),
        }
    }
}

/// Retention figures for one brand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortRetention {
    /// Brand name
    pub name: String,
    /// Monthly retention
    pub monthly_rate: f64,
    /// Share retained after 3 months
    pub month_3: f64,
    /// Share retained after 6 months
    pub month_6: f64,
    /// Share retained after 12 months
    pub month_12: f64,
    /// Expected customer lifetime in months
    pub expected_lifetime_months: f64,
    /// Share retained after each month, from month 1
    pub curve: Vec<f64>,
}

/// Retention for every brand.
///
/// # Errors
///
/// See [`RetentionModel::validate`].
pub fn cohort_retention(records: &[BrandRecord], model: &RetentionModel) -> Result<Vec<CohortRetention>> {
    model.validate()?;
    Ok(records.iter().map(|r| model.evaluate(r)).collect())
}
