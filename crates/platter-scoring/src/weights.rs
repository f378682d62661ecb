//! Scoring weights.

use crate::error::{Result, ScoreError};
use crate::registry::Metric;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weight per metric. Metrics not listed carry no weight.
///
/// Weights are relative: only their ratios matter, the composite is always
/// rescaled to 0–100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weights(BTreeMap<Metric, f64>);

impl Default for Weights {
    fn default() -> Self {
        Metric::ALL
            .into_iter()
            .map(|m| (m, m.default_weight()))
            .filter(|(_, w)| *w > 0.0)
            .collect()
    }
}

impl FromIterator<(Metric, f64)> for Weights {
    fn from_iter<T: IntoIterator<Item = (Metric, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Weights {
    /// No weights at all.
    pub const fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Weight of a metric (0 when unset).
    pub fn get(&self, metric: Metric) -> f64 {
        self.0.get(&metric).copied().unwrap_or(0.0)
    }

    /// Set the weight of a metric.
    pub fn set(&mut self, metric: Metric, weight: f64) {
        self.0.insert(metric, weight);
    }

    /// Builder-style [`Weights::set`].
    pub fn with(mut self, metric: Metric, weight: f64) -> Self {
        self.set(metric, weight);
        self
    }

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Metrics with a positive weight, in registry order.
    pub fn active(&self) -> Vec<(Metric, f64)> {
        self.0
            .iter()
            .filter(|(_, w)| **w > 0.0)
            .map(|(m, w)| (*m, *w))
            .collect()
    }

    /// Weights renormalized to sum to 100.
    pub fn as_percentages(&self) -> BTreeMap<Metric, f64> {
        let total = self.total();
        self.active()
            .into_iter()
            .map(|(m, w)| (m, if total > 0.0 { w / total * 100.0 } else { 0.0 }))
            .collect()
    }

    /// Keep only the listed metrics.
    pub fn restricted_to(&self, metrics: &[Metric]) -> Self {
        self.0
            .iter()
            .filter(|(m, _)| metrics.contains(m))
            .map(|(m, w)| (*m, *w))
            .collect()
    }

    /// Check every weight is finite and non-negative and the sum is positive.
    ///
    /// # Errors
    ///
    /// [`ScoreError::InvalidWeight`] for a bad entry,
    /// [`ScoreError::DegenerateWeights`] when the sum is zero.
    pub fn validate(&self) -> Result<()> {
        if let Some((metric, value)) = self.0.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
            return Err(ScoreError::InvalidWeight {
                metric: *metric,
                value: *value,
            });
        }
        if self.total() <= 0.0 {
            return Err(ScoreError::DegenerateWeights);
        }
        Ok(())
    }

    /// Parse a `metric=weight` pair, as given on the command line.
    ///
    /// # Errors
    ///
    /// Fails on an unknown metric or an unparseable weight.
    pub fn parse_pair(pair: &str) -> Result<(Metric, f64)> {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| ScoreError::UnknownMetric(pair.to_string()))?;
        let metric = name.parse::<Metric>()?;
        let weight = value
            .trim()
            .parse::<f64>()
            .map_err(|_| ScoreError::InvalidWeight {
                metric,
                value: f64::NAN,
            })?;
        Ok((metric, weight))
    }
}
