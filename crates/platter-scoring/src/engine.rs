//! Composite scoring.
//!
//! The engine turns the brand table into a polars frame, normalizes each
//! weighted metric across all brands, takes the weighted mean on a 0–100
//! scale, ranks descending and assigns tiers. Scores are never cached: a
//! weight change means a fresh [`ScoringEngine::score`] call.

use crate::error::{Result, ScoreError};
use crate::normalize::{Normalization, normalized, range_columns};
use crate::registry::Metric;
use crate::tiers::{Tier, TierCutoffs};
use crate::weights::Weights;
use platter_data::{BrandRecord, BrandTable};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight per metric (default: trips 35, wait 18, defects 12, revenue/order 35)
    pub weights: Weights,
    /// Normalization method (default: min-max)
    pub normalization: Normalization,
    /// Tier cutoffs (default: top 5% Gold, next 20% Silver)
    pub cutoffs: TierCutoffs,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            normalization: Normalization::MinMax,
            cutoffs: TierCutoffs::default(),
        }
    }
}

/// Something the engine had to work around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreWarning {
    /// A weighted metric's source column is missing; it was dropped.
    MetricUnavailable {
        /// Dropped metric
        metric: Metric,
    },
    /// No weighted metric was usable; default weights were used instead.
    DefaultWeightsUsed,
}

impl fmt::Display for ScoreWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MetricUnavailable { metric } => write!(
                f,
                "metric '{metric}' is unavailable (missing column); excluded from scoring"
            ),
            Self::DefaultWeightsUsed => {
                f.write_str("no weighted metric is available; using default weights")
            }
        }
    }
}

/// Coarse label for a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    /// 80 and above
    Strong,
    /// 60 to 80
    Solid,
    /// 40 to 60
    Fair,
    /// Below 40
    Weak,
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Strong => "strong",
            Self::Solid => "solid",
            Self::Fair => "fair",
            Self::Weak => "weak",
        })
    }
}

/// Band for a 0–100 composite score.
pub fn score_band(score: f64) -> ScoreBand {
    if score >= 80.0 {
        ScoreBand::Strong
    } else if score >= 60.0 {
        ScoreBand::Solid
    } else if score >= 40.0 {
        ScoreBand::Fair
    } else {
        ScoreBand::Weak
    }
}

/// Score of one brand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    /// The scored brand
    pub brand: BrandRecord,
    /// Normalized metric values, 0–1, higher is better
    pub normalized: BTreeMap<Metric, f64>,
    /// Points each metric contributes to the composite
    pub components: BTreeMap<Metric, f64>,
    /// Composite score, 0–100
    pub composite: f64,
    /// 1 is best; ties share the lowest rank
    pub rank: usize,
    /// Tier from the rank
    pub tier: Tier,
}

impl ScoreResult {
    /// Brand name.
    pub fn name(&self) -> &str {
        &self.brand.name
    }

    /// Band of the composite score.
    pub fn band(&self) -> ScoreBand {
        score_band(self.composite)
    }
}

/// Scores for every brand, best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scoreboard {
    /// Results ordered by rank, then name
    pub results: Vec<ScoreResult>,
    /// Weights actually applied
    pub weights: Weights,
    /// Normalization applied
    pub normalization: Normalization,
    /// Cutoffs applied
    pub cutoffs: TierCutoffs,
    /// Workarounds applied
    pub warnings: Vec<ScoreWarning>,
}

impl Scoreboard {
    /// Number of scored brands.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True when nothing was scored.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The best `n` brands.
    pub fn top_n(&self, n: usize) -> &[ScoreResult] {
        &self.results[..n.min(self.results.len())]
    }

    /// Brands per tier; every tier is present.
    pub fn tier_counts(&self) -> BTreeMap<Tier, usize> {
        let mut counts: BTreeMap<Tier, usize> = Tier::ALL.iter().map(|t| (*t, 0)).collect();
        for result in &self.results {
            *counts.entry(result.tier).or_default() += 1;
        }
        counts
    }

    /// Results in one tier, best first.
    pub fn in_tier(&self, tier: Tier) -> impl Iterator<Item = &ScoreResult> {
        self.results.iter().filter(move |r| r.tier == tier)
    }

    /// Look up a brand by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&ScoreResult> {
        self.results
            .iter()
            .find(|r| r.brand.name.eq_ignore_ascii_case(name.trim()))
    }
}

/// Scores brands according to a [`ScoringConfig`].
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    /// Create an engine.
    pub const fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score every brand in the table.
    ///
    /// # Errors
    ///
    /// Invalid weights or cutoffs, a zero weight sum, or no usable metric.
    pub fn score(&self, table: &BrandTable) -> Result<Scoreboard> {
        self.config.cutoffs.validate()?;
        self.config.weights.validate()?;

        let (weights, warnings) = self.effective_weights(table)?;
        let metrics = weights.active();
        let total = weights.total();

        let mut results = if table.is_empty() {
            Vec::new()
        } else {
            self.compute(table, &metrics, total)?
        };

        results.sort_by(|a, b| {
            a.rank
                .cmp(&b.rank)
                .then_with(|| a.brand.name.cmp(&b.brand.name))
        });

        tracing::debug!(
            brands = results.len(),
            metrics = metrics.len(),
            normalization = %self.config.normalization,
            warnings = warnings.len(),
            "scored brands"
        );

        Ok(Scoreboard {
            results,
            weights,
            normalization: self.config.normalization,
            cutoffs: self.config.cutoffs,
            warnings,
        })
    }

    /// Drop weighted metrics whose columns are missing, falling back to the
    /// default profile when nothing weighted survives.
    fn effective_weights(&self, table: &BrandTable) -> Result<(Weights, Vec<ScoreWarning>)> {
        let available: Vec<Metric> = Metric::ALL
            .into_iter()
            .filter(|m| m.required_fields().iter().all(|f| table.is_available(*f)))
            .collect();

        let mut warnings = Vec::new();
        for (metric, _) in self.config.weights.active() {
            if !available.contains(&metric) {
                tracing::warn!(%metric, "weighted metric unavailable; dropped");
                warnings.push(ScoreWarning::MetricUnavailable { metric });
            }
        }

        let weights = self.config.weights.restricted_to(&available);
        if weights.total() > 0.0 {
            return Ok((weights, warnings));
        }

        let fallback = Weights::default().restricted_to(&available);
        if fallback.total() <= 0.0 {
            return Err(ScoreError::NoScorableMetrics);
        }
        tracing::warn!("no weighted metric available; using default weights");
        warnings.push(ScoreWarning::DefaultWeightsUsed);
        Ok((fallback, warnings))
    }

    fn compute(
        &self,
        table: &BrandTable,
        metrics: &[(Metric, f64)],
        total: f64,
    ) -> Result<Vec<ScoreResult>> {
        let method = self.config.normalization;

        let mut frame = table.to_frame()?.lazy().with_columns([
            (col("basket_size") * col("marketplace_fee")).alias(Metric::RevenuePerOrder.column()),
            when(col("total_locations").gt(lit(0.0)))
                .then(col("active_locations") / col("total_locations"))
                .otherwise(lit(0.0))
                .alias(Metric::LocationActivation.column()),
        ]);

        for (metric, _) in metrics {
            frame = frame.with_columns(range_columns(*metric));
        }

        let norm: Vec<Expr> = metrics.iter().map(|(m, _)| normalized(*m, method)).collect();
        let weighted = metrics
            .iter()
            .fold(lit(0.0), |acc, (m, w)| acc + col(m.norm_column()) * lit(*w))
            * lit(100.0)
            / lit(total);
        // Rounding can push a weighted mean of ones just past 100.
        let composite = when(weighted.clone().gt(lit(100.0)))
            .then(lit(100.0))
            .when(weighted.clone().lt(lit(0.0)))
            .then(lit(0.0))
            .otherwise(weighted);

        let df = frame
            .with_columns(norm)
            .with_columns([composite.alias("composite")])
            .with_columns([col("composite")
                .rank(
                    RankOptions {
                        method: RankMethod::Min,
                        descending: true,
                    },
                    None,
                )
                .cast(DataType::Int64)
                .alias("rank")])
            .collect()?;

        let composites = df.column("composite")?.f64()?;
        let ranks = df.column("rank")?.i64()?;
        let norm_columns = metrics
            .iter()
            .map(|(m, _)| Ok((*m, df.column(&m.norm_column())?.f64()?.clone())))
            .collect::<PolarsResult<Vec<_>>>()?;

        let n = table.len();
        let results = table
            .records()
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let composite = composites.get(i).unwrap_or(0.0);
                let rank = ranks.get(i).map_or(n, |r| r as usize);

                let normalized: BTreeMap<Metric, f64> = norm_columns
                    .iter()
                    .map(|(m, values)| (*m, values.get(i).unwrap_or(0.0)))
                    .collect();
                let components = metrics
                    .iter()
                    .map(|(m, w)| (*m, w * normalized[m] / total * 100.0))
                    .collect();

                ScoreResult {
                    brand: record.clone(),
                    normalized,
                    components,
                    composite,
                    rank,
                    tier: self.config.cutoffs.assign(rank, n),
                }
            })
            .collect();

        Ok(results)
    }
}
