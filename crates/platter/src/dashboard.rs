//! Dashboard pages.
//!
//! Each page is recomputed from the dataset and the session on every call.

use crate::error::Result;
use crate::session::Session;
use platter_data::{Dataset, DataSummary, DemographicValue, LoadReport};
use platter_economics::{
    BrandRevenue, CohortRetention, CustomerLtv, DensityAnalysis, FeeRecommendation,
    GrowthProjection, PlatformPnl, RestaurantProfitability, Scenario, Simulation,
    SimulationConfig, TargetFeeImpact, UnitEconomics, analyze_density, apply_target_fees,
    cohort_retention, customer_ltv, project_growth, restaurant_profitability, revenue_table,
    total_revenue, unit_economics,
};
use platter_output::{TierSummary, methodology};
use platter_scoring::{ScoreError, Scoreboard, ScoringConfig, ScoringEngine, Weights};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Shape of the loaded data and everything noticed while loading it.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    /// Rows, columns and missing values
    pub summary: DataSummary,
    /// Load issues
    pub report: LoadReport,
    /// Brands joined to the demographic sheet, when a key column was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join: Option<DemographicJoin>,
}

/// Brands matched to demographic rows on a key column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemographicJoin {
    /// Demographic column compared against brand names
    pub key: String,
    /// Matched brands with their demographic row
    pub matched: Vec<JoinedBrand>,
    /// Brands with no demographic row
    pub unmatched: Vec<String>,
}

/// One brand and its demographic values by column header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedBrand {
    /// Brand name
    pub brand: String,
    /// Demographic values
    pub values: BTreeMap<String, DemographicValue>,
}

/// Scores, tiers and the adjustments the engine made.
#[derive(Debug, Clone, Serialize)]
pub struct MerchantScoring {
    /// Ranked brands
    pub board: Scoreboard,
    /// Per-tier statistics
    pub summary: TierSummary,
    /// Human-readable warnings
    pub warnings: Vec<String>,
}

/// Tier fee simulation plus the target-fee and optimizer views.
#[derive(Debug, Clone, Serialize)]
pub struct FeeSimulator {
    /// Adjustments applied
    pub config: SimulationConfig,
    /// Per-brand rows and totals
    pub simulation: Simulation,
    /// Every brand moved to its tier's target fee
    pub target_fees: Vec<TargetFeeImpact>,
    /// Revenue-maximizing fee change per brand
    pub recommendations: Vec<FeeRecommendation>,
    /// Warnings carried over from scoring
    pub warnings: Vec<String>,
}

/// Revenue bridge by tier.
#[derive(Debug, Clone, Serialize)]
pub struct RevenueImpact {
    /// Tier summary with the simulated revenue attached
    pub summary: TierSummary,
    /// Current take-rate revenue per brand
    pub revenue: Vec<BrandRevenue>,
    /// Sum of current revenue
    pub total_revenue: f64,
    /// Location density against quality, when any brand has active locations
    pub density: Option<DensityAnalysis>,
}

/// Per-trip and platform-level economics.
#[derive(Debug, Clone, Serialize)]
pub struct UnitEconomicsPage {
    /// Contribution margin per brand
    pub units: Vec<UnitEconomics>,
    /// Platform P&L today
    pub pnl: PlatformPnl,
    /// What-if scenarios against the baseline
    pub scenarios: Vec<Scenario>,
    /// Customer lifetime value per brand
    pub ltv: Vec<CustomerLtv>,
    /// Cohort retention per brand
    pub retention: Vec<CohortRetention>,
    /// Restaurant-side margin per brand
    pub restaurants: Vec<RestaurantProfitability>,
    /// Compounded growth per brand
    pub growth: Vec<GrowthProjection>,
}

/// A loaded dataset viewed through a session.
#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Dataset,
    session: Session,
}

impl Dashboard {
    /// Create a dashboard.
    pub const fn new(dataset: Dataset, session: Session) -> Self {
        Self { dataset, session }
    }

    /// The loaded data.
    pub const fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The current assumptions.
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable access to the assumptions; the next page call picks up changes.
    pub const fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Data shape and load issues.
    pub fn overview(&self) -> Overview {
        Overview {
            summary: self.dataset.summary(),
            report: self.dataset.report.clone(),
            join: None,
        }
    }

    /// Join every brand to the demographic sheet on a key column.
    ///
    /// # Errors
    ///
    /// The key is not a demographic column.
    pub fn demographic_join(&self, key: &str) -> Result<DemographicJoin> {
        let demographics = &self.dataset.demographics;
        let brands = &self.dataset.brands;
        let matches = demographics.join_on(key, brands)?;

        let found: HashSet<&str> = matches.iter().map(|m| m.brand).collect();
        let unmatched = brands
            .records()
            .iter()
            .filter(|r| !found.contains(r.name.as_str()))
            .map(|r| r.name.clone())
            .collect();
        let matched = matches
            .into_iter()
            .map(|m| JoinedBrand {
                brand: m.brand.to_string(),
                values: demographics.headers.iter().cloned().zip(m.row.iter().cloned()).collect(),
            })
            .collect();

        Ok(DemographicJoin {
            key: key.to_string(),
            matched,
            unmatched,
        })
    }

    /// Score every brand.
    ///
    /// Weights that sum to zero are reported and replaced by the defaults.
    ///
    /// # Errors
    ///
    /// Invalid weights or cutoffs, or no scorable metric.
    pub fn merchant_scoring(&self) -> Result<MerchantScoring> {
        let (board, warnings) = self.score()?;
        let summary = TierSummary::from_board(&board, self.dataset.enterprise_threshold);
        Ok(MerchantScoring {
            board,
            summary,
            warnings,
        })
    }

    /// Run the tier fee simulation.
    ///
    /// # Errors
    ///
    /// Scoring errors or an invalid simulation configuration.
    pub fn fee_simulator(&self) -> Result<FeeSimulator> {
        let (board, warnings) = self.score()?;
        let config = self.session.simulation.clone();
        let simulation = config.simulate(&board)?;
        let target_fees = apply_target_fees(&board, &self.session.target_fees, &self.session.elasticity);
        let recommendations = self.session.optimizer.optimize_all(self.dataset.brands.records())?;
        Ok(FeeSimulator {
            config,
            simulation,
            target_fees,
            recommendations,
            warnings,
        })
    }

    /// Revenue before and after the simulation, per tier.
    ///
    /// # Errors
    ///
    /// Scoring errors or an invalid simulation configuration.
    pub fn revenue_impact(&self) -> Result<RevenueImpact> {
        let (board, _) = self.score()?;
        let simulation = self.session.simulation.simulate(&board)?;
        let summary = TierSummary::from_board(&board, self.dataset.enterprise_threshold)
            .with_simulation(&simulation, &self.session.simulation);

        let records = self.dataset.brands.records();
        let density = match analyze_density(records) {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                tracing::debug!(error = %e, "density analysis skipped");
                None
            }
        };

        Ok(RevenueImpact {
            summary,
            revenue: revenue_table(records),
            total_revenue: total_revenue(records),
            density,
        })
    }

    /// Unit economics, P&L scenarios, LTV, retention and growth.
    ///
    /// # Errors
    ///
    /// An invalid assumption block, or no orders to build a P&L from.
    pub fn unit_economics(&self) -> Result<UnitEconomicsPage> {
        let records = self.dataset.brands.records();
        let session = &self.session;

        let pnl = PlatformPnl::baseline(records, &session.pnl)?;
        let scenarios = pnl.scenarios(&session.levers)?;
        Ok(UnitEconomicsPage {
            units: unit_economics(records, &session.costs)?,
            pnl,
            scenarios,
            ltv: customer_ltv(records, &session.ltv)?,
            retention: cohort_retention(records, &session.retention)?,
            restaurants: restaurant_profitability(records, &session.restaurant)?,
            growth: project_growth(records, &session.growth)?,
        })
    }

    /// Growth projections only.
    ///
    /// # Errors
    ///
    /// Invalid growth assumptions.
    pub fn growth(&self) -> Result<Vec<GrowthProjection>> {
        Ok(project_growth(self.dataset.brands.records(), &self.session.growth)?)
    }

    /// Methodology for the current scoring settings.
    pub fn methodology(&self) -> String {
        let scoring = &self.session.scoring;
        let weights = if scoring.weights.validate().is_ok() {
            scoring.weights.clone()
        } else {
            Weights::default()
        };
        methodology(&weights, scoring.normalization, &scoring.cutoffs)
    }

    fn score(&self) -> Result<(Scoreboard, Vec<String>)> {
        let config = &self.session.scoring;
        let brands = &self.dataset.brands;

        let (board, mut warnings) = match ScoringEngine::new(config.clone()).score(brands) {
            Err(ScoreError::DegenerateWeights) => {
                tracing::warn!("weights sum to zero; scoring with the default weights");
                let fallback = ScoringConfig {
                    weights: Weights::default(),
                    ..config.clone()
                };
                let board = ScoringEngine::new(fallback).score(brands)?;
                (
                    board,
                    vec!["weights sum to zero; scored with the default weights".to_string()],
                )
            }
            result => (result?, Vec::new()),
        };
        warnings.extend(board.warnings.iter().map(ToString::to_string));
        Ok((board, warnings))
    }
}
