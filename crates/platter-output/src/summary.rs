//! Per-tier summary of a scored board.

use platter_data::Segment;
use platter_economics::{Simulation, SimulationConfig};
use platter_scoring::{ScoreResult, Scoreboard, Tier};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Revenue before and after a fee simulation for one tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierRevenue {
    /// Fee change, percentage points
    pub fee_change_pp: f64,
    /// Volume assumption, percent
    pub volume_lift_pct: f64,
    /// Current revenue
    pub current_revenue: f64,
    /// Simulated revenue
    pub new_revenue: f64,
    /// Simulated minus current
    pub revenue_delta: f64,
    /// Mean delta per brand
    pub avg_delta_per_brand: f64,
}

/// Statistics for one tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierSummaryRow {
    /// Tier
    pub tier: Tier,
    /// Brands in the tier
    pub brands: usize,
    /// Mean composite score
    pub avg_score: f64,
    /// Total annual trips
    pub total_trips: f64,
    /// Mean courier wait, minutes
    pub avg_wait: f64,
    /// Mean defect rate
    pub avg_defect_rate: f64,
    /// Mean basket
    pub avg_basket: f64,
    /// Share of brands that are Enterprise
    pub enterprise_share: f64,
    /// Share of brands that are SMB
    pub smb_share: f64,
    /// Revenue bridge, once a simulation is attached
    pub revenue: Option<TierRevenue>,
}

/// Summary of every tier, best first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierSummary {
    /// One row per tier, including empty tiers
    pub rows: Vec<TierSummaryRow>,
}

impl TierSummary {
    /// Summarize a scoreboard.
    pub fn from_board(board: &Scoreboard, enterprise_threshold: f64) -> Self {
        let rows = Tier::ALL
            .into_iter()
            .map(|tier| {
                let members: Vec<_> = board.in_tier(tier).collect();
                let n = members.len();
                let enterprise = members
                    .iter()
                    .filter(|r| r.brand.segment(enterprise_threshold) == Segment::Enterprise)
                    .count();
                let share = |k: usize| if n == 0 { 0.0 } else { k as f64 / n as f64 };

                TierSummaryRow {
                    tier,
                    brands: n,
                    avg_score: mean_of(&members, |r| r.composite),
                    total_trips: members.iter().map(|r| r.brand.annual_trips).sum(),
                    avg_wait: mean_of(&members, |r| r.brand.courier_wait_minutes),
                    avg_defect_rate: mean_of(&members, |r| r.brand.defect_rate),
                    avg_basket: mean_of(&members, |r| r.brand.basket_size),
                    enterprise_share: share(enterprise),
                    smb_share: share(n - enterprise),
                    revenue: None,
                }
            })
            .collect();
        Self { rows }
    }

    /// Attach the per-tier revenue bridge of a simulation.
    pub fn with_simulation(mut self, simulation: &Simulation, config: &SimulationConfig) -> Self {
        for row in &mut self.rows {
            if let Some(impact) = simulation.totals.by_tier.get(&row.tier) {
                let adj = config.adjustment(row.tier);
                row.revenue = Some(TierRevenue {
                    fee_change_pp: adj.fee_change_pp,
                    volume_lift_pct: adj.volume_lift_pct,
                    current_revenue: impact.current_revenue,
                    new_revenue: impact.new_revenue,
                    revenue_delta: impact.revenue_delta,
                    avg_delta_per_brand: if impact.brands > 0 {
                        impact.revenue_delta / impact.brands as f64
                    } else {
                        0.0
                    },
                });
            }
        }
        self
    }

    /// Row for a tier.
    pub fn get(&self, tier: Tier) -> Option<&TierSummaryRow> {
        self.rows.iter().find(|r| r.tier == tier)
    }

    /// Total brands across tiers.
    pub fn total_brands(&self) -> usize {
        self.rows.iter().map(|r| r.brands).sum()
    }

    fn has_revenue(&self) -> bool {
        self.rows.iter().any(|r| r.revenue.is_some())
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nTier Summary ({} brands)\n", self.total_brands()));
        output.push_str(&"=".repeat(80));
        output.push('\n');
        output.push_str(&format!(
            "{:<8} {:>7} {:>9} {:>14} {:>9} {:>9} {:>9} {:>8}\n",
            "Tier", "Brands", "Avg Score", "Trips", "Wait", "Defects", "Basket", "Ent. %"
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');
        for row in &self.rows {
            output.push_str(&format!(
                "{:<8} {:>7} {:>9.1} {:>14.0} {:>8.1}m {:>8.2}% {:>9.2} {:>7.0}%\n",
                row.tier,
                row.brands,
                row.avg_score,
                row.total_trips,
                row.avg_wait,
                row.avg_defect_rate * 100.0,
                row.avg_basket,
                row.enterprise_share * 100.0
            ));
        }

        if self.has_revenue() {
            output.push_str("\nRevenue Impact:\n");
            output.push_str(&"-".repeat(80));
            output.push('\n');
            output.push_str(&format!(
                "{:<8} {:>9} {:>9} {:>13} {:>13} {:>13} {:>10}\n",
                "Tier", "Fee", "Volume", "Current", "New", "Delta", "Per Brand"
            ));
            for row in &self.rows {
                if let Some(rev) = &row.revenue {
                    output.push_str(&format!(
                        "{:<8} {:>+7.1}pp {:>+8.1}% {:>12.2}M {:>12.2}M {:>+12.2}M {:>+9.0}K\n",
                        row.tier,
                        rev.fee_change_pp,
                        rev.volume_lift_pct,
                        rev.current_revenue / 1e6,
                        rev.new_revenue / 1e6,
                        rev.revenue_delta / 1e6,
                        rev.avg_delta_per_brand / 1e3
                    ));
                }
            }
        }

        output.push_str(&"=".repeat(80));
        output.push('\n');
        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("## Tier Summary\n\n");
        output.push_str("| Tier | Brands | Avg Score | Trips | Avg Wait | Avg Defects | Avg Basket | Enterprise |\n");
        output.push_str("|------|--------|-----------|-------|----------|-------------|------------|------------|\n");
        for row in &self.rows {
            output.push_str(&format!(
                "| {} | {} | {:.1} | {:.0} | {:.1} | {:.2}% | {:.2} | {:.0}% |\n",
                row.tier,
                row.brands,
                row.avg_score,
                row.total_trips,
                row.avg_wait,
                row.avg_defect_rate * 100.0,
                row.avg_basket,
                row.enterprise_share * 100.0
            ));
        }

        if self.has_revenue() {
            output.push_str("\n## Revenue Impact\n\n");
            output.push_str("| Tier | Fee Change | Volume | Current | New | Delta |\n");
            output.push_str("|------|------------|--------|---------|-----|-------|\n");
            for row in &self.rows {
                if let Some(rev) = &row.revenue {
                    output.push_str(&format!(
                        "| {} | {:+.1}pp | {:+.1}% | ${:.2}M | ${:.2}M | ${:+.2}M |\n",
                        row.tier,
                        rev.fee_change_pp,
                        rev.volume_lift_pct,
                        rev.current_revenue / 1e6,
                        rev.new_revenue / 1e6,
                        rev.revenue_delta / 1e6
                    ));
                }
            }
        }

        output
    }
}

fn mean_of(members: &[&ScoreResult], f: impl Fn(&ScoreResult) -> f64) -> f64 {
    if members.is_empty() {
        0.0
    } else {
        members.iter().map(|r| f(r)).sum::<f64>() / members.len() as f64
    }
}

impl fmt::Display for TierSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(
                f,
                "{}: {} brands, avg score {:.1}",
                row.tier, row.brands, row.avg_score
            )?;
        }
        Ok(())
    }
}
