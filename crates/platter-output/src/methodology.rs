//! Methodology page.

use platter_scoring::{Direction, Normalization, TierCutoffs, Weights, available_metrics};

/// Fixed part of the methodology.
pub const METHODOLOGY: &str = "\
## Fee Simulator Assumptions

Each tier gets a fee change in percentage points and a volume assumption in
percent. The two are independent levers: volume shifts reflect placement in
the marketplace feed rather than fee elasticity, since diners never see the
merchant fee. The proposed fee is held between 10% and 30%; brands whose
unclamped fee falls strictly outside that band are flagged as capped or
floored.

Revenue is take-rate revenue: annual trips × average basket × marketplace
fee. It is not the restaurant's gross sales. Market share after the change is
18% × (1 + trip change %).

## Unit Economics

Contribution margin per trip = revenue per trip − courier − processing −
defect handling − acquisition. Defect handling is the defect rate times the
support cost of one defect; acquisition is the first-time order share times
the customer acquisition cost.
";

/// Full methodology for the current scoring settings.
pub fn methodology(weights: &Weights, normalization: Normalization, cutoffs: &TierCutoffs) -> String {
    let mut output = String::new();

    output.push_str("# Methodology\n\n## Scoring Model\n\n");
    output.push_str("| Metric | Weight | Share | Direction |\n");
    output.push_str("|---|---|---|---|\n");
    let shares = weights.as_percentages();
    for info in available_metrics() {
        let weight = weights.get(info.metric);
        if weight <= 0.0 {
            continue;
        }
        let direction = match info.direction {
            Direction::HigherIsBetter => "higher is better",
            Direction::LowerIsBetter => "lower is better",
        };
        output.push_str(&format!(
            "| {} | {} | {:.1}% | {} |\n",
            info.label,
            weight,
            shares.get(&info.metric).copied().unwrap_or(0.0),
            direction
        ));
    }
    output.push('\n');

    output.push_str(match normalization {
        Normalization::MinMax => {
            "Each metric is min-max normalized across all brands to 0–1, flipped where \
             lower is better. A metric with no spread scores 0.5 for every brand.\n\n"
        }
        Normalization::PercentRank => {
            "Each metric is converted to its percentile rank across all brands, flipped \
             where lower is better. Ties share the average rank.\n\n"
        }
    });
    output.push_str(
        "The composite is the weighted mean of the normalized metrics on a 0–100 scale. \
         Brands are ranked by composite; ties share the best rank.\n\n",
    );

    output.push_str(&match *cutoffs {
        TierCutoffs::Percentile {
            gold_pct,
            silver_pct,
        } => format!(
            "Tiers: the top {gold_pct}% of ranks are Gold, the next {silver_pct}% Silver, \
             the rest Bronze. Cutoff ranks round up.\n\n"
        ),
        TierCutoffs::Rank { gold, silver } => format!(
            "Tiers: ranks 1–{gold} are Gold, {}–{silver} Silver, the rest Bronze.\n\n",
            gold + 1
        ),
    });

    output.push_str(METHODOLOGY);
    output
}
