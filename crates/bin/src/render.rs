//! Terminal rendering of dashboard pages.

use platter::economics::{GrowthProjection, HEALTHY_LTV_CAC};
use platter::{FeeSimulator, MerchantScoring, Overview, RevenueImpact, UnitEconomicsPage};
use serde::Serialize;
use std::error::Error;
use std::path::Path;

fn banner(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", title);
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}

fn rule() {
    println!("{}", "─".repeat(80));
}

fn millions(x: f64) -> String {
    format!("${:.2}M", x / 1e6)
}

fn optional(x: Option<f64>, precision: usize) -> String {
    x.map_or_else(|| "n/a".to_string(), |v| format!("{v:.precision$}"))
}

pub(crate) fn json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn overview(overview: &Overview, source: &Path) {
    banner("DATA OVERVIEW");
    let summary = &overview.summary;
    println!("Source:            {}", source.display());
    println!("Brands:            {}", summary.rows);
    println!("Demographic rows:  {}", summary.demographic_rows);
    println!("Columns:           {}", summary.columns.join(", "));

    let filled: Vec<_> = summary.missing_values.iter().filter(|(_, n)| **n > 0).collect();
    if !filled.is_empty() {
        println!("\nFilled with the column median:");
        for (column, n) in filled {
            println!("  {column:<32} {n:>6}");
        }
    }

    let issues = &overview.report.issues;
    if issues.is_empty() {
        println!("\nNo load issues.");
    } else {
        println!("\nLoad issues ({}):", issues.len());
        for issue in issues {
            println!("  - {issue}");
        }
    }

    if let Some(join) = &overview.join {
        println!(
            "\nDemographics joined on '{}': {} matched, {} unmatched",
            join.key,
            join.matched.len(),
            join.unmatched.len()
        );
        for brand in &join.matched {
            let values: Vec<_> = brand.values.iter().map(|(k, v)| format!("{k}={v}")).collect();
            println!("  {:<32} {}", truncate(&brand.brand, 32), values.join(", "));
        }
    }
}

pub(crate) fn scoring(page: &MerchantScoring, top: usize) {
    banner("MERCHANT SCORING");
    for warning in &page.warnings {
        println!("! {warning}");
    }

    let board = &page.board;
    println!(
        "Brands: {}   Normalization: {}   Metrics: {}\n",
        board.len(),
        board.normalization,
        board
            .weights
            .active()
            .iter()
            .map(|(m, w)| format!("{m} {w}"))
            .collect::<Vec<_>>()
            .join(", ")
    );

    println!(
        "{:>5}  {:<32} {:<7} {:>7}  {:<7} {:>12} {:>8} {:>6}",
        "Rank", "Brand", "Tier", "Score", "Band", "Trips", "Basket", "Fee"
    );
    rule();
    for result in board.top_n(top) {
        let brand = &result.brand;
        println!(
            "{:>5}  {:<32} {:<7} {:>7.2}  {:<7} {:>12.0} {:>8.2} {:>5.1}%",
            result.rank,
            truncate(&brand.name, 32),
            result.tier,
            result.composite,
            result.band(),
            brand.annual_trips,
            brand.basket_size,
            brand.marketplace_fee * 100.0
        );
    }
    if board.len() > top {
        println!("  … {} more", board.len() - top);
    }

    print!("{}", page.summary.to_ascii_table());
}

pub(crate) fn simulation(page: &FeeSimulator, top: usize) {
    banner("FEE SIMULATOR");
    for warning in &page.warnings {
        println!("! {warning}");
    }

    let config = &page.config;
    println!("Adjustments:");
    for (tier, adj) in [
        ("Gold", config.gold),
        ("Silver", config.silver),
        ("Bronze", config.bronze),
    ] {
        println!(
            "  {tier:<7} fee {:>+5.1}pp   volume {:>+6.1}%",
            adj.fee_change_pp, adj.volume_lift_pct
        );
    }
    println!(
        "  Fee band {:.0}%–{:.0}%\n",
        config.fee_floor * 100.0,
        config.fee_cap * 100.0
    );

    println!(
        "{:<32} {:<7} {:>7} {:>7} {:>2} {:>12} {:>12} {:>8}",
        "Brand", "Tier", "Fee", "New", "", "Revenue", "New Rev.", "Delta %"
    );
    rule();
    for row in page.simulation.rows.iter().take(top) {
        let flag = if row.capped {
            " cap"
        } else if row.floored {
            " floor"
        } else {
            ""
        };
        println!(
            "{:<32} {:<7} {:>6.2}% {:>6.2}% {:>2} {:>12} {:>12} {:>+7.1}%{flag}",
            truncate(&row.name, 32),
            row.tier,
            row.current_fee * 100.0,
            row.new_fee * 100.0,
            row.direction,
            millions(row.current_revenue),
            millions(row.new_revenue),
            row.revenue_delta_pct
        );
    }

    let totals = &page.simulation.totals;
    println!("\nTotals:");
    println!(
        "  Revenue       {} → {} ({:+.2}M)",
        millions(totals.current_revenue),
        millions(totals.new_revenue),
        totals.revenue_delta / 1e6
    );
    println!(
        "  Trips         {:.0} → {:.0} ({:+.1}%)",
        totals.current_trips, totals.new_trips, totals.trip_change_pct
    );
    println!("  Market share  {:.1}%", totals.market_share * 100.0);
    println!(
        "  Fee moves     {} up, {} down; {} capped, {} floored",
        totals.fee_increases, totals.fee_decreases, totals.capped, totals.floored
    );

    let gains = page
        .recommendations
        .iter()
        .filter(|r| r.revenue_change > 0.0)
        .count();
    let target_delta: f64 = page
        .target_fees
        .iter()
        .map(|t| t.new_revenue - t.current_revenue)
        .sum();
    println!(
        "\nTarget fees move revenue by {:+.2}M; the optimizer finds a gain for {} of {} brands.",
        target_delta / 1e6,
        gains,
        page.recommendations.len()
    );
}

pub(crate) fn impact(page: &RevenueImpact) {
    banner("REVENUE IMPACT");
    println!("Current take-rate revenue: {}", millions(page.total_revenue));
    print!("{}", page.summary.to_ascii_table());

    let top: Vec<_> = {
        let mut revenue = page.revenue.clone();
        revenue.sort_by(|a, b| b.annual_revenue.total_cmp(&a.annual_revenue));
        revenue.truncate(10);
        revenue
    };
    println!("\nLargest brands by revenue:");
    for brand in &top {
        println!("  {:<32} {:>12}", truncate(&brand.name, 32), millions(brand.annual_revenue));
    }

    if let Some(density) = &page.density {
        println!("\nLocation density:");
        println!(
            "  {:<14} {:>7} {:>9} {:>9} {:>8} {:>11}",
            "Bucket", "Brands", "Basket", "Defects", "Wait", "First-time"
        );
        for bucket in &density.summary {
            println!(
                "  {:<14} {:>7} {:>9} {:>9} {:>8} {:>11}",
                bucket.bucket,
                bucket.brands,
                optional(bucket.avg_basket, 2),
                optional(bucket.avg_defect_rate.map(|d| d * 100.0), 2),
                optional(bucket.avg_courier_wait, 1),
                optional(bucket.avg_first_time_share.map(|s| s * 100.0), 1)
            );
        }
        let c = &density.correlations;
        println!(
            "  Correlation with density: basket {}, defects {}, wait {}, first-time {}",
            optional(c.basket_size, 2),
            optional(c.defect_rate, 2),
            optional(c.courier_wait, 2),
            optional(c.first_time_share, 2)
        );
    }
}

pub(crate) fn economics(page: &UnitEconomicsPage, top: usize) {
    banner("UNIT ECONOMICS");

    let pnl = &page.pnl;
    println!("Platform P&L:");
    println!("  Orders              {:>14.0}", pnl.total_orders);
    println!("  Revenue             {:>14}", millions(pnl.total_revenue()));
    println!("  Costs               {:>14}", millions(pnl.total_costs()));
    println!(
        "  Contribution margin {:>14} ({:.1}%)",
        millions(pnl.contribution_margin()),
        pnl.margin_pct()
    );
    println!("\nScenarios:");
    for scenario in &page.scenarios {
        println!(
            "  {:<24} margin {:>12}  delta {:>+10.2}M",
            scenario.kind,
            millions(scenario.pnl.contribution_margin()),
            scenario.delta / 1e6
        );
    }

    println!(
        "\n{:<32} {:>9} {:>9} {:>9} {:>8} {:>12}",
        "Brand", "Rev/Trip", "Cost", "Margin", "Margin%", "Annual"
    );
    rule();
    for unit in page.units.iter().take(top) {
        println!(
            "{:<32} {:>9.2} {:>9.2} {:>9.2} {:>7.1}% {:>12}",
            truncate(&unit.name, 32),
            unit.revenue_per_trip,
            unit.total_cost_per_trip,
            unit.margin_per_trip,
            unit.margin_pct,
            millions(unit.annual_margin)
        );
    }
    let profitable = page.units.iter().filter(|u| u.profitable).count();
    println!("\n{profitable} of {} brands have a positive margin per trip.", page.units.len());

    let healthy = page.ltv.iter().filter(|l| l.healthy).count();
    println!(
        "{healthy} of {} brands clear an LTV/CAC of {HEALTHY_LTV_CAC:.1}.",
        page.ltv.len()
    );
    let at_risk = page.restaurants.iter().filter(|r| r.at_risk).count();
    println!("{at_risk} restaurants run a thin or negative margin.");
    if let Some(mean) = mean(page.retention.iter().map(|r| r.month_12)) {
        println!("Average 12-month retention: {:.1}%", mean * 100.0);
    }
}

pub(crate) fn growth(projections: &[GrowthProjection], periods: u32, top: usize) {
    banner("GROWTH PROJECTIONS");
    println!("Periods: {periods}\n");
    println!(
        "{:<32} {:>12} {:>12} {:>12} {:>9}",
        "Brand", "Revenue", "Projected", "Uplift", "Uplift%"
    );
    rule();
    for p in projections.iter().take(top) {
        println!(
            "{:<32} {:>12} {:>12} {:>12} {:>8.1}%",
            truncate(&p.name, 32),
            millions(p.current_revenue),
            millions(p.projected_revenue),
            millions(p.revenue_uplift),
            p.revenue_uplift_pct
        );
    }
    let current: f64 = projections.iter().map(|p| p.current_revenue).sum();
    let projected: f64 = projections.iter().map(|p| p.projected_revenue).sum();
    println!("\nTotal: {} → {}", millions(current), millions(projected));
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width - 1).collect();
        out.push('…');
        out
    }
}
