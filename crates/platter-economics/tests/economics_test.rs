//! Calculators over scored brands.

use approx::assert_relative_eq;
use platter_data::{BrandField, BrandRecord, BrandTable};
use platter_economics::{
    CostAssumptions, FeeDirection, FeeOptimizer, SimulationConfig, StepElasticity, TargetFees,
    UnitEconomics, apply_target_fees, contribution_margin,
};
use platter_scoring::{Scoreboard, ScoringConfig, ScoringEngine, Tier, TierCutoffs};
use rstest::rstest;

fn brand(name: &str, trips: f64, fee: f64) -> BrandRecord {
    BrandRecord::named(name)
        .with(BrandField::AnnualTrips, trips)
        .with(BrandField::ActiveLocations, 10.0)
        .with(BrandField::TotalLocations, 12.0)
        .with(BrandField::BasketSize, 25.0)
        .with(BrandField::MarketplaceFee, fee)
        .with(BrandField::DefectRate, 0.03)
        .with(BrandField::CourierWait, 5.0)
        .with(BrandField::FirstTimeShare, 0.10)
}

fn table() -> BrandTable {
    vec![
        brand("Alpha", 500_000.0, 0.11),
        brand("Bravo", 400_000.0, 0.12),
        brand("Charlie", 300_000.0, 0.29),
        brand("Delta", 200_000.0, 0.28),
    ]
    .into_iter()
    .collect()
}

/// Every brand in one tier.
fn board_in(tier: Tier) -> Scoreboard {
    let n = table().len();
    let cutoffs = match tier {
        Tier::Gold => TierCutoffs::Rank { gold: n, silver: n },
        Tier::Silver => TierCutoffs::Rank { gold: 0, silver: n },
        Tier::Bronze => TierCutoffs::Rank { gold: 0, silver: 0 },
    };
    ScoringEngine::new(ScoringConfig {
        cutoffs,
        ..ScoringConfig::default()
    })
    .score(&table())
    .unwrap()
}

#[test]
fn test_fee_floor_flags_only_strict_breaches() {
    let sim = SimulationConfig::default().simulate(&board_in(Tier::Gold)).unwrap();
    let row = |name: &str| sim.rows.iter().find(|r| r.name == name).unwrap();

    // 11% - 2pp lands below the floor; 12% - 2pp lands exactly on it.
    assert!(row("Alpha").floored);
    assert_relative_eq!(row("Alpha").new_fee, 0.10);
    assert!(!row("Bravo").floored);
    assert_relative_eq!(row("Bravo").new_fee, 0.10, epsilon = 1e-12);

    assert_eq!(sim.totals.floored, 1);
    assert_eq!(sim.totals.capped, 0);
    assert_eq!(sim.totals.fee_decreases, 4);
    assert!(sim.rows.iter().all(|r| r.direction == FeeDirection::Decrease));
}

#[test]
fn test_fee_cap_flags_only_strict_breaches() {
    let sim = SimulationConfig::default().simulate(&board_in(Tier::Bronze)).unwrap();
    let row = |name: &str| sim.rows.iter().find(|r| r.name == name).unwrap();

    assert!(row("Charlie").capped);
    assert_relative_eq!(row("Charlie").new_fee, 0.30);
    assert!(!row("Delta").capped);
    assert_eq!(sim.totals.capped, 1);
    assert_eq!(sim.totals.fee_increases, 4);
}

#[test]
fn test_simulation_totals() {
    let sim = SimulationConfig::default().simulate(&board_in(Tier::Gold)).unwrap();
    let totals = &sim.totals;

    assert_relative_eq!(totals.current_trips, 1_400_000.0);
    assert_relative_eq!(totals.new_trips, 1_680_000.0, epsilon = 1e-6);
    assert_relative_eq!(totals.trip_change_pct, 20.0, epsilon = 1e-9);
    assert_relative_eq!(totals.market_share, 0.216, epsilon = 1e-12);

    let row_delta: f64 = sim.rows.iter().map(|r| r.revenue_delta).sum();
    assert_relative_eq!(totals.revenue_delta, row_delta, epsilon = 1e-6);

    assert_eq!(totals.by_tier.len(), 3);
    assert_eq!(totals.by_tier[&Tier::Gold].brands, 4);
    assert_eq!(totals.by_tier[&Tier::Silver].brands, 0);
    assert_relative_eq!(totals.by_tier[&Tier::Gold].revenue_delta, totals.revenue_delta, epsilon = 1e-6);
}

#[test]
fn test_target_fees_move_volume_asymmetrically() {
    let impacts = apply_target_fees(
        &board_in(Tier::Gold),
        &TargetFees::default(),
        &StepElasticity::default(),
    );
    let alpha = impacts.iter().find(|i| i.name == "Alpha").unwrap();
    let charlie = impacts.iter().find(|i| i.name == "Charlie").unwrap();

    // Alpha moves up to 15%, Charlie down to 15%.
    assert!(alpha.volume_change_pct < 0.0);
    assert!(charlie.volume_change_pct > 0.0);
    assert!(alpha.new_trips < alpha.current_trips);
    assert!(charlie.new_trips > charlie.current_trips);
}

#[test]
fn test_optimizer_prefers_deepest_cut_under_elastic_demand() {
    let records = table();
    let recommendations = FeeOptimizer::default().optimize_all(records.records()).unwrap();
    for rec in &recommendations {
        assert_relative_eq!(rec.fee_change_pct, -5.0, epsilon = 1e-9);
        assert_relative_eq!(rec.revenue_change_pct, 2.125, epsilon = 1e-9);
    }
}

#[rstest]
#[case(10.0)]
#[case(7.5)]
#[case(30.0)]
fn test_doubling_costs_doubles_cost_share(#[case] revenue: f64) {
    let unit = UnitEconomics::for_brand(&brand("Alpha", 1.0, 0.2), &CostAssumptions::default());
    let costs = unit.costs;

    let once = 1.0 - contribution_margin(revenue, &costs) / revenue;
    let twice = 1.0 - contribution_margin(revenue, &costs.scaled(2.0)) / revenue;
    assert_relative_eq!(twice, 2.0 * once, epsilon = 1e-12);
    assert_relative_eq!(
        contribution_margin(revenue, &costs.scaled(2.0)),
        revenue - 2.0 * costs.total(),
        epsilon = 1e-12
    );
}
