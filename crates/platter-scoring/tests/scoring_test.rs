//! End-to-end scoring properties.

use approx::assert_relative_eq;
use platter_data::{BrandField, BrandRecord, BrandTable, Cell, NAME_HEADER, Sheet};
use platter_scoring::{
    Metric, Normalization, ScoreError, ScoreWarning, ScoringConfig, ScoringEngine, Tier,
    TierCutoffs, Weights,
};
use rstest::rstest;

fn brands(n: usize) -> BrandTable {
    (0..n)
        .map(|i| {
            let x = i as f64;
            BrandRecord::named(format!("Brand {i:02}"))
                .with(BrandField::AnnualTrips, 50_000.0 + 37_000.0 * ((x * 7.0) % 11.0))
                .with(BrandField::ActiveLocations, 1.0 + (x * 3.0) % 40.0)
                .with(BrandField::TotalLocations, 45.0)
                .with(BrandField::FranchiseShare, (x * 0.13) % 1.0)
                .with(BrandField::BasketSize, 12.0 + (x * 5.0) % 23.0)
                .with(BrandField::MarketplaceFee, 0.15 + 0.01 * ((x * 3.0) % 10.0))
                .with(BrandField::FirstTimeShare, 0.05 + 0.02 * (x % 9.0))
                .with(BrandField::DefectRate, 0.01 + 0.005 * ((x * 5.0) % 13.0))
                .with(BrandField::CourierWait, 2.0 + (x * 1.7) % 9.0)
        })
        .collect()
}

#[rstest]
#[case(Normalization::MinMax, 40)]
#[case(Normalization::PercentRank, 40)]
#[case(Normalization::MinMax, 7)]
#[case(Normalization::PercentRank, 1)]
fn test_scores_are_bounded_and_tiers_partition(
    #[case] normalization: Normalization,
    #[case] n: usize,
) {
    let engine = ScoringEngine::new(ScoringConfig {
        normalization,
        ..ScoringConfig::default()
    });
    let board = engine.score(&brands(n)).unwrap();

    assert_eq!(board.len(), n);
    for result in &board.results {
        assert!((0.0..=100.0).contains(&result.composite), "{}", result.composite);
        for value in result.normalized.values() {
            assert!((0.0..=1.0).contains(value));
        }
    }

    let counts = board.tier_counts();
    assert_eq!(counts.values().sum::<usize>(), n);

    // Ranks never increase down the board and composites never go up.
    for pair in board.results.windows(2) {
        assert!(pair[0].rank <= pair[1].rank);
        assert!(pair[0].composite >= pair[1].composite);
        assert!(pair[0].tier <= pair[1].tier);
    }
}

#[rstest]
#[case(Normalization::MinMax)]
#[case(Normalization::PercentRank)]
fn test_fractional_weights_never_exceed_one_hundred(#[case] normalization: Normalization) {
    let weights = Weights::empty()
        .with(Metric::TripVolume, 0.1)
        .with(Metric::CourierWait, 0.1)
        .with(Metric::DefectRate, 0.1)
        .with(Metric::RevenuePerOrder, 0.12);
    let engine = ScoringEngine::new(ScoringConfig {
        weights,
        normalization,
        ..ScoringConfig::default()
    });

    let top = BrandRecord::named("Top")
        .with(BrandField::AnnualTrips, 900_000.0)
        .with(BrandField::CourierWait, 1.5)
        .with(BrandField::DefectRate, 0.005)
        .with(BrandField::BasketSize, 40.0)
        .with(BrandField::MarketplaceFee, 0.25);
    let tail = BrandRecord::named("Tail")
        .with(BrandField::AnnualTrips, 10_000.0)
        .with(BrandField::CourierWait, 9.0)
        .with(BrandField::DefectRate, 0.08)
        .with(BrandField::BasketSize, 10.0)
        .with(BrandField::MarketplaceFee, 0.15);

    for table in [
        [top.clone(), tail].into_iter().collect::<BrandTable>(),
        brands(40).records().iter().cloned().chain([top]).collect(),
    ] {
        let board = engine.score(&table).unwrap();
        for result in &board.results {
            assert!(result.composite <= 100.0, "{}", result.composite);
            assert!(result.composite >= 0.0, "{}", result.composite);
        }
        let leader = &board.results[0];
        assert_eq!(leader.brand.name, "Top");
        assert_eq!(leader.rank, 1);
        if normalization == Normalization::MinMax {
            assert_relative_eq!(leader.composite, 100.0, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_default_cutoffs_on_two_hundred_brands() {
    let board = ScoringEngine::default().score(&brands(200)).unwrap();
    let counts = board.tier_counts();
    assert!(counts[&Tier::Gold] >= 10);
    assert!(counts[&Tier::Gold] + counts[&Tier::Silver] >= 50);
    assert_eq!(counts.values().sum::<usize>(), 200);
}

#[test]
fn test_lower_defect_rate_scores_higher() {
    let table = brands(12);
    let board = ScoringEngine::default().score(&table).unwrap();

    let target = "Brand 05";
    let before = board.get(target).unwrap().composite;
    let lowest = table
        .records()
        .iter()
        .map(|r| r.defect_rate)
        .fold(f64::INFINITY, f64::min);

    let improved: BrandTable = table
        .records()
        .iter()
        .cloned()
        .map(|r| {
            if r.name == target {
                r.with(BrandField::DefectRate, lowest / 2.0)
            } else {
                r
            }
        })
        .collect();
    let after = ScoringEngine::default()
        .score(&improved)
        .unwrap()
        .get(target)
        .unwrap()
        .composite;

    assert!(after > before, "{after} <= {before}");
}

#[test]
fn test_weights_are_relative() {
    let table = brands(15);
    let scaled: Weights = Weights::default()
        .active()
        .into_iter()
        .map(|(m, w)| (m, w * 3.0))
        .collect();

    let a = ScoringEngine::default().score(&table).unwrap();
    let b = ScoringEngine::new(ScoringConfig {
        weights: scaled,
        ..ScoringConfig::default()
    })
    .score(&table)
    .unwrap();

    for x in &a.results {
        let y = b.get(x.name()).unwrap();
        assert_relative_eq!(x.composite, y.composite, epsilon = 1e-9);
    }
}

#[test]
fn test_rank_cutoffs() {
    let engine = ScoringEngine::new(ScoringConfig {
        cutoffs: TierCutoffs::Rank { gold: 3, silver: 8 },
        ..ScoringConfig::default()
    });
    let board = engine.score(&brands(20)).unwrap();
    assert!(board.in_tier(Tier::Gold).all(|r| r.rank <= 3));
    assert!(board.in_tier(Tier::Bronze).all(|r| r.rank > 8));
}

fn sheet_without(dropped: &[&str]) -> BrandTable {
    let headers: Vec<String> = std::iter::once(NAME_HEADER)
        .chain(BrandField::ALL.iter().map(BrandField::header))
        .filter(|h| !dropped.contains(h))
        .map(str::to_string)
        .collect();
    let rows = (0..4)
        .map(|i| {
            headers
                .iter()
                .map(|h| {
                    if h == NAME_HEADER {
                        Cell::Text(format!("B{i}"))
                    } else {
                        Cell::Number(1.0 + i as f64)
                    }
                })
                .collect()
        })
        .collect();
    BrandTable::from_sheet(&Sheet::new("Brands", headers, rows)).0
}

#[test]
fn test_missing_column_drops_metric_with_warning() {
    let table = sheet_without(&["Order Defect Rate"]);
    let board = ScoringEngine::default().score(&table).unwrap();

    assert_eq!(
        board.warnings,
        vec![ScoreWarning::MetricUnavailable {
            metric: Metric::DefectRate
        }]
    );
    assert_eq!(board.weights.get(Metric::DefectRate), 0.0);
    assert_eq!(board.weights.total(), 88.0);
    assert!(board.results.iter().all(|r| !r.components.contains_key(&Metric::DefectRate)));
}

#[test]
fn test_falls_back_to_defaults_when_nothing_weighted_remains() {
    let table = sheet_without(&["Order Defect Rate"]);
    let engine = ScoringEngine::new(ScoringConfig {
        weights: Weights::empty().with(Metric::DefectRate, 10.0),
        ..ScoringConfig::default()
    });
    let board = engine.score(&table).unwrap();

    assert!(board.warnings.contains(&ScoreWarning::DefaultWeightsUsed));
    assert_eq!(board.weights.total(), 88.0);
}

#[test]
fn test_no_scorable_metric() {
    let table = sheet_without(&[
        "Annualized Trips",
        "Avg. Courier Wait Time (min)",
        "Order Defect Rate",
        "Marketplace Fee",
    ]);
    let engine = ScoringEngine::new(ScoringConfig {
        weights: Weights::empty().with(Metric::TripVolume, 1.0),
        ..ScoringConfig::default()
    });
    assert!(matches!(engine.score(&table), Err(ScoreError::NoScorableMetrics)));
}
