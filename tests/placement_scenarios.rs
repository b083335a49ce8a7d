use std::collections::HashSet;

use reactorgrid::config::scenario_config::ScenarioConfig;
use reactorgrid::core::placement::FALLBACK_SITE;
use reactorgrid::core::scoring::PerformanceRating;
use reactorgrid::data::disaster::DisasterType;
use reactorgrid::data::scenario::Scenario;
use reactorgrid::{
    place_facilities, score_placement, Challenge, CoverageMetrics, DemandSurface, FacilitySite,
    GreedyOptimizer, PlacementError,
};

fn spike(rows: usize, cols: usize, row: usize, col: usize, value: f64) -> DemandSurface {
    DemandSurface::zeros(rows, cols).unwrap().with_value(row, col, value).unwrap()
}

#[test]
fn single_spike_picks_first_cell_in_scan_order() {
    let normal = DemandSurface::filled(5, 5, 1.0).unwrap();
    let disaster = spike(5, 5, 2, 2, 10.0);
    let outcome = place_facilities(&normal, &disaster, 1, 1.0).unwrap();
    assert_eq!(outcome.placement, vec![FacilitySite::new(1, 2)]);
    assert_eq!(outcome.metrics.disaster_coverage_pct, 100.0);
    assert!((outcome.metrics.normal_coverage_pct - 20.0).abs() < 1e-9);
}

#[test]
fn coverage_never_drops_as_the_fleet_grows() {
    let scenario = Scenario::generate(&ScenarioConfig { seed: Some(2024), ..ScenarioConfig::default() }).unwrap();
    let mut previous = CoverageMetrics::default();
    for k in 0..=6 {
        let outcome = place_facilities(&scenario.normal, scenario.disaster_demand(), k, 3.0).unwrap();
        assert!(outcome.metrics.normal_coverage_pct >= previous.normal_coverage_pct);
        assert!(outcome.metrics.disaster_coverage_pct >= previous.disaster_coverage_pct);
        previous = outcome.metrics;
    }
}

#[test]
fn identical_inputs_give_identical_outputs() {
    let config = ScenarioConfig { seed: Some(77), disaster_type: DisasterType::Flood, ..ScenarioConfig::default() };
    let first = Scenario::generate(&config).unwrap();
    let second = Scenario::generate(&config).unwrap();

    let a = first.optimize(false).unwrap();
    let b = second.optimize(false).unwrap();
    let c = GreedyOptimizer::new().parallel(true)
        .place(&second.normal, second.disaster_demand(), config.num_reactors, config.reactor_radius)
        .unwrap();

    assert_eq!(a.placement, b.placement);
    assert_eq!(a.metrics, b.metrics);
    assert_eq!(a.placement, c.placement);
    assert_eq!(a.metrics, c.metrics);
}

#[test]
fn placements_are_distinct_until_demand_runs_out() {
    let scenario = Scenario::generate(&ScenarioConfig { seed: Some(5), ..ScenarioConfig::default() }).unwrap();
    let outcome = scenario.optimize(true).unwrap();
    let unique: HashSet<_> = outcome.placement.iter().collect();
    assert_eq!(unique.len(), outcome.placement.len());
    assert_eq!(outcome.fallback_rounds(), 0);
}

#[test]
fn exhausted_demand_repeats_the_origin() {
    // (0, 0) is chosen first; after that nothing uncovered remains, so the
    // second round falls back to (0, 0) again.
    let disaster = spike(3, 3, 0, 0, 4.0);
    let outcome = place_facilities(&disaster, &disaster, 2, 0.0).unwrap();
    assert_eq!(outcome.placement, vec![FALLBACK_SITE, FALLBACK_SITE]);
    assert_eq!(outcome.fallback_rounds(), 1);
}

#[test]
fn boundaries_behave() {
    let surface = DemandSurface::filled(4, 4, 2.0).unwrap();
    let none = place_facilities(&surface, &surface, 0, 3.0).unwrap();
    assert!(none.placement.is_empty());
    assert_eq!(none.metrics, CoverageMetrics::new(0.0, 0.0));

    let own_cell = place_facilities(&surface, &surface, 1, 0.0).unwrap();
    assert!((own_cell.metrics.normal_coverage_pct - 100.0 / 16.0).abs() < 1e-9);

    let zeros = DemandSurface::zeros(4, 4).unwrap();
    let outcome = place_facilities(&zeros, &zeros, 2, 1.0).unwrap();
    assert_eq!(outcome.metrics, CoverageMetrics::new(0.0, 0.0));
}

#[test]
fn empty_manual_placement_scores_zero() {
    let surface = DemandSurface::filled(6, 6, 5.0).unwrap();
    let metrics = score_placement(&[], &surface, &surface, 2.0).unwrap();
    assert_eq!(metrics, CoverageMetrics::new(0.0, 0.0));
}

#[test]
fn challenge_falls_back_to_fifty_when_nothing_is_significant() {
    // Every cell is at or below the significance threshold, so the optimal
    // placement grades at zero.
    let surface = DemandSurface::filled(5, 5, 1.0).unwrap();
    let challenge = Challenge::new(&surface, &surface, 2, 1.0).unwrap();
    let result = challenge.evaluate(&[FacilitySite::new(4, 4), FacilitySite::new(3, 0)]).unwrap();
    assert_eq!(result.score, 50.0);
    assert_eq!(result.rating, PerformanceRating::Fair);
}

#[test]
fn challenge_rewards_matching_the_optimizer() {
    let scenario = Scenario::generate(&ScenarioConfig { seed: Some(31), ..ScenarioConfig::default() }).unwrap();
    let optimal = scenario.optimize(false).unwrap().placement;
    let result = scenario.challenge().unwrap().evaluate(&optimal).unwrap();
    assert_eq!(result.score, 100.0);
    assert_eq!(result.rating, PerformanceRating::Excellent);

    let wrong_count = scenario.challenge().unwrap().evaluate(&optimal[..1]);
    assert!(matches!(wrong_count, Err(PlacementError::InvalidParameters(_))));
}
