use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::placement::{validate_request, GreedyOptimizer};
use crate::error::PlacementResult;
use crate::models::coverage_map::CoverageMap;
use crate::models::metrics::CoverageMetrics;
use crate::models::site::FacilitySite;
use crate::models::surface::DemandSurface;
use crate::utils::logging::{self, OperationCategory, PlacementStage};

/// A fleet shape to try: how many reactors, how far each reaches, and how big.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FleetStrategy {
    pub reactors: usize,
    pub radius: f64,
    pub capacity: f64,   // MW per reactor
}

impl FleetStrategy {
    pub fn new(reactors: usize, radius: f64, capacity: f64) -> Self {
        Self { reactors, radius, capacity }
    }

    pub fn label(&self) -> String {
        format!("{} x {:.0} MW (r={})", self.reactors, self.capacity, self.radius)
    }

    pub fn total_capacity(&self) -> f64 {
        self.reactors as f64 * self.capacity
    }
}

/// The fleets compared by default: many small reactors down to a few large ones.
pub fn default_strategies() -> Vec<FleetStrategy> {
    vec![
        FleetStrategy::new(5, 3.0, 10.0),
        FleetStrategy::new(3, 4.0, 15.0),
        FleetStrategy::new(2, 5.0, 25.0),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyOutcome {
    pub strategy: FleetStrategy,
    pub placement: Vec<FacilitySite>,
    pub metrics: CoverageMetrics,
    pub efficiency: f64,
    pub total_capacity_mw: f64,
}

/// Runs the optimizer once per strategy. Results keep the input order.
pub fn compare_strategies(
    normal: &DemandSurface,
    disaster: &DemandSurface,
    strategies: &[FleetStrategy],
) -> PlacementResult<Vec<StrategyOutcome>> {
    let _timing = logging::start_timing("compare_strategies",
        OperationCategory::Placement { subcategory: PlacementStage::Metrics });

    for strategy in strategies {
        validate_request(normal, disaster, strategy.reactors, strategy.radius)?;
    }

    let outcomes = strategies
        .par_iter()
        .map(|strategy| -> PlacementResult<StrategyOutcome> {
            let outcome = GreedyOptimizer::new().place(normal, disaster, strategy.reactors, strategy.radius)?;
            Ok(StrategyOutcome {
                strategy: *strategy,
                efficiency: outcome.metrics.efficiency(),
                metrics: outcome.metrics,
                placement: outcome.placement,
                total_capacity_mw: strategy.total_capacity(),
            })
        })
        .collect::<PlacementResult<Vec<_>>>()?;

    for outcome in &outcomes {
        info!(
            strategy = %outcome.strategy.label(),
            efficiency = outcome.efficiency,
            "Strategy evaluated"
        );
    }

    Ok(outcomes)
}

/// Highest efficiency wins; the earliest strategy wins a tie.
pub fn best_strategy(outcomes: &[StrategyOutcome]) -> Option<&StrategyOutcome> {
    outcomes.iter().fold(None, |best: Option<&StrategyOutcome>, candidate| match best {
        Some(current) if current.efficiency >= candidate.efficiency => Some(current),
        _ => Some(candidate),
    })
}

/// Optimizer metrics for every fleet size from 0 to `k_max`.
pub fn coverage_curve(
    normal: &DemandSurface,
    disaster: &DemandSurface,
    k_max: usize,
    radius: f64,
) -> PlacementResult<Vec<(usize, CoverageMetrics)>> {
    validate_request(normal, disaster, k_max, radius)?;

    // Greedy placements are prefixes of each other, so the largest run
    // yields every point on the curve.
    let outcome = GreedyOptimizer::new().place(normal, disaster, k_max, radius)?;
    let (rows, cols) = normal.dims();
    let curve = (0..=k_max)
        .map(|k| {
            let coverage = CoverageMap::from_sites(&outcome.placement[..k], rows, cols, radius);
            (k, CoverageMetrics::new(coverage.coverage_pct(normal), coverage.coverage_pct(disaster)))
        })
        .collect();
    Ok(curve)
}
