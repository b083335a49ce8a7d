use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::scenario_config::ScenarioConfig;
use crate::data::scenario::Scenario;
use crate::error::{PlacementError, PlacementResult};
use crate::models::metrics::CoverageMetrics;

const PROGRESS_TEMPLATE: &str = "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} scenarios";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl RunStats {
    fn from_values(values: impl Iterator<Item = f64> + Clone) -> Self {
        let count = values.clone().count().max(1) as f64;
        Self {
            mean: values.clone().sum::<f64>() / count,
            min: values.clone().fold(f64::INFINITY, f64::min),
            max: values.fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchRun {
    pub seed: u64,
    pub metrics: CoverageMetrics,
    pub fallback_rounds: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub runs: Vec<BatchRun>,
    pub normal: RunStats,
    pub disaster: RunStats,
}

impl BatchSummary {
    pub fn efficiency(&self) -> f64 {
        (self.normal.mean + self.disaster.mean) / 2.0
    }
}

/// Optimizes `runs` independent scenarios seeded `base_seed`, `base_seed + 1`, ...
/// in parallel. The config's own seed is ignored.
pub fn run_batch(config: &ScenarioConfig, runs: usize, base_seed: u64) -> PlacementResult<BatchSummary> {
    if runs == 0 {
        return Err(PlacementError::params("a batch needs at least one run"));
    }

    let progress = ProgressBar::new(runs as u64);
    progress.set_style(
        ProgressStyle::with_template(PROGRESS_TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let results: Vec<BatchRun> = (0..runs as u64)
        .into_par_iter()
        .map(|i| -> PlacementResult<BatchRun> {
            let seed = base_seed.wrapping_add(i);
            let scenario = Scenario::generate_with_seed(config, seed)?;
            let outcome = scenario.optimize(false)?;
            progress.inc(1);
            Ok(BatchRun { seed, metrics: outcome.metrics, fallback_rounds: outcome.fallback_rounds() })
        })
        .collect::<PlacementResult<Vec<_>>>()?;

    progress.finish_and_clear();

    let normal = RunStats::from_values(results.iter().map(|r| r.metrics.normal_coverage_pct));
    let disaster = RunStats::from_values(results.iter().map(|r| r.metrics.disaster_coverage_pct));
    info!(runs, base_seed, normal_mean = normal.mean, disaster_mean = disaster.mean, "Batch complete");

    Ok(BatchSummary { runs: results, normal, disaster })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ScenarioConfig {
        ScenarioConfig { grid_rows: 10, grid_cols: 10, num_reactors: 2, reactor_radius: 2.0, ..ScenarioConfig::default() }
    }

    #[test]
    fn runs_are_seeded_consecutively_and_in_order() {
        let summary = run_batch(&small_config(), 4, 100).unwrap();
        let seeds: Vec<u64> = summary.runs.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![100, 101, 102, 103]);
        assert!(summary.normal.min <= summary.normal.mean && summary.normal.mean <= summary.normal.max);
        assert!(summary.disaster.min <= summary.disaster.mean && summary.disaster.mean <= summary.disaster.max);
    }

    #[test]
    fn batch_matches_individual_scenarios() {
        let config = small_config();
        let summary = run_batch(&config, 2, 7).unwrap();
        let single = Scenario::generate_with_seed(&config, 8).unwrap().optimize(true).unwrap();
        assert_eq!(summary.runs[1].metrics, single.metrics);
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert!(matches!(run_batch(&small_config(), 0, 1), Err(PlacementError::InvalidParameters(_))));
    }

    #[test]
    fn stats_of_known_values() {
        let stats = RunStats::from_values([10.0, 30.0, 20.0].into_iter());
        assert_eq!(stats, RunStats { mean: 20.0, min: 10.0, max: 30.0 });
    }
}
