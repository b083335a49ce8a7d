// Scoring of externally supplied placements and the challenge (game) mode.
//
// Grading here ignores cells at or below SIGNIFICANCE_THRESHOLD in both the
// covered and total sums. The optimizer's own metric counts every cell, so
// the two percentages are not interchangeable.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::constants::{
    EXCELLENT_SCORE, FAIR_SCORE, FALLBACK_CHALLENGE_SCORE, GOOD_SCORE, LOCATION_MATCH_BONUS,
    MAX_CHALLENGE_SCORE, PERCENT, REDUNDANCY_DEMAND_THRESHOLD, SIGNIFICANCE_THRESHOLD,
};
use crate::core::placement::{validate_radius, validate_request, GreedyOptimizer, PlacementOutcome};
use crate::error::{PlacementError, PlacementResult};
use crate::models::metrics::{CoverageMetrics, PlacementReport};
use crate::models::site::FacilitySite;
use crate::models::surface::DemandSurface;
use crate::utils::logging::{self, OperationCategory};

fn covered_by_any(sites: &[FacilitySite], row: usize, col: usize, radius: f64) -> bool {
    sites.iter().any(|site| site.covers(row, col, radius))
}

/// Percent of significant demand within `radius` of any site.
pub fn graded_coverage_pct(sites: &[FacilitySite], surface: &DemandSurface, radius: f64) -> f64 {
    let mut total = 0.0;
    let mut covered = 0.0;

    for (row, col, demand) in surface.cells() {
        if demand > SIGNIFICANCE_THRESHOLD {
            total += demand;
            if covered_by_any(sites, row, col, radius) {
                covered += demand;
            }
        }
    }

    if total > 0.0 { covered / total * PERCENT } else { 0.0 }
}

/// Grades an arbitrary placement on both surfaces.
///
/// Sites may lie anywhere, including off the grid; only the surfaces and
/// radius are validated.
pub fn score_placement(
    sites: &[FacilitySite],
    normal: &DemandSurface,
    disaster: &DemandSurface,
    radius: f64,
) -> PlacementResult<CoverageMetrics> {
    let _timing = logging::start_timing("score_placement", OperationCategory::Scoring);

    if !normal.same_shape(disaster) {
        return Err(PlacementError::params(format!(
            "normal surface is {}x{} but disaster surface is {}x{}",
            normal.rows(), normal.cols(), disaster.rows(), disaster.cols()
        )));
    }
    validate_radius(radius)?;

    Ok(CoverageMetrics::new(
        graded_coverage_pct(sites, normal, radius),
        graded_coverage_pct(sites, disaster, radius),
    ))
}

/// Mean number of sites covering each demand cell above 0.1 MW. This uses a
/// lower cut than grading, so light Empty-zone load still counts.
pub fn placement_redundancy(sites: &[FacilitySite], surface: &DemandSurface, radius: f64) -> f64 {
    let mut demand_points = 0usize;
    let mut total_cover = 0usize;

    for (row, col, demand) in surface.cells() {
        if demand > REDUNDANCY_DEMAND_THRESHOLD {
            demand_points += 1;
            total_cover += sites.iter().filter(|site| site.covers(row, col, radius)).count();
        }
    }

    if demand_points > 0 { total_cover as f64 / demand_points as f64 } else { 0.0 }
}

/// Reporting view of an optimizer outcome. The metrics are the optimizer's
/// own (unthresholded) figures.
pub fn build_report(
    outcome: &PlacementOutcome,
    normal: &DemandSurface,
    radius: f64,
    reactor_capacity: f64,
) -> PlacementReport {
    PlacementReport {
        placement: outcome.placement.clone(),
        metrics: outcome.metrics,
        efficiency: outcome.metrics.efficiency(),
        redundancy: placement_redundancy(&outcome.placement, normal, radius),
        total_capacity_mw: outcome.placement.len() as f64 * reactor_capacity,
        num_reactors: outcome.placement.len(),
    }
}

/// Human sites that coincide with a site of the optimal placement.
pub fn location_matches(human: &[FacilitySite], optimal: &[FacilitySite]) -> usize {
    human.iter().filter(|site| optimal.contains(site)).count()
}

/// Relative score of a human placement against the optimal one, capped at 100.
///
/// Falls back to exactly 50 when the optimal placement has zero average
/// coverage, regardless of how the human did.
pub fn relative_score(user_metrics: &CoverageMetrics, optimal_metrics: &CoverageMetrics, matches: usize) -> f64 {
    let user_avg = user_metrics.efficiency();
    let optimal_avg = optimal_metrics.efficiency();

    if optimal_avg > 0.0 {
        let ratio_score = (user_avg / optimal_avg * PERCENT).min(MAX_CHALLENGE_SCORE);
        let bonus = LOCATION_MATCH_BONUS * matches as f64;
        (ratio_score + bonus).min(MAX_CHALLENGE_SCORE)
    } else {
        FALLBACK_CHALLENGE_SCORE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceRating {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl PerformanceRating {
    pub fn from_score(score: f64) -> Self {
        if score >= EXCELLENT_SCORE {
            PerformanceRating::Excellent
        } else if score >= GOOD_SCORE {
            PerformanceRating::Good
        } else if score >= FAIR_SCORE {
            PerformanceRating::Fair
        } else {
            PerformanceRating::NeedsImprovement
        }
    }
}

impl fmt::Display for PerformanceRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PerformanceRating::Excellent => "EXCELLENT!",
            PerformanceRating::Good => "GOOD!",
            PerformanceRating::Fair => "FAIR",
            PerformanceRating::NeedsImprovement => "NEEDS IMPROVEMENT",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeScore {
    pub user_placement: Vec<FacilitySite>,
    pub optimal_placement: Vec<FacilitySite>,
    pub user_metrics: CoverageMetrics,
    pub optimal_metrics: CoverageMetrics,
    pub location_matches: usize,
    pub score: f64,
    pub rating: PerformanceRating,
}

/// A locked challenge scenario a human plays against the optimizer.
#[derive(Debug, Clone)]
pub struct Challenge<'a> {
    normal: &'a DemandSurface,
    disaster: &'a DemandSurface,
    reactors: usize,
    radius: f64,
}

impl<'a> Challenge<'a> {
    pub fn new(normal: &'a DemandSurface, disaster: &'a DemandSurface, reactors: usize, radius: f64) -> PlacementResult<Self> {
        validate_request(normal, disaster, reactors, radius)?;
        Ok(Self { normal, disaster, reactors, radius })
    }

    pub fn normal(&self) -> &'a DemandSurface {
        self.normal
    }

    pub fn disaster(&self) -> &'a DemandSurface {
        self.disaster
    }

    pub fn reactors(&self) -> usize {
        self.reactors
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    fn validate_human(&self, human: &[FacilitySite]) -> PlacementResult<()> {
        if human.len() != self.reactors {
            return Err(PlacementError::params(format!(
                "challenge expects {} reactors, got {}", self.reactors, human.len()
            )));
        }
        let (rows, cols) = self.normal.dims();
        if let Some(site) = human.iter().find(|site| !site.is_within(rows, cols)) {
            return Err(PlacementError::params(format!(
                "site {} is outside the {}x{} grid", site, rows, cols
            )));
        }
        let mut seen = HashSet::with_capacity(human.len());
        if let Some(site) = human.iter().find(|site| !seen.insert(**site)) {
            return Err(PlacementError::params(format!("site {} is placed twice", site)));
        }
        Ok(())
    }

    /// Grades both placements with the thresholded routine, then scores the
    /// human against the optimizer.
    pub fn evaluate(&self, human: &[FacilitySite]) -> PlacementResult<ChallengeScore> {
        let _timing = logging::start_timing("evaluate_challenge", OperationCategory::Scoring);

        self.validate_human(human)?;

        let optimal = GreedyOptimizer::new().place(self.normal, self.disaster, self.reactors, self.radius)?;
        let user_metrics = score_placement(human, self.normal, self.disaster, self.radius)?;
        let optimal_metrics = score_placement(&optimal.placement, self.normal, self.disaster, self.radius)?;
        let matches = location_matches(human, &optimal.placement);
        let score = relative_score(&user_metrics, &optimal_metrics, matches);
        let rating = PerformanceRating::from_score(score);

        debug!(user = user_metrics.efficiency(), optimal = optimal_metrics.efficiency(), matches, "challenge graded");
        info!(score, %rating, "challenge complete");

        Ok(ChallengeScore {
            user_placement: human.to_vec(),
            optimal_placement: optimal.placement,
            user_metrics,
            optimal_metrics,
            location_matches: matches,
            score,
            rating,
        })
    }
}
