//! Greedy marginal-coverage placement of a homogeneous reactor fleet.
//!
//! Each of the `k` rounds scores every unchosen cell by the disaster demand
//! it would newly cover and keeps the first strict maximum in row-major
//! order. When no cell has a positive score the round falls back to `(0, 0)`,
//! even if that cell is already a site. Callers that need distinct sites must
//! check for this; it only happens once reachable disaster demand runs out.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{PlacementError, PlacementResult};
use crate::models::coverage_map::CoverageMap;
use crate::models::metrics::CoverageMetrics;
use crate::models::site::FacilitySite;
use crate::models::surface::DemandSurface;
use crate::utils::disc::DiscStencil;
use crate::utils::logging::{self, OperationCategory, PlacementStage};

/// Site chosen when no candidate has positive marginal score.
pub const FALLBACK_SITE: FacilitySite = FacilitySite { row: 0, col: 0 };

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementOutcome {
    pub placement: Vec<FacilitySite>,
    pub metrics: CoverageMetrics,
    /// Marginal disaster demand each site added when it was chosen.
    pub marginal_gains: Vec<f64>,
    #[serde(skip)]
    pub coverage: Option<CoverageMap>,
}

impl PlacementOutcome {
    /// Rounds that fell back to `(0, 0)` because nothing was left to cover.
    pub fn fallback_rounds(&self) -> usize {
        self.marginal_gains.iter().filter(|&&g| g == 0.0).count()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyOptimizer {
    parallel: bool,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    score: f64,
}

impl Candidate {
    // Higher score wins; equal scores go to the earlier cell.
    fn better(self, other: Candidate) -> Candidate {
        match self.score.total_cmp(&other.score) {
            std::cmp::Ordering::Greater => self,
            std::cmp::Ordering::Less => other,
            std::cmp::Ordering::Equal => if self.index <= other.index { self } else { other },
        }
    }
}

/// Checks the preconditions shared by every placement entry point.
pub fn validate_request(
    normal: &DemandSurface,
    disaster: &DemandSurface,
    k: usize,
    radius: f64,
) -> PlacementResult<()> {
    if !normal.same_shape(disaster) {
        return Err(PlacementError::params(format!(
            "normal surface is {}x{} but disaster surface is {}x{}",
            normal.rows(), normal.cols(), disaster.rows(), disaster.cols()
        )));
    }
    if k > normal.cell_count() {
        return Err(PlacementError::params(format!(
            "cannot place {} facilities on {} cells", k, normal.cell_count()
        )));
    }
    validate_radius(radius)
}

pub fn validate_radius(radius: f64) -> PlacementResult<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(PlacementError::params(format!(
            "coverage radius must be finite and non-negative, got {}", radius
        )));
    }
    Ok(())
}

impl GreedyOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan candidates on the rayon pool. Output is identical to the
    /// sequential scan.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn place(
        &self,
        normal: &DemandSurface,
        disaster: &DemandSurface,
        k: usize,
        radius: f64,
    ) -> PlacementResult<PlacementOutcome> {
        let _timing = logging::start_timing("place_facilities",
            OperationCategory::Placement { subcategory: PlacementStage::CandidateScan });

        validate_request(normal, disaster, k, radius)?;

        let (rows, cols) = disaster.dims();
        let stencil = DiscStencil::for_grid(radius, rows, cols);
        let mut coverage = CoverageMap::new(rows, cols);
        let mut chosen = vec![false; rows * cols];
        let mut placement = Vec::with_capacity(k);
        let mut marginal_gains = Vec::with_capacity(k);

        debug!(rows, cols, k, radius, stencil_cells = stencil.len(), parallel = self.parallel,
            "starting greedy placement");

        for round in 0..k {
            let best = if self.parallel {
                best_candidate_parallel(disaster, &coverage, &chosen, &stencil)
            } else {
                best_candidate(disaster, &coverage, &chosen, &stencil)
            };

            let (site, gain) = match best {
                Some(candidate) => (FacilitySite::new(candidate.index / cols, candidate.index % cols), candidate.score),
                None => {
                    warn!(round, "no candidate adds uncovered demand, falling back to (0, 0)");
                    (FALLBACK_SITE, 0.0)
                }
            };

            {
                let _timing = logging::start_timing("mark_coverage",
                    OperationCategory::Placement { subcategory: PlacementStage::CoverageMarking });
                coverage.mark_disc(site, &stencil);
            }
            chosen[site.row * cols + site.col] = true;
            placement.push(site);
            marginal_gains.push(gain);
            debug!(round, %site, gain, "placed facility");
        }

        let metrics = {
            let _timing = logging::start_timing("placement_metrics",
                OperationCategory::Placement { subcategory: PlacementStage::Metrics });
            CoverageMetrics::new(coverage.coverage_pct(normal), coverage.coverage_pct(disaster))
        };

        info!(
            facilities = placement.len(),
            normal_pct = metrics.normal_coverage_pct,
            disaster_pct = metrics.disaster_coverage_pct,
            "placement complete"
        );

        Ok(PlacementOutcome {
            placement,
            metrics,
            marginal_gains,
            coverage: Some(coverage),
        })
    }
}

/// Sequential greedy placement driven by the disaster surface.
pub fn place_facilities(
    normal: &DemandSurface,
    disaster: &DemandSurface,
    k: usize,
    radius: f64,
) -> PlacementResult<PlacementOutcome> {
    GreedyOptimizer::new().place(normal, disaster, k, radius)
}

/// Uncovered disaster demand a facility at `site` would add.
pub fn marginal_score(
    disaster: &DemandSurface,
    coverage: &CoverageMap,
    site: FacilitySite,
    stencil: &DiscStencil,
) -> f64 {
    let (rows, cols) = disaster.dims();
    let mut score = 0.0;
    for (row, col) in stencil.cells_around(site, rows, cols) {
        if !coverage.is_covered(row, col) {
            score += disaster.get(row, col);
        }
    }
    score
}

// First strict maximum with a positive score, scanning row-major.
fn best_candidate(
    disaster: &DemandSurface,
    coverage: &CoverageMap,
    chosen: &[bool],
    stencil: &DiscStencil,
) -> Option<Candidate> {
    let cols = disaster.cols();
    let mut best: Option<Candidate> = None;
    let mut best_score = 0.0;

    for index in 0..disaster.cell_count() {
        if chosen[index] {
            continue;
        }
        let score = marginal_score(disaster, coverage, FacilitySite::new(index / cols, index % cols), stencil);
        if score > best_score {
            best_score = score;
            best = Some(Candidate { index, score });
        }
    }

    best
}

fn best_candidate_parallel(
    disaster: &DemandSurface,
    coverage: &CoverageMap,
    chosen: &[bool],
    stencil: &DiscStencil,
) -> Option<Candidate> {
    let (rows, cols) = disaster.dims();

    (0..rows)
        .into_par_iter()
        .filter_map(|row| {
            let mut best: Option<Candidate> = None;
            for col in 0..cols {
                let index = row * cols + col;
                if chosen[index] {
                    continue;
                }
                let score = marginal_score(disaster, coverage, FacilitySite::new(row, col), stencil);
                if score > 0.0 && best.map_or(true, |b| score > b.score) {
                    best = Some(Candidate { index, score });
                }
            }
            best
        })
        .reduce_with(Candidate::better)
}
