//! Binary-program view of the placement problem.
//!
//! Variables: `y_r_c` (a facility at cell r,c), `n_r_c` / `d_r_c` (a
//! significant normal / disaster cell is covered). Constraints: at most K
//! facilities, and every coverage variable is bounded by the number of
//! facilities within radius of its cell. No solver ships with the crate;
//! `to_lp_format` writes CPLEX LP text for an external MILP solver, and
//! `objective_value` scores any placement under the same objective.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::constants::{DISASTER_SCENARIO_WEIGHT, SIGNIFICANCE_THRESHOLD};
use crate::core::placement::validate_request;
use crate::error::PlacementResult;
use crate::models::coverage_map::CoverageMap;
use crate::models::site::FacilitySite;
use crate::models::surface::DemandSurface;
use crate::utils::disc::DiscStencil;
use crate::utils::logging::{self, FileIOType, OperationCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    /// Minimize normal + 2x disaster uncovered demand.
    MinimizeUncoveredDemand,
    /// Maximize the number of covered significant cells over both scenarios.
    MaximizeCoverage,
    /// Maximize the number of covered significant disaster cells.
    DisasterResilience,
}

impl ObjectiveKind {
    pub const ALL: [ObjectiveKind; 3] = [
        ObjectiveKind::MinimizeUncoveredDemand,
        ObjectiveKind::MaximizeCoverage,
        ObjectiveKind::DisasterResilience,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectiveKind::MinimizeUncoveredDemand => "minimize_uncovered_demand",
            ObjectiveKind::MaximizeCoverage => "maximize_coverage",
            ObjectiveKind::DisasterResilience => "disaster_resilience",
        }
    }

    pub fn is_minimization(&self) -> bool {
        matches!(self, ObjectiveKind::MinimizeUncoveredDemand)
    }
}

impl FromStr for ObjectiveKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "minimize_uncovered_demand" | "uncovered" => Ok(ObjectiveKind::MinimizeUncoveredDemand),
            "maximize_coverage" | "coverage" => Ok(ObjectiveKind::MaximizeCoverage),
            "disaster_resilience" | "resilience" => Ok(ObjectiveKind::DisasterResilience),
            other => Err(format!("unknown objective '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioKind {
    Normal,
    Disaster,
}

impl ScenarioKind {
    fn prefix(&self) -> char {
        match self {
            ScenarioKind::Normal => 'n',
            ScenarioKind::Disaster => 'd',
        }
    }
}

/// One coverage variable and the facility cells that can satisfy it.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageConstraint {
    pub scenario: ScenarioKind,
    pub cell: FacilitySite,
    pub demand: f64,
    pub covering_sites: Vec<FacilitySite>,
}

#[derive(Debug, Clone)]
pub struct CoverageProgram {
    rows: usize,
    cols: usize,
    max_facilities: usize,
    radius: f64,
    objective: ObjectiveKind,
    constraints: Vec<CoverageConstraint>,
}

fn var_name(prefix: char, site: FacilitySite) -> String {
    format!("{}_{}_{}", prefix, site.row, site.col)
}

// LP readers cap line length, so long sums wrap.
const TERMS_PER_LINE: usize = 8;

fn write_sum(lp: &mut String, terms: impl Iterator<Item = String>) -> usize {
    let mut count = 0;
    for term in terms {
        if count > 0 && count % TERMS_PER_LINE == 0 {
            lp.push_str("\n    ");
        }
        lp.push_str(" + ");
        lp.push_str(&term);
        count += 1;
    }
    count
}

impl CoverageProgram {
    pub fn build(
        normal: &DemandSurface,
        disaster: &DemandSurface,
        max_facilities: usize,
        radius: f64,
        objective: ObjectiveKind,
    ) -> PlacementResult<Self> {
        validate_request(normal, disaster, max_facilities, radius)?;

        let (rows, cols) = normal.dims();
        let stencil = DiscStencil::for_grid(radius, rows, cols);
        let mut constraints = Vec::new();

        for (scenario, surface) in [(ScenarioKind::Normal, normal), (ScenarioKind::Disaster, disaster)] {
            for (row, col, demand) in surface.cells() {
                if demand <= SIGNIFICANCE_THRESHOLD {
                    continue;
                }
                let cell = FacilitySite::new(row, col);
                // The disc is symmetric, so the sites covering a cell are the
                // cells its own disc reaches.
                let covering_sites = stencil
                    .cells_around(cell, rows, cols)
                    .map(FacilitySite::from)
                    .collect();
                constraints.push(CoverageConstraint { scenario, cell, demand, covering_sites });
            }
        }

        Ok(Self { rows, cols, max_facilities, radius, objective, constraints })
    }

    pub fn objective(&self) -> ObjectiveKind {
        self.objective
    }

    pub fn max_facilities(&self) -> usize {
        self.max_facilities
    }

    pub fn constraints(&self) -> &[CoverageConstraint] {
        &self.constraints
    }

    pub fn facility_variable_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn coverage_variable_count(&self) -> usize {
        self.constraints.len()
    }

    fn weight(&self, constraint: &CoverageConstraint) -> f64 {
        match (self.objective, constraint.scenario) {
            (ObjectiveKind::MinimizeUncoveredDemand, ScenarioKind::Normal) => constraint.demand,
            (ObjectiveKind::MinimizeUncoveredDemand, ScenarioKind::Disaster) => DISASTER_SCENARIO_WEIGHT * constraint.demand,
            (ObjectiveKind::MaximizeCoverage, _) => 1.0,
            (ObjectiveKind::DisasterResilience, ScenarioKind::Disaster) => 1.0,
            (ObjectiveKind::DisasterResilience, ScenarioKind::Normal) => 0.0,
        }
    }

    /// Sum of weights over every coverage variable; for the minimization
    /// objective this is the value with nothing covered.
    fn total_weight(&self) -> f64 {
        self.constraints.iter().map(|c| self.weight(c)).sum()
    }

    /// Objective value of `placement` with every coverage variable at its
    /// best feasible value. Placements larger than K are scored anyway.
    pub fn objective_value(&self, placement: &[FacilitySite]) -> f64 {
        let coverage = CoverageMap::from_sites(placement, self.rows, self.cols, self.radius);
        let covered_weight: f64 = self
            .constraints
            .iter()
            .filter(|c| coverage.is_covered(c.cell.row, c.cell.col))
            .map(|c| self.weight(c))
            .sum();

        if self.objective.is_minimization() {
            self.total_weight() - covered_weight
        } else {
            covered_weight
        }
    }

    /// `a` is at least as good as `b` under this objective.
    pub fn is_at_least_as_good(&self, a: &[FacilitySite], b: &[FacilitySite]) -> bool {
        let (va, vb) = (self.objective_value(a), self.objective_value(b));
        if self.objective.is_minimization() { va <= vb } else { va >= vb }
    }

    fn facility_names(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.rows * self.cols).map(move |i| var_name('y', FacilitySite::new(i / self.cols, i % self.cols)))
    }

    /// CPLEX LP text of the program.
    ///
    /// The minimization objective is written as the equivalent maximization
    /// of weighted covered demand; the constant offset is noted in a comment.
    pub fn to_lp_format(&self) -> String {
        let mut lp = String::new();
        let _ = writeln!(lp, "\\ Reactor placement: {} ({}x{} grid, K={}, radius={})",
            self.objective.as_str(), self.rows, self.cols, self.max_facilities, self.radius);
        if self.objective.is_minimization() {
            let _ = writeln!(lp, "\\ uncovered demand = {} - objective", self.total_weight());
        }

        lp.push_str("Maximize\n obj:");
        let weighted = self.constraints.iter().filter_map(|c| {
            let weight = self.weight(c);
            (weight != 0.0).then(|| format!("{} {}", weight, var_name(c.scenario.prefix(), c.cell)))
        });
        if write_sum(&mut lp, weighted) == 0 {
            lp.push_str(" 0 y_0_0");
        }
        lp.push('\n');

        lp.push_str("Subject To\n max_facilities:");
        write_sum(&mut lp, self.facility_names());
        let _ = writeln!(lp, " <= {}", self.max_facilities);

        for c in &self.constraints {
            let cover = var_name(c.scenario.prefix(), c.cell);
            let _ = write!(lp, " cov_{}:", cover);
            write_sum(&mut lp, c.covering_sites.iter().map(|site| var_name('y', *site)));
            let _ = writeln!(lp, " - {} >= 0", cover);
        }

        lp.push_str("Binary\n");
        for name in self.facility_names() {
            let _ = writeln!(lp, " {}", name);
        }
        for c in &self.constraints {
            let _ = writeln!(lp, " {}", var_name(c.scenario.prefix(), c.cell));
        }
        lp.push_str("End\n");
        lp
    }

    pub fn write_lp(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let _timing = logging::start_timing("write_lp",
            OperationCategory::FileIO { subcategory: FileIOType::LpExport });

        let path = path.as_ref();
        fs::write(path, self.to_lp_format())
            .with_context(|| format!("writing LP model to {}", path.display()))?;
        info!(path = %path.display(), constraints = self.constraints.len(), "wrote LP model");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::placement::place_facilities;

    fn surfaces() -> (DemandSurface, DemandSurface) {
        let normal = DemandSurface::from_rows(vec![
            vec![2.0, 0.5, 0.5],
            vec![0.5, 3.0, 0.5],
            vec![0.5, 0.5, 4.0],
        ]).unwrap();
        let disaster = normal.with_value(0, 0, 0.2).unwrap();
        (normal, disaster)
    }

    #[test]
    fn only_significant_cells_get_coverage_variables() {
        let (normal, disaster) = surfaces();
        let program = CoverageProgram::build(&normal, &disaster, 1, 1.0, ObjectiveKind::MinimizeUncoveredDemand).unwrap();
        assert_eq!(program.facility_variable_count(), 9);
        // normal: 3 significant cells, disaster: 2
        assert_eq!(program.coverage_variable_count(), 5);
        let centre = program.constraints().iter().find(|c| c.cell == FacilitySite::new(1, 1)).unwrap();
        assert_eq!(centre.covering_sites.len(), 5);
    }

    #[test]
    fn minimization_objective_counts_uncovered_weighted_demand() {
        let (normal, disaster) = surfaces();
        let program = CoverageProgram::build(&normal, &disaster, 1, 0.0, ObjectiveKind::MinimizeUncoveredDemand).unwrap();
        // nothing covered: 2 + 3 + 4 + 2 * (3 + 4)
        assert_eq!(program.objective_value(&[]), 23.0);
        // cover (2,2): removes 4 + 8
        assert_eq!(program.objective_value(&[FacilitySite::new(2, 2)]), 11.0);
    }

    #[test]
    fn count_objectives() {
        let (normal, disaster) = surfaces();
        let site = [FacilitySite::new(1, 1)];
        let coverage = CoverageProgram::build(&normal, &disaster, 1, 1.0, ObjectiveKind::MaximizeCoverage).unwrap();
        assert_eq!(coverage.objective_value(&site), 2.0);
        let resilience = CoverageProgram::build(&normal, &disaster, 1, 1.0, ObjectiveKind::DisasterResilience).unwrap();
        assert_eq!(resilience.objective_value(&site), 1.0);
        assert!(resilience.is_at_least_as_good(&site, &[]));
    }

    #[test]
    fn greedy_placement_is_feasible_and_scored() {
        let (normal, disaster) = surfaces();
        let program = CoverageProgram::build(&normal, &disaster, 2, 1.0, ObjectiveKind::MinimizeUncoveredDemand).unwrap();
        let outcome = place_facilities(&normal, &disaster, 2, 1.0).unwrap();
        assert!(outcome.placement.len() <= program.max_facilities());
        assert!(program.is_at_least_as_good(&outcome.placement, &[]));
    }

    #[test]
    fn lp_text_has_all_sections() {
        let (normal, disaster) = surfaces();
        let program = CoverageProgram::build(&normal, &disaster, 2, 1.0, ObjectiveKind::MinimizeUncoveredDemand).unwrap();
        let lp = program.to_lp_format();
        assert!(lp.starts_with("\\ Reactor placement: minimize_uncovered_demand"));
        assert!(lp.contains("Maximize\n obj: + 2 n_0_0"));
        assert!(lp.contains("+ 6 d_1_1"));
        assert!(lp.contains(" <= 2\n"));
        assert!(lp.contains(" cov_d_2_2: + y_1_2 + y_2_1 + y_2_2 - d_2_2 >= 0\n"));
        assert!(lp.contains("Binary\n y_0_0\n"));
        assert!(lp.trim_end().ends_with("End"));
    }

    #[test]
    fn parses_objective_names() {
        assert_eq!("maximize coverage".parse::<ObjectiveKind>(), Ok(ObjectiveKind::MaximizeCoverage));
        assert_eq!("Disaster-Resilience".parse::<ObjectiveKind>(), Ok(ObjectiveKind::DisasterResilience));
        assert!("cheapest".parse::<ObjectiveKind>().is_err());
    }
}
