use serde::{Deserialize, Serialize};

use crate::models::site::FacilitySite;

/// Covered share of demand for both scenarios, each in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageMetrics {
    pub normal_coverage_pct: f64,
    pub disaster_coverage_pct: f64,
}

impl CoverageMetrics {
    pub fn new(normal_coverage_pct: f64, disaster_coverage_pct: f64) -> Self {
        Self { normal_coverage_pct, disaster_coverage_pct }
    }

    /// Mean of the two percentages ("coverage efficiency").
    pub fn efficiency(&self) -> f64 {
        (self.normal_coverage_pct + self.disaster_coverage_pct) / 2.0
    }
}

/// Placement plus the reporting figures shown alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementReport {
    pub placement: Vec<FacilitySite>,
    pub metrics: CoverageMetrics,
    pub efficiency: f64,
    pub redundancy: f64,          // mean number of sites covering each significant cell
    pub total_capacity_mw: f64,
    pub num_reactors: usize,
}
