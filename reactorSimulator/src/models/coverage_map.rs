use crate::config::constants::PERCENT;
use crate::models::site::FacilitySite;
use crate::models::surface::DemandSurface;
use crate::utils::disc::DiscStencil;

/// Cells reachable by at least one facility of a placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageMap {
    rows: usize,
    cols: usize,
    covered: Vec<bool>,
}

impl CoverageMap {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols, covered: vec![false; rows * cols] }
    }

    /// Coverage of `sites` on a `rows` x `cols` grid. Sites outside the grid
    /// still cover whatever part of their disc lands on it.
    pub fn from_sites(sites: &[FacilitySite], rows: usize, cols: usize, radius: f64) -> Self {
        let stencil = DiscStencil::for_grid(radius, rows, cols);
        let mut map = Self::new(rows, cols);
        for &site in sites {
            map.mark_disc(site, &stencil);
        }
        map
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_covered(&self, row: usize, col: usize) -> bool {
        self.covered[row * self.cols + col]
    }

    /// Idempotent: marking a covered cell again changes nothing.
    pub fn mark(&mut self, row: usize, col: usize) {
        self.covered[row * self.cols + col] = true;
    }

    pub fn mark_disc(&mut self, center: FacilitySite, stencil: &DiscStencil) {
        if center.row >= self.rows || center.col >= self.cols {
            // Out-of-grid centres only occur for externally supplied sites.
            for row in 0..self.rows {
                for col in 0..self.cols {
                    if center.covers(row, col, stencil.radius()) {
                        self.mark(row, col);
                    }
                }
            }
            return;
        }
        for (row, col) in stencil.cells_around(center, self.rows, self.cols) {
            self.mark(row, col);
        }
    }

    pub fn covered_count(&self) -> usize {
        self.covered.iter().filter(|&&c| c).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.covered
    }

    /// Covered share of a surface's total demand, in percent.
    ///
    /// Every cell counts toward the denominator, whatever its size. Returns 0
    /// when the surface sums to exactly 0.
    pub fn coverage_pct(&self, surface: &DemandSurface) -> f64 {
        debug_assert_eq!(surface.dims(), (self.rows, self.cols));
        let total = surface.total();
        if total == 0.0 {
            return 0.0;
        }
        let covered: f64 = surface
            .values()
            .iter()
            .zip(&self.covered)
            .map(|(demand, &hit)| if hit { *demand } else { 0.0 })
            .sum();
        covered / total * PERCENT
    }
}
