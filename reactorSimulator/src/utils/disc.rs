use crate::models::site::{within_radius, FacilitySite};

/// Offsets of every cell within a coverage radius of the origin.
///
/// Offsets are stored in row-major order (row offset ascending, then column
/// offset ascending). Sums taken over the stencil therefore add cells in the
/// same order as a nested scan of the bounding square, which keeps marginal
/// scores bit-identical to that scan.
#[derive(Debug, Clone)]
pub struct DiscStencil {
    radius: f64,
    offsets: Vec<(isize, isize)>,
}

impl DiscStencil {
    /// Stencil for a `rows` x `cols` grid. Offsets that cannot land on the
    /// grid are left out. `radius` must be finite and non-negative.
    pub fn for_grid(radius: f64, rows: usize, cols: usize) -> Self {
        let grid_reach = rows.max(cols).saturating_sub(1) as f64;
        let reach = radius.min(grid_reach).floor() as isize;
        let mut offsets = Vec::new();

        for dr in -reach..=reach {
            for dc in -reach..=reach {
                let squared = (dr * dr + dc * dc) as usize;
                if within_radius(squared, radius) {
                    offsets.push((dr, dc));
                }
            }
        }

        Self { radius, offsets }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// In-bounds cells covered by a facility at `center`, in stencil order.
    pub fn cells_around(
        &self,
        center: FacilitySite,
        rows: usize,
        cols: usize,
    ) -> impl Iterator<Item = (usize, usize)> + '_ {
        let row = center.row as isize;
        let col = center.col as isize;
        self.offsets.iter().filter_map(move |&(dr, dc)| {
            let r = row + dr;
            let c = col + dc;
            if r >= 0 && c >= 0 && (r as usize) < rows && (c as usize) < cols {
                Some((r as usize, c as usize))
            } else {
                None
            }
        })
    }
}
