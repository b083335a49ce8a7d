use serde::{Deserialize, Serialize};

use crate::error::{PlacementError, PlacementResult};

/// R x C grid of non-negative demand magnitudes (MW), stored row-major.
///
/// Every constructor validates shape and values, so a `DemandSurface` that
/// exists is always well formed: positive dimensions, finite and
/// non-negative cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSurface", into = "RawSurface")]
pub struct DemandSurface {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
struct RawSurface {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl TryFrom<RawSurface> for DemandSurface {
    type Error = PlacementError;

    fn try_from(raw: RawSurface) -> Result<Self, Self::Error> {
        DemandSurface::new(raw.rows, raw.cols, raw.values)
    }
}

impl From<DemandSurface> for RawSurface {
    fn from(surface: DemandSurface) -> Self {
        RawSurface { rows: surface.rows, cols: surface.cols, values: surface.values }
    }
}

impl DemandSurface {
    pub fn new(rows: usize, cols: usize, values: Vec<f64>) -> PlacementResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(PlacementError::params(format!(
                "surface dimensions must be positive, got {}x{}", rows, cols
            )));
        }
        if values.len() != rows * cols {
            return Err(PlacementError::params(format!(
                "surface of {}x{} needs {} values, got {}", rows, cols, rows * cols, values.len()
            )));
        }
        if let Some((index, value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite() || **v < 0.0) {
            return Err(PlacementError::input(format!(
                "demand at ({}, {}) is {}, expected a finite non-negative value",
                index / cols, index % cols, value
            )));
        }
        Ok(Self { rows, cols, values })
    }

    pub fn from_rows(grid: Vec<Vec<f64>>) -> PlacementResult<Self> {
        let rows = grid.len();
        let cols = grid.first().map_or(0, Vec::len);
        if let Some(bad) = grid.iter().position(|row| row.len() != cols) {
            return Err(PlacementError::params(format!(
                "row {} has {} columns, expected {}", bad, grid[bad].len(), cols
            )));
        }
        Self::new(rows, cols, grid.into_iter().flatten().collect())
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> PlacementResult<Self> {
        Self::new(rows, cols, vec![value; rows * cols])
    }

    pub fn zeros(rows: usize, cols: usize) -> PlacementResult<Self> {
        Self::filled(rows, cols, 0.0)
    }

    /// Copy of `self` with one cell replaced.
    pub fn with_value(&self, row: usize, col: usize, value: f64) -> PlacementResult<Self> {
        if row >= self.rows || col >= self.cols {
            return Err(PlacementError::params(format!(
                "cell ({}, {}) is outside the {}x{} surface", row, col, self.rows, self.cols
            )));
        }
        let mut values = self.values.clone();
        values[row * self.cols + col] = value;
        Self::new(self.rows, self.cols, values)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn cell_count(&self) -> usize {
        self.values.len()
    }

    /// Panics when the cell is outside the grid, like slice indexing.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows && col < self.cols, "cell ({}, {}) outside {}x{}", row, col, self.rows, self.cols);
        self.values[row * self.cols + col]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Row-major sum of every cell.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// `(row, col, demand)` for every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let cols = self.cols;
        self.values.iter().enumerate().map(move |(i, &v)| (i / cols, i % cols, v))
    }

    pub fn same_shape(&self, other: &DemandSurface) -> bool {
        self.dims() == other.dims()
    }

    /// Element-wise product with a multiplier grid of the same shape.
    pub fn scaled_by(&self, multipliers: &[f64]) -> PlacementResult<Self> {
        if multipliers.len() != self.values.len() {
            return Err(PlacementError::params(format!(
                "multiplier grid has {} cells, surface has {}", multipliers.len(), self.values.len()
            )));
        }
        let values = self.values.iter().zip(multipliers).map(|(d, m)| d * m).collect();
        Self::new(self.rows, self.cols, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_shapes_as_parameters() {
        assert!(matches!(DemandSurface::new(0, 3, vec![]), Err(PlacementError::InvalidParameters(_))));
        assert!(matches!(DemandSurface::new(2, 2, vec![1.0; 3]), Err(PlacementError::InvalidParameters(_))));
        assert!(matches!(
            DemandSurface::from_rows(vec![vec![1.0, 2.0], vec![3.0]]),
            Err(PlacementError::InvalidParameters(_))
        ));
    }

    #[test]
    fn rejects_negative_and_non_finite_values_as_input() {
        for bad in [-0.5, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = DemandSurface::new(1, 2, vec![1.0, bad]);
            assert!(matches!(result, Err(PlacementError::InvalidInput(_))), "accepted {}", bad);
        }
    }

    #[test]
    fn row_major_indexing() {
        let surface = DemandSurface::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(surface.dims(), (2, 3));
        assert_eq!(surface.get(1, 0), 4.0);
        assert_eq!(surface.total(), 21.0);
        assert_eq!(surface.max_value(), 6.0);
        let cells: Vec<_> = surface.cells().take(4).collect();
        assert_eq!(cells[3], (1, 0, 4.0));
    }

    #[test]
    fn deserialization_validates() {
        let ok: DemandSurface = serde_json::from_str(r#"{"rows":1,"cols":2,"values":[0.0,2.5]}"#).unwrap();
        assert_eq!(ok.total(), 2.5);
        let bad = serde_json::from_str::<DemandSurface>(r#"{"rows":1,"cols":2,"values":[0.0,-2.5]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn with_value_revalidates() {
        let surface = DemandSurface::zeros(2, 2).unwrap();
        assert_eq!(surface.with_value(1, 1, 3.0).unwrap().get(1, 1), 3.0);
        assert!(surface.with_value(2, 0, 1.0).is_err());
        assert!(surface.with_value(0, 0, f64::NAN).is_err());
    }
}
