use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A facility location on the demand grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FacilitySite {
    pub row: usize,
    pub col: usize,
}

/// Ordered list of sites, in the order they were chosen.
pub type Placement = Vec<FacilitySite>;

/// Inclusive Euclidean coverage rule shared by every coverage computation.
pub fn within_radius(squared_distance: usize, radius: f64) -> bool {
    (squared_distance as f64).sqrt() <= radius
}

impl FacilitySite {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn squared_distance_to(&self, row: usize, col: usize) -> usize {
        let dr = self.row.abs_diff(row);
        let dc = self.col.abs_diff(col);
        dr * dr + dc * dc
    }

    pub fn distance_to(&self, row: usize, col: usize) -> f64 {
        (self.squared_distance_to(row, col) as f64).sqrt()
    }

    pub fn covers(&self, row: usize, col: usize, radius: f64) -> bool {
        within_radius(self.squared_distance_to(row, col), radius)
    }

    pub fn is_within(&self, rows: usize, cols: usize) -> bool {
        self.row < rows && self.col < cols
    }
}

impl fmt::Display for FacilitySite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for FacilitySite {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

// Accepts "row,col" with optional surrounding parentheses and spaces.
impl FromStr for FacilitySite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let (row, col) = trimmed
            .split_once(',')
            .ok_or_else(|| format!("expected ROW,COL but got '{}'", s))?;
        let row = row.trim().parse::<usize>().map_err(|e| format!("bad row in '{}': {}", s, e))?;
        let col = col.trim().parse::<usize>().map_err(|e| format!("bad column in '{}': {}", s, e))?;
        Ok(Self::new(row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_rule_is_inclusive() {
        let site = FacilitySite::new(2, 2);
        assert!(site.covers(2, 4, 2.0));
        assert!(site.covers(3, 3, 1.5));
        assert!(!site.covers(3, 3, 1.4));
        assert!(!site.covers(2, 5, 2.0));
    }

    #[test]
    fn zero_radius_covers_only_itself() {
        let site = FacilitySite::new(1, 1);
        assert!(site.covers(1, 1, 0.0));
        assert!(!site.covers(1, 2, 0.0));
        assert!(!site.covers(0, 1, 0.0));
    }

    #[test]
    fn parses_cli_forms() {
        assert_eq!("3,4".parse::<FacilitySite>(), Ok(FacilitySite::new(3, 4)));
        assert_eq!(" (10, 0) ".parse::<FacilitySite>(), Ok(FacilitySite::new(10, 0)));
        assert!("3".parse::<FacilitySite>().is_err());
        assert!("-1,2".parse::<FacilitySite>().is_err());
    }
}
