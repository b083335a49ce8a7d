//! Plain-text maps of demand surfaces. Each cell takes two characters: a
//! shade for its demand relative to the surface maximum and an overlay mark
//! (`*` when covered). Reactor cells print as `R` followed by their number
//! when there are at most nine reactors.

use crate::models::coverage_map::CoverageMap;
use crate::models::site::FacilitySite;
use crate::models::surface::DemandSurface;

const SHADES: &[char] = &[' ', '.', ':', '-', '=', '+', '#', '%', '@'];
const COVERED_MARK: char = '*';
const MAX_NUMBERED_REACTORS: usize = 9;

pub fn shade_for(value: f64, max: f64) -> char {
    if max <= 0.0 {
        return SHADES[0];
    }
    let level = (value / max * (SHADES.len() - 1) as f64).round() as usize;
    SHADES[level.min(SHADES.len() - 1)]
}

fn reactor_label(sites: &[FacilitySite], row: usize, col: usize) -> Option<char> {
    let index = sites.iter().position(|site| site.row == row && site.col == col)?;
    if sites.len() <= MAX_NUMBERED_REACTORS {
        char::from_digit(index as u32 + 1, 10)
    } else {
        Some(' ')
    }
}

pub fn render_surface(surface: &DemandSurface, sites: &[FacilitySite], coverage: Option<&CoverageMap>) -> String {
    let max = surface.max_value();
    let mut out = String::with_capacity(surface.rows() * (surface.cols() * 2 + 3));

    out.push('+');
    out.push_str(&"-".repeat(surface.cols() * 2));
    out.push_str("+\n");

    for row in 0..surface.rows() {
        out.push('|');
        for col in 0..surface.cols() {
            if let Some(label) = reactor_label(sites, row, col) {
                out.push('R');
                out.push(label);
                continue;
            }
            out.push(shade_for(surface.get(row, col), max));
            let covered = coverage.map_or(false, |map| map.is_covered(row, col));
            out.push(if covered { COVERED_MARK } else { ' ' });
        }
        out.push_str("|\n");
    }

    out.push('+');
    out.push_str(&"-".repeat(surface.cols() * 2));
    out.push('+');
    out
}

pub fn legend(max: f64) -> String {
    format!(
        "Shades '{}' -> '{}' span 0 to {:.1} MW; '{}' marks covered cells; R1-R9 are reactors",
        SHADES[1], SHADES[SHADES.len() - 1], max, COVERED_MARK
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shades_scale_to_the_maximum() {
        assert_eq!(shade_for(0.0, 10.0), ' ');
        assert_eq!(shade_for(10.0, 10.0), '@');
        assert_eq!(shade_for(5.0, 0.0), ' ');
    }

    #[test]
    fn renders_reactors_and_coverage() {
        let surface = DemandSurface::from_rows(vec![vec![0.0, 8.0, 0.0], vec![0.0, 0.0, 8.0]]).unwrap();
        let sites = vec![FacilitySite::new(0, 1)];
        let coverage = CoverageMap::from_sites(&sites, 2, 3, 1.0);
        let text = render_surface(&surface, &sites, Some(&coverage));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "+------+");
        assert_eq!(lines[1], "| *R1 *|");
        assert_eq!(lines[2], "|   *@ |");
    }

    #[test]
    fn large_fleets_are_unnumbered() {
        let surface = DemandSurface::filled(1, 10, 1.0).unwrap();
        let sites: Vec<FacilitySite> = (0..10).map(|col| FacilitySite::new(0, col)).collect();
        let text = render_surface(&surface, &sites, None);
        assert_eq!(text.lines().nth(1), Some("|R R R R R R R R R R |"));
    }
}
