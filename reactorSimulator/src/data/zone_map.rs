use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::constants::{
    CLUSTER_EDGE_MARGIN, CLUSTER_FILL_PROBABILITY, COMMERCIAL_PATTERN_MULTIPLIER, COMMERCIAL_ZONE_DEMAND,
    DEMAND_VARIATION_MAX, DEMAND_VARIATION_MIN, EMPTY_ZONE_DEMAND, FALL_DEMAND_MULTIPLIER,
    HOURLY_DEMAND_MULTIPLIERS, HOURS_PER_DAY, INDUSTRIAL_PATTERN_MULTIPLIER, INDUSTRIAL_ZONE_DEMAND,
    LOW_HOUR_FACTOR, MAX_CLUSTERS_PER_ZONE, MAX_CLUSTER_SIZE, MIN_CLUSTERS_PER_ZONE, MIN_CLUSTER_SIZE,
    PEAK_HOUR_FACTOR, PROFILE_VARIATION_MAX, PROFILE_VARIATION_MIN, RESIDENTIAL_PATTERN_MULTIPLIER,
    RESIDENTIAL_ZONE_DEMAND, SPRING_DEMAND_MULTIPLIER, SUMMER_DEMAND_MULTIPLIER, WINTER_DEMAND_MULTIPLIER,
};
use crate::error::{PlacementError, PlacementResult};
use crate::models::surface::DemandSurface;
use crate::utils::logging::{self, GenerationType, OperationCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneType {
    Empty,
    Residential,
    Commercial,
    Industrial,
}

impl ZoneType {
    pub const ALL: [ZoneType; 4] = [
        ZoneType::Empty,
        ZoneType::Residential,
        ZoneType::Commercial,
        ZoneType::Industrial,
    ];

    /// MW per cell before random variation.
    pub fn base_demand(&self) -> f64 {
        match self {
            ZoneType::Empty => EMPTY_ZONE_DEMAND,
            ZoneType::Residential => RESIDENTIAL_ZONE_DEMAND,
            ZoneType::Commercial => COMMERCIAL_ZONE_DEMAND,
            ZoneType::Industrial => INDUSTRIAL_ZONE_DEMAND,
        }
    }

    /// Load shape over the day relative to the citywide hourly curve.
    /// Empty land has none and follows the curve as is.
    pub fn hourly_factor(&self, hour: u8) -> f64 {
        let pattern = match self {
            ZoneType::Empty => return 1.0,
            ZoneType::Residential => &RESIDENTIAL_HOURS,
            ZoneType::Commercial => &COMMERCIAL_HOURS,
            ZoneType::Industrial => &INDUSTRIAL_HOURS,
        };
        if pattern.peak.contains(&hour) {
            pattern.multiplier * PEAK_HOUR_FACTOR
        } else if pattern.low.contains(&hour) {
            pattern.multiplier * LOW_HOUR_FACTOR
        } else {
            pattern.multiplier
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            ZoneType::Empty => '.',
            ZoneType::Residential => 'r',
            ZoneType::Commercial => 'c',
            ZoneType::Industrial => 'i',
        }
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ZoneType::Empty => "Empty",
            ZoneType::Residential => "Residential",
            ZoneType::Commercial => "Commercial",
            ZoneType::Industrial => "Industrial",
        };
        f.write_str(name)
    }
}

struct HourPattern {
    multiplier: f64,
    peak: &'static [u8],
    low: &'static [u8],
}

static RESIDENTIAL_HOURS: HourPattern = HourPattern {
    multiplier: RESIDENTIAL_PATTERN_MULTIPLIER,
    peak: &[7, 8, 18, 19, 20],
    low: &[2, 3, 4, 5],
};

static COMMERCIAL_HOURS: HourPattern = HourPattern {
    multiplier: COMMERCIAL_PATTERN_MULTIPLIER,
    peak: &[9, 10, 11, 12, 13, 14, 15, 16],
    low: &[22, 23, 0, 1, 2, 3, 4, 5, 6],
};

static INDUSTRIAL_HOURS: HourPattern = HourPattern {
    multiplier: INDUSTRIAL_PATTERN_MULTIPLIER,
    peak: &[8, 9, 10, 11, 12, 13, 14, 15, 16, 17],
    low: &[0, 1, 2, 3, 4, 5, 6],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    pub fn demand_multiplier(&self) -> f64 {
        match self {
            Season::Spring => SPRING_DEMAND_MULTIPLIER,
            Season::Summer => SUMMER_DEMAND_MULTIPLIER,
            Season::Fall => FALL_DEMAND_MULTIPLIER,
            Season::Winter => WINTER_DEMAND_MULTIPLIER,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
            Season::Winter => "winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" | "autumn" => Ok(Season::Fall),
            "winter" => Ok(Season::Winter),
            other => Err(format!("unknown season '{}'", other)),
        }
    }
}

/// Season and hour of day used to shape zone demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandProfile {
    pub season: Season,
    pub hour: u8,
}

impl Default for DemandProfile {
    fn default() -> Self {
        Self { season: Season::Spring, hour: 12 }
    }
}

impl DemandProfile {
    pub fn new(season: Season, hour: u8) -> PlacementResult<Self> {
        let profile = Self { season, hour };
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> PlacementResult<()> {
        if self.hour >= HOURS_PER_DAY {
            return Err(PlacementError::params(format!(
                "hour must be below {}, got {}", HOURS_PER_DAY, self.hour
            )));
        }
        Ok(())
    }

    pub fn hour_multiplier(&self) -> f64 {
        HOURLY_DEMAND_MULTIPLIERS[usize::from(self.hour % HOURS_PER_DAY)]
    }

    /// Same season, `hours` later on the clock.
    pub fn advanced(&self, hours: usize) -> Self {
        let hour = (usize::from(self.hour) + hours) % usize::from(HOURS_PER_DAY);
        Self { season: self.season, hour: hour as u8 }
    }

    fn cell_multiplier(&self, zone: ZoneType) -> f64 {
        self.season.demand_multiplier() * self.hour_multiplier() * zone.hourly_factor(self.hour)
    }
}

/// Citywide demand at one step of an hourly series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyDemand {
    pub offset: usize,
    pub hour: u8,
    pub total_demand: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneStatistics {
    pub zone: ZoneType,
    pub cells: usize,
    pub total_demand: f64,
    pub avg_demand: f64,
    pub max_demand: f64,
}

/// Land-use layout of the grid, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneMap {
    rows: usize,
    cols: usize,
    zones: Vec<ZoneType>,
}

// Cluster centres keep a margin from the edge when the grid is big enough.
fn cluster_centre<R: Rng + ?Sized>(dim: usize, rng: &mut R) -> usize {
    if dim > 2 * CLUSTER_EDGE_MARGIN {
        rng.gen_range(CLUSTER_EDGE_MARGIN..=dim - 1 - CLUSTER_EDGE_MARGIN)
    } else {
        rng.gen_range(0..dim)
    }
}

impl ZoneMap {
    pub fn from_zones(rows: usize, cols: usize, zones: Vec<ZoneType>) -> PlacementResult<Self> {
        if rows == 0 || cols == 0 || zones.len() != rows * cols {
            return Err(PlacementError::params(format!(
                "zone map of {}x{} needs {} zones, got {}", rows, cols, rows * cols, zones.len()
            )));
        }
        Ok(Self { rows, cols, zones })
    }

    pub fn empty(rows: usize, cols: usize) -> PlacementResult<Self> {
        Self::from_zones(rows, cols, vec![ZoneType::Empty; rows * cols])
    }

    /// Random clustered layout: a few blobs of each non-empty zone type,
    /// later types painted over earlier ones.
    pub fn generate_clustered<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> PlacementResult<Self> {
        let _timing = logging::start_timing("generate_zone_map",
            OperationCategory::Generation { subcategory: GenerationType::Zones });

        let mut map = Self::empty(rows, cols)?;

        for zone in [ZoneType::Residential, ZoneType::Commercial, ZoneType::Industrial] {
            let clusters = rng.gen_range(MIN_CLUSTERS_PER_ZONE..=MAX_CLUSTERS_PER_ZONE);
            for _ in 0..clusters {
                let centre_row = cluster_centre(rows, rng) as i64;
                let centre_col = cluster_centre(cols, rng) as i64;
                let size = rng.gen_range(MIN_CLUSTER_SIZE..=MAX_CLUSTER_SIZE);
                let low = (-size).div_euclid(2);
                let high = size.div_euclid(2);

                for dr in low..=high {
                    for dc in low..=high {
                        let (r, c) = (centre_row + dr, centre_col + dc);
                        if r < 0 || c < 0 || r >= rows as i64 || c >= cols as i64 {
                            continue;
                        }
                        if rng.gen::<f64>() < CLUSTER_FILL_PROBABILITY {
                            map.set(r as usize, c as usize, zone);
                        }
                    }
                }
            }
            debug!(%zone, clusters, cells = map.count(zone), "painted zone clusters");
        }

        Ok(map)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> ZoneType {
        self.zones[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, zone: ZoneType) {
        self.zones[row * self.cols + col] = zone;
    }

    /// Paints the half-open rectangle `[row_start, row_end) x [col_start, col_end)`,
    /// clipped to the grid.
    pub fn fill_rect(&mut self, row_start: usize, row_end: usize, col_start: usize, col_end: usize, zone: ZoneType) {
        for row in row_start..row_end.min(self.rows) {
            for col in col_start..col_end.min(self.cols) {
                self.set(row, col, zone);
            }
        }
    }

    pub fn count(&self, zone: ZoneType) -> usize {
        self.zones.iter().filter(|&&z| z == zone).count()
    }

    /// Base demand per cell with +/-20% uniform variation.
    pub fn demand_surface<R: Rng + ?Sized>(&self, rng: &mut R) -> PlacementResult<DemandSurface> {
        let values = self
            .zones
            .iter()
            .map(|zone| zone.base_demand() * rng.gen_range(DEMAND_VARIATION_MIN..DEMAND_VARIATION_MAX))
            .collect();
        DemandSurface::new(self.rows, self.cols, values)
    }

    /// Demand shaped by season, hour and each zone's daily pattern, with
    /// +/-10% uniform variation.
    pub fn profiled_demand_surface<R: Rng + ?Sized>(
        &self,
        profile: DemandProfile,
        rng: &mut R,
    ) -> PlacementResult<DemandSurface> {
        profile.validate()?;
        let values = self
            .zones
            .iter()
            .map(|&zone| {
                zone.base_demand()
                    * profile.cell_multiplier(zone)
                    * rng.gen_range(PROFILE_VARIATION_MIN..PROFILE_VARIATION_MAX)
            })
            .collect();
        DemandSurface::new(self.rows, self.cols, values)
    }

    /// Total demand for `hours` consecutive hours starting at `start`,
    /// wrapping past midnight. Each hour draws fresh variation.
    pub fn demand_series<R: Rng + ?Sized>(
        &self,
        start: DemandProfile,
        hours: usize,
        rng: &mut R,
    ) -> PlacementResult<Vec<HourlyDemand>> {
        let _timing = logging::start_timing("demand_series",
            OperationCategory::Generation { subcategory: GenerationType::Demand });

        (0..hours)
            .map(|offset| {
                let profile = start.advanced(offset);
                let surface = self.profiled_demand_surface(profile, rng)?;
                Ok(HourlyDemand { offset, hour: profile.hour, total_demand: surface.total() })
            })
            .collect()
    }

    pub fn statistics(&self, surface: &DemandSurface) -> PlacementResult<Vec<ZoneStatistics>> {
        if surface.dims() != (self.rows, self.cols) {
            return Err(PlacementError::params(format!(
                "surface is {}x{} but zone map is {}x{}", surface.rows(), surface.cols(), self.rows, self.cols
            )));
        }
        Ok(ZoneType::ALL
            .iter()
            .map(|&zone| {
                let (cells, total_demand, max_demand) = self
                    .zones
                    .iter()
                    .zip(surface.values())
                    .filter(|(z, _)| **z == zone)
                    .fold((0, 0.0, 0.0_f64), |(n, sum, max), (_, &d)| (n + 1, sum + d, max.max(d)));
                let avg_demand = if cells > 0 { total_demand / cells as f64 } else { 0.0 };
                ZoneStatistics { zone, cells, total_demand, avg_demand, max_demand }
            })
            .collect())
    }
}
