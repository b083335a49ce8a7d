use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::constants::{
    DEFAULT_DISASTER_SEVERITY, DEFAULT_GRID_SIZE, DEFAULT_NUM_REACTORS,
    DEFAULT_REACTOR_CAPACITY, DEFAULT_REACTOR_RADIUS,
};
use crate::data::disaster::DisasterType;
use crate::data::zone_map::DemandProfile;
use crate::utils::logging::{self, FileIOType, OperationCategory};

/// Everything needed to rebuild one scenario and its optimization request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub grid_rows: usize,
    pub grid_cols: usize,
    pub num_reactors: usize,
    pub reactor_radius: f64,
    pub reactor_capacity: f64,   // MW, multiplied by the fleet size for reporting
    pub disaster_type: DisasterType,
    pub severity: u8,
    pub demand_profile: Option<DemandProfile>,  // flat +/-20% demand when unset
    pub impact_noise: bool,
    pub seed: Option<u64>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            grid_rows: DEFAULT_GRID_SIZE,
            grid_cols: DEFAULT_GRID_SIZE,
            num_reactors: DEFAULT_NUM_REACTORS,
            reactor_radius: DEFAULT_REACTOR_RADIUS,
            reactor_capacity: DEFAULT_REACTOR_CAPACITY,
            disaster_type: DisasterType::Earthquake,
            severity: DEFAULT_DISASTER_SEVERITY,
            demand_profile: None,
            impact_noise: false,
            seed: None,
        }
    }
}

impl ScenarioConfig {
    pub fn total_capacity(&self) -> f64 {
        self.num_reactors as f64 * self.reactor_capacity
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let _timing = logging::start_timing("load_scenario_config",
            OperationCategory::FileIO { subcategory: FileIOType::ConfigLoad });

        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading scenario config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing scenario config {}", path.display()))?;
        Ok(config)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)
            .with_context(|| format!("writing scenario config {}", path.as_ref().display()))?;
        Ok(())
    }
}
