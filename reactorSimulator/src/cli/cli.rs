use clap::Parser;

use crate::config::scenario_config::ScenarioConfig;
use crate::core::formulation::ObjectiveKind;
use crate::data::disaster::DisasterType;
use crate::data::zone_map::{DemandProfile, Season};
use crate::models::site::FacilitySite;

/// Scenario options shared by both binaries. Anything left unset falls back
/// to the JSON config (when given) and then to the built-in defaults.
#[derive(clap::Args, Debug, Clone)]
pub struct ScenarioArgs {
    #[arg(long, help = "Load the scenario from a JSON config file")]
    config: Option<String>,

    #[arg(long)]
    rows: Option<usize>,

    #[arg(long)]
    cols: Option<usize>,

    #[arg(short = 'k', long, help = "Number of reactors to place")]
    reactors: Option<usize>,

    #[arg(short, long, help = "Coverage radius in cells")]
    radius: Option<f64>,

    #[arg(long, help = "Capacity per reactor in MW (reporting only)")]
    capacity: Option<f64>,

    #[arg(short, long, help = "earthquake, flood, storm or power_outage")]
    disaster: Option<DisasterType>,

    #[arg(short, long, help = "Disaster severity 1-10")]
    severity: Option<u8>,

    #[arg(long, help = "Shape demand by season: spring, summer, fall or winter")]
    season: Option<Season>,

    #[arg(long, help = "Shape demand by hour of day (0-23)")]
    hour: Option<u8>,

    #[arg(long, default_value_t = false, help = "Add per-cell noise to the disaster impact")]
    impact_noise: bool,

    #[arg(long, help = "Random seed for a reproducible scenario")]
    seed: Option<u64>,
}

impl ScenarioArgs {
    pub fn config_path(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Config file (or defaults) with the command-line overrides applied.
    pub fn scenario_config(&self) -> anyhow::Result<ScenarioConfig> {
        let mut config = match self.config_path() {
            Some(path) => ScenarioConfig::load_json(path)?,
            None => ScenarioConfig::default(),
        };
        if let Some(rows) = self.rows {
            config.grid_rows = rows;
        }
        if let Some(cols) = self.cols {
            config.grid_cols = cols;
        }
        if let Some(reactors) = self.reactors {
            config.num_reactors = reactors;
        }
        if let Some(radius) = self.radius {
            config.reactor_radius = radius;
        }
        if let Some(capacity) = self.capacity {
            config.reactor_capacity = capacity;
        }
        if let Some(disaster) = self.disaster {
            config.disaster_type = disaster;
        }
        if let Some(severity) = self.severity {
            config.severity = severity;
        }
        if self.season.is_some() || self.hour.is_some() {
            let mut profile = config.demand_profile.unwrap_or_default();
            if let Some(season) = self.season {
                profile.season = season;
            }
            if let Some(hour) = self.hour {
                profile.hour = hour;
            }
            profile.validate()?;
            config.demand_profile = Some(profile);
        }
        if self.impact_noise {
            config.impact_noise = true;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

#[derive(Parser)]
#[command(author, version, about = "Reactor placement simulator", long_about = None)]
pub struct Args {
    #[command(flatten)]
    scenario: ScenarioArgs,

    #[arg(short, long, default_value_t = false, help = "Scan candidate sites on all cores")]
    parallel: bool,

    #[arg(long, default_value_t = false)]
    enable_timing: bool,

    #[arg(long, default_value_t = false)]
    debug_logging: bool,

    #[arg(long, default_value_t = false)]
    enable_csv_export: bool,

    #[arg(short, long, default_value = "output")]
    output_dir: String,

    #[arg(long, help = "Write the exact coverage program in CPLEX LP format")]
    lp_output: Option<String>,

    #[arg(long, default_value = "minimize_uncovered_demand")]
    objective: ObjectiveKind,

    #[arg(long, default_value_t = false, help = "Compare the default fleet strategies")]
    compare_strategies: bool,

    #[arg(long, help = "Print coverage for 0..=N reactors")]
    curve: Option<usize>,

    #[arg(long, help = "Print total demand for N hours from the profile's hour")]
    demand_hours: Option<usize>,

    #[arg(long, help = "Run N seeded scenarios and summarize coverage")]
    batch: Option<usize>,

    #[arg(long, default_value_t = false, help = "Print the disaster map with reactors")]
    render: bool,

    #[arg(long, help = "Save the effective scenario config as JSON")]
    save_config: Option<String>,
}

// Add getter methods for all fields
impl Args {
    pub fn scenario(&self) -> &ScenarioArgs {
        &self.scenario
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    pub fn enable_timing(&self) -> bool {
        self.enable_timing
    }

    pub fn debug_logging(&self) -> bool {
        self.debug_logging
    }

    pub fn enable_csv_export(&self) -> bool {
        self.enable_csv_export
    }

    pub fn output_dir(&self) -> &str {
        &self.output_dir
    }

    pub fn lp_output(&self) -> Option<&str> {
        self.lp_output.as_deref()
    }

    pub fn objective(&self) -> ObjectiveKind {
        self.objective
    }

    pub fn compare_strategies(&self) -> bool {
        self.compare_strategies
    }

    pub fn curve(&self) -> Option<usize> {
        self.curve
    }

    pub fn demand_hours(&self) -> Option<usize> {
        self.demand_hours
    }

    pub fn batch(&self) -> Option<usize> {
        self.batch
    }

    pub fn render(&self) -> bool {
        self.render
    }

    pub fn save_config(&self) -> Option<&str> {
        self.save_config.as_deref()
    }
}

#[derive(Parser)]
#[command(author, version, about = "Place reactors yourself and score against the optimizer", long_about = None)]
pub struct ChallengeArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,

    #[arg(long = "site", value_name = "ROW,COL", help = "A reactor site; repeat once per reactor")]
    sites: Vec<FacilitySite>,

    #[arg(long, default_value_t = false, help = "Show the demand maps before scoring")]
    show_map: bool,

    #[arg(long, default_value_t = false)]
    debug_logging: bool,
}

impl ChallengeArgs {
    pub fn scenario(&self) -> &ScenarioArgs {
        &self.scenario
    }

    pub fn sites(&self) -> &[FacilitySite] {
        &self.sites
    }

    pub fn show_map(&self) -> bool {
        self.show_map
    }

    pub fn debug_logging(&self) -> bool {
        self.debug_logging
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let args = Args::try_parse_from([
            "reactorgrid", "-k", "5", "--radius", "2.5", "--disaster", "power_outage", "--seed", "9",
            "--objective", "resilience",
        ])
        .unwrap();
        let config = args.scenario().scenario_config().unwrap();
        assert_eq!(config.num_reactors, 5);
        assert_eq!(config.reactor_radius, 2.5);
        assert_eq!(config.disaster_type, DisasterType::PowerOutage);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.grid_rows, ScenarioConfig::default().grid_rows);
        assert_eq!(args.objective(), ObjectiveKind::DisasterResilience);
        assert!(!args.parallel());
    }

    #[test]
    fn season_and_hour_build_a_profile() {
        let args = Args::try_parse_from(["reactorgrid", "--hour", "20", "--disaster", "storm", "--impact-noise"]).unwrap();
        let config = args.scenario().scenario_config().unwrap();
        assert_eq!(config.demand_profile, Some(DemandProfile { season: Season::Spring, hour: 20 }));
        assert_eq!(config.disaster_type, DisasterType::Storm);
        assert!(config.impact_noise);

        let plain = Args::try_parse_from(["reactorgrid"]).unwrap();
        assert_eq!(plain.scenario().scenario_config().unwrap().demand_profile, None);

        let late = Args::try_parse_from(["reactorgrid", "--season", "winter", "--hour", "25"]).unwrap();
        assert!(late.scenario().scenario_config().is_err());
    }

    #[test]
    fn challenge_sites_repeat() {
        let args = ChallengeArgs::try_parse_from(["challenge", "--site", "1,2", "--site", "(3, 4)", "--seed", "1"])
            .unwrap();
        assert_eq!(args.sites(), &[FacilitySite::new(1, 2), FacilitySite::new(3, 4)]);
        assert!(ChallengeArgs::try_parse_from(["challenge", "--site", "1;2"]).is_err());
    }
}
