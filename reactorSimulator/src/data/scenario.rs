use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::config::scenario_config::ScenarioConfig;
use crate::core::placement::{GreedyOptimizer, PlacementOutcome};
use crate::core::scoring::Challenge;
use crate::data::disaster::{simulate_disaster, simulate_noisy_disaster, DisasterOutcome};
use crate::data::zone_map::{HourlyDemand, ZoneMap};
use crate::error::PlacementResult;
use crate::models::surface::DemandSurface;

/// A generated city: zones, its normal demand and one disaster applied to it.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub config: ScenarioConfig,
    pub seed: u64,
    pub zones: ZoneMap,
    pub normal: DemandSurface,
    pub disaster: DisasterOutcome,
}

impl Scenario {
    /// Uses the configured seed, or draws one so the run can be replayed.
    pub fn generate(config: &ScenarioConfig) -> PlacementResult<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::generate_with_seed(config, seed)
    }

    pub fn generate_with_seed(config: &ScenarioConfig, seed: u64) -> PlacementResult<Self> {
        let mut rng = StdRng::seed_from_u64(seed);

        let zones = ZoneMap::generate_clustered(config.grid_rows, config.grid_cols, &mut rng)?;
        let normal = match config.demand_profile {
            Some(profile) => zones.profiled_demand_surface(profile, &mut rng)?,
            None => zones.demand_surface(&mut rng)?,
        };
        let disaster = if config.impact_noise {
            simulate_noisy_disaster(&normal, config.disaster_type, config.severity, &mut rng)?
        } else {
            simulate_disaster(&normal, config.disaster_type, config.severity, &mut rng)?
        };

        info!(
            seed,
            rows = config.grid_rows,
            cols = config.grid_cols,
            normal_demand = normal.total(),
            disaster_demand = disaster.demand.total(),
            "Generated scenario"
        );

        Ok(Self { config: config.clone(), seed, zones, normal, disaster })
    }

    pub fn disaster_demand(&self) -> &DemandSurface {
        &self.disaster.demand
    }

    /// Hourly citywide demand from the configured profile (noon in spring
    /// when none is set). Draws from its own stream seeded off the scenario
    /// seed, so it replays too.
    pub fn demand_series(&self, hours: usize) -> PlacementResult<Vec<HourlyDemand>> {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(1));
        let start = self.config.demand_profile.unwrap_or_default();
        self.zones.demand_series(start, hours, &mut rng)
    }

    pub fn optimize(&self, parallel: bool) -> PlacementResult<PlacementOutcome> {
        GreedyOptimizer::new().parallel(parallel).place(
            &self.normal,
            &self.disaster.demand,
            self.config.num_reactors,
            self.config.reactor_radius,
        )
    }

    pub fn challenge(&self) -> PlacementResult<Challenge<'_>> {
        Challenge::new(&self.normal, &self.disaster.demand, self.config.num_reactors, self.config.reactor_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::disaster::{DisasterEvent, DisasterType};
    use crate::data::zone_map::{DemandProfile, Season};

    fn config(seed: u64) -> ScenarioConfig {
        ScenarioConfig { seed: Some(seed), disaster_type: DisasterType::PowerOutage, ..ScenarioConfig::default() }
    }

    #[test]
    fn seeded_scenarios_replay_exactly() {
        let a = Scenario::generate(&config(42)).unwrap();
        let b = Scenario::generate(&config(42)).unwrap();
        assert_eq!(a.seed, 42);
        assert_eq!(a.zones, b.zones);
        assert_eq!(a.normal, b.normal);
        assert_eq!(a.disaster.demand, b.disaster.demand);
        assert_eq!(a.optimize(false).unwrap().placement, b.optimize(true).unwrap().placement);
    }

    #[test]
    fn unseeded_runs_record_their_seed() {
        let scenario = Scenario::generate(&ScenarioConfig::default()).unwrap();
        let replay = Scenario::generate_with_seed(&scenario.config, scenario.seed).unwrap();
        assert_eq!(scenario.normal, replay.normal);
    }

    #[test]
    fn profiled_noisy_storm_scenarios_replay() {
        let profiled = ScenarioConfig {
            disaster_type: DisasterType::Storm,
            demand_profile: Some(DemandProfile { season: Season::Summer, hour: 3 }),
            impact_noise: true,
            ..config(11)
        };
        let a = Scenario::generate(&profiled).unwrap();
        let b = Scenario::generate(&profiled).unwrap();
        assert_eq!(a.normal, b.normal);
        assert_eq!(a.disaster.impact, b.disaster.impact);
        assert!(matches!(a.disaster.event, DisasterEvent::Storm { .. }));

        // Same zones, but the 3am summer profile reshapes demand.
        let flat = Scenario::generate(&config(11)).unwrap();
        assert_eq!(a.zones, flat.zones);
        assert_ne!(a.normal, flat.normal);
    }

    #[test]
    fn demand_series_replays_and_starts_at_the_profile_hour() {
        let evening = ScenarioConfig { demand_profile: Some(DemandProfile { season: Season::Winter, hour: 20 }), ..config(4) };
        let scenario = Scenario::generate(&evening).unwrap();
        let series = scenario.demand_series(6).unwrap();
        assert_eq!(series.len(), 6);
        assert_eq!(series[0].hour, 20);
        assert_eq!(series[5].hour, 1);
        assert_eq!(series, scenario.demand_series(6).unwrap());
    }

    #[test]
    fn invalid_hour_propagates() {
        let bad = ScenarioConfig { demand_profile: Some(DemandProfile { season: Season::Fall, hour: 24 }), ..config(1) };
        assert!(Scenario::generate(&bad).is_err());
    }

    #[test]
    fn invalid_severity_propagates() {
        let bad = ScenarioConfig { severity: 0, ..config(1) };
        assert!(Scenario::generate(&bad).is_err());
    }

    #[test]
    fn optimizer_places_the_configured_fleet() {
        let scenario = Scenario::generate(&config(7)).unwrap();
        let outcome = scenario.optimize(true).unwrap();
        assert_eq!(outcome.placement.len(), scenario.config.num_reactors);
        let score = scenario.challenge().unwrap().evaluate(&outcome.placement).unwrap();
        assert_eq!(score.location_matches, scenario.config.num_reactors);
    }
}
