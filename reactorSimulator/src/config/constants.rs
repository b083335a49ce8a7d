// Grid and Fleet Defaults
pub const DEFAULT_GRID_SIZE: usize = 20;
pub const DEFAULT_NUM_REACTORS: usize = 3;
pub const DEFAULT_REACTOR_RADIUS: f64 = 4.0;        // cells
pub const DEFAULT_REACTOR_CAPACITY: f64 = 15.0;     // MW per reactor, reporting only
pub const DEFAULT_DISASTER_SEVERITY: u8 = 5;

// Coverage Accounting
pub const SIGNIFICANCE_THRESHOLD: f64 = 1.0;        // MW, cells at or below are ignored when grading
pub const REDUNDANCY_DEMAND_THRESHOLD: f64 = 0.1;  // MW, cells counted when measuring overlap
pub const PERCENT: f64 = 100.0;

// Challenge Scoring
pub const LOCATION_MATCH_BONUS: f64 = 10.0;         // per human site matching an optimal site
pub const MAX_CHALLENGE_SCORE: f64 = 100.0;
pub const FALLBACK_CHALLENGE_SCORE: f64 = 50.0;     // used when the optimal placement covers nothing
pub const EXCELLENT_SCORE: f64 = 90.0;
pub const GOOD_SCORE: f64 = 75.0;
pub const FAIR_SCORE: f64 = 50.0;

// Exact Formulation
pub const DISASTER_SCENARIO_WEIGHT: f64 = 2.0;

// Zone Base Demands (MW per cell)
pub const EMPTY_ZONE_DEMAND: f64 = 0.5;
pub const RESIDENTIAL_ZONE_DEMAND: f64 = 3.0;
pub const COMMERCIAL_ZONE_DEMAND: f64 = 6.0;
pub const INDUSTRIAL_ZONE_DEMAND: f64 = 10.0;

// Zone Map Generation
pub const MIN_CLUSTERS_PER_ZONE: usize = 2;
pub const MAX_CLUSTERS_PER_ZONE: usize = 4;
pub const MIN_CLUSTER_SIZE: i64 = 2;
pub const MAX_CLUSTER_SIZE: i64 = 5;
pub const CLUSTER_EDGE_MARGIN: usize = 2;
pub const CLUSTER_FILL_PROBABILITY: f64 = 0.7;
pub const DEMAND_VARIATION_MIN: f64 = 0.8;
pub const DEMAND_VARIATION_MAX: f64 = 1.2;

// Demand Profiles (season and hour of day)
pub const HOURS_PER_DAY: u8 = 24;
pub const HOURLY_DEMAND_MULTIPLIERS: [f64; 24] = [
    0.6, 0.5, 0.4, 0.4, 0.4, 0.5, 0.7, 0.9, 1.0, 1.1, 1.2, 1.3,
    1.4, 1.3, 1.2, 1.1, 1.0, 1.1, 1.3, 1.4, 1.3, 1.1, 0.9, 0.7,
];
pub const SPRING_DEMAND_MULTIPLIER: f64 = 1.0;
pub const SUMMER_DEMAND_MULTIPLIER: f64 = 1.3;     // air conditioning
pub const FALL_DEMAND_MULTIPLIER: f64 = 1.1;
pub const WINTER_DEMAND_MULTIPLIER: f64 = 1.2;     // heating
pub const RESIDENTIAL_PATTERN_MULTIPLIER: f64 = 1.0;
pub const COMMERCIAL_PATTERN_MULTIPLIER: f64 = 1.2;
pub const INDUSTRIAL_PATTERN_MULTIPLIER: f64 = 0.8; // flatter load
pub const PEAK_HOUR_FACTOR: f64 = 1.2;
pub const LOW_HOUR_FACTOR: f64 = 0.6;
pub const PROFILE_VARIATION_MIN: f64 = 0.9;
pub const PROFILE_VARIATION_MAX: f64 = 1.1;

// Disaster Impact
pub const MIN_SEVERITY: u8 = 1;
pub const MAX_SEVERITY: u8 = 10;
pub const EARTHQUAKE_RADIUS_PER_SEVERITY: f64 = 1.5;
pub const EARTHQUAKE_EPICENTER_IMPACT: f64 = 0.2;   // multiplier at the epicentre
pub const EARTHQUAKE_IMPACT_SPREAD: f64 = 0.6;      // added linearly out to the rim
pub const FLOOD_MULTIPLIER: f64 = 0.3;
pub const OUTAGE_MULTIPLIER: f64 = 0.1;             // emergency power only
pub const OUTAGE_SECTOR_PER_SEVERITY: usize = 2;
pub const STORM_BASE_MULTIPLIER: f64 = 0.2;
pub const STORM_MAX_RADIUS: f64 = 12.0;             // cells at severity 10
pub const STORM_MIN_REGIONS: usize = 1;
pub const STORM_MAX_REGIONS: usize = 3;
pub const STORM_REGION_SCALE_MIN: f64 = 0.5;
pub const STORM_REGION_SCALE_MAX: f64 = 1.0;
pub const STORM_FALLOFF: f64 = 0.7;                 // share of the hit lost by the rim

// Impact Noise
pub const IMPACT_NOISE_MEAN: f64 = 1.0;
pub const IMPACT_NOISE_STD_DEV: f64 = 0.1;
pub const IMPACT_NOISE_MIN: f64 = 0.5;
pub const IMPACT_NOISE_MAX: f64 = 1.5;
pub const NOISY_IMPACT_MIN: f64 = 0.05;
pub const NOISY_IMPACT_MAX: f64 = 2.0;

// Recovery
pub const RECOVERY_RATE_PER_HOUR: f64 = 0.1;
pub const RECOVERY_MIN_MULTIPLIER: f64 = 0.1;
pub const RECOVERY_MAX_MULTIPLIER: f64 = 1.0;
