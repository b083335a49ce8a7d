// Main module declarations for the reactor placement simulator

pub mod error;

// Placement engine and everything that scores its output
pub mod core {
    pub mod placement;
    pub mod scoring;
    pub mod formulation;
    pub mod strategy_comparison;
    pub mod batch;
}

// Configuration modules
pub mod config {
    pub mod constants;
    pub mod scenario_config;
}

// Model definitions
pub mod models {
    pub mod surface;
    pub mod site;
    pub mod coverage_map;
    pub mod metrics;
}

// Demand and disaster surface providers
pub mod data {
    pub mod zone_map;
    pub mod disaster;
    pub mod scenario;
}

// Console presentation
pub mod analysis {
    pub mod reporting;
    pub mod grid_render;
}

// Utility functions
pub mod utils {
    pub mod disc;
    pub mod logging;
    pub mod csv_export;
}

// CLI interface
pub mod cli {
    pub mod cli;
}

// Re-export commonly used items
pub use crate::core::placement::{place_facilities, GreedyOptimizer, PlacementOutcome};
pub use crate::core::scoring::{score_placement, Challenge, ChallengeScore};
pub use crate::error::{PlacementError, PlacementResult};
pub use crate::models::metrics::CoverageMetrics;
pub use crate::models::site::FacilitySite;
pub use crate::models::surface::DemandSurface;
