use crate::core::batch::BatchSummary;
use crate::core::formulation::CoverageProgram;
use crate::core::scoring::ChallengeScore;
use crate::core::strategy_comparison::{best_strategy, StrategyOutcome};
use crate::data::disaster::DisasterOutcome;
use crate::data::zone_map::{HourlyDemand, ZoneStatistics};
use crate::models::metrics::{CoverageMetrics, PlacementReport};
use crate::models::site::FacilitySite;

fn format_sites(sites: &[FacilitySite]) -> String {
    sites.iter().map(|site| site.to_string()).collect::<Vec<_>>().join(", ")
}

pub fn print_zone_statistics(stats: &[ZoneStatistics]) {
    println!("\nZone Statistics");
    println!("----------------------------------------");
    for entry in stats {
        println!("{:<12} {:>4} cells  {:>8.1} MW  avg {:>6.2}  max {:>6.2}",
            entry.zone, entry.cells, entry.total_demand, entry.avg_demand, entry.max_demand);
    }
}

pub fn print_demand_series(series: &[HourlyDemand], total_capacity: f64) {
    println!("\nDemand Over Time");
    println!("----------------------------------------");
    for step in series {
        let marker = if step.total_demand > total_capacity { "  over capacity" } else { "" };
        println!("  +{:>2}h ({:02}:00) {:>9.1} MW{}", step.offset, step.hour, step.total_demand, marker);
    }
    if let Some(peak) = series.iter().max_by(|a, b| a.total_demand.total_cmp(&b.total_demand)) {
        println!("Peak: {:.1} MW at {:02}:00 (fleet capacity {:.1} MW)", peak.total_demand, peak.hour, total_capacity);
    }
}

pub fn print_disaster_summary(outcome: &DisasterOutcome, normal_total: f64) {
    println!("\nDisaster Scenario");
    println!("----------------------------------------");
    println!("{}", outcome.description());
    println!("Severity: {}/10", outcome.severity);
    println!("Affected cells: {}", outcome.impact.affected_cells());
    println!("Demand: {:.1} MW -> {:.1} MW ({:+.1}%)",
        normal_total, outcome.demand.total(), outcome.demand_change_pct);
}

pub fn print_placement_results(report: &PlacementReport) {
    println!("\nOptimal Reactor Placement");
    println!("----------------------------------------");
    for (i, site) in report.placement.iter().enumerate() {
        println!("  Reactor {}: {}", i + 1, site);
    }
    print_coverage(&report.metrics);
}

fn print_coverage(metrics: &CoverageMetrics) {
    println!("Coverage:");
    println!("  Normal: {:.1}%", metrics.normal_coverage_pct);
    println!("  Disaster: {:.1}%", metrics.disaster_coverage_pct);
}

pub fn print_final_results(report: &PlacementReport) {
    println!("\nFinal Results");
    println!("----------------------------------------");
    println!("Reactors: {}", report.num_reactors);
    println!("Total Capacity: {:.0} MW", report.total_capacity_mw);
    println!("Coverage Efficiency: {:.1}%", report.efficiency);
    println!("Redundancy: {:.2} sites per significant cell", report.redundancy);
}

pub fn print_challenge_result(result: &ChallengeScore) {
    println!("\nChallenge Result");
    println!("----------------------------------------");
    println!("Your placement:    {}", format_sites(&result.user_placement));
    println!("Optimal placement: {}", format_sites(&result.optimal_placement));
    println!("Your coverage:");
    println!("  Normal: {:.1}%  Disaster: {:.1}%",
        result.user_metrics.normal_coverage_pct, result.user_metrics.disaster_coverage_pct);
    println!("Optimal coverage:");
    println!("  Normal: {:.1}%  Disaster: {:.1}%",
        result.optimal_metrics.normal_coverage_pct, result.optimal_metrics.disaster_coverage_pct);
    println!("Matching locations: {}", result.location_matches);
    println!("Score: {:.1}/100  {}", result.score, result.rating);
}

pub fn print_strategy_table(outcomes: &[StrategyOutcome]) {
    println!("\nStrategy Comparison");
    println!("----------------------------------------");
    println!("{:<24} {:>9} {:>9} {:>11}", "Strategy", "Normal", "Disaster", "Efficiency");
    for outcome in outcomes {
        println!("{:<24} {:>8.1}% {:>8.1}% {:>10.1}%",
            outcome.strategy.label(),
            outcome.metrics.normal_coverage_pct,
            outcome.metrics.disaster_coverage_pct,
            outcome.efficiency);
    }
    if let Some(best) = best_strategy(outcomes) {
        println!("Best: {} ({:.1}% efficiency)", best.strategy.label(), best.efficiency);
    }
}

pub fn print_coverage_curve(curve: &[(usize, CoverageMetrics)]) {
    println!("\nCoverage by Fleet Size");
    println!("----------------------------------------");
    for (k, metrics) in curve {
        println!("{:>3} reactors: normal {:>5.1}%  disaster {:>5.1}%",
            k, metrics.normal_coverage_pct, metrics.disaster_coverage_pct);
    }
}

pub fn print_batch_summary(summary: &BatchSummary) {
    println!("\nBatch Summary ({} runs)", summary.runs.len());
    println!("----------------------------------------");
    println!("Normal coverage:   mean {:.1}%  min {:.1}%  max {:.1}%",
        summary.normal.mean, summary.normal.min, summary.normal.max);
    println!("Disaster coverage: mean {:.1}%  min {:.1}%  max {:.1}%",
        summary.disaster.mean, summary.disaster.min, summary.disaster.max);
    let degenerate = summary.runs.iter().filter(|run| run.fallback_rounds > 0).count();
    if degenerate > 0 {
        println!("Runs with fallback placements: {}", degenerate);
    }
}

pub fn print_program_summary(program: &CoverageProgram) {
    println!("\nCoverage Program ({})", program.objective().as_str());
    println!("----------------------------------------");
    println!("Facility variables: {}", program.facility_variable_count());
    println!("Coverage variables: {}", program.coverage_variable_count());
    println!("Facility limit: {}", program.max_facilities());
}
