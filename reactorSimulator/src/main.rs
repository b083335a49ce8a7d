use anyhow::Result;
use clap::Parser;

use reactorgrid::analysis::grid_render::{legend, render_surface};
use reactorgrid::analysis::reporting;
use reactorgrid::cli::cli::Args;
use reactorgrid::config::scenario_config::ScenarioConfig;
use reactorgrid::core::batch::run_batch;
use reactorgrid::core::formulation::CoverageProgram;
use reactorgrid::core::scoring::build_report;
use reactorgrid::core::strategy_comparison::{compare_strategies, coverage_curve, default_strategies};
use reactorgrid::data::scenario::Scenario;
use reactorgrid::utils::csv_export::CsvExporter;
use reactorgrid::utils::logging;

fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_logging(args.enable_timing(), args.debug_logging())?;

    let config = args.scenario().scenario_config()?;
    if let Some(path) = args.save_config() {
        config.save_json(path)?;
        println!("Scenario config saved to {}", path);
    }

    println!("Reactor Placement Simulator");
    println!("Grid: {}x{}, reactors: {}, radius: {}, disaster: {} (severity {})",
        config.grid_rows, config.grid_cols, config.num_reactors, config.reactor_radius,
        config.disaster_type, config.severity);
    if let Some(profile) = config.demand_profile {
        println!("Demand profile: {} at {:02}:00", profile.season, profile.hour);
    }

    let exporter = if args.enable_csv_export() {
        Some(CsvExporter::new(args.output_dir(), args.debug_logging())?)
    } else {
        None
    };

    if let Some(runs) = args.batch() {
        run_batch_mode(&config, runs, exporter.as_ref())?;
    } else {
        run_single_scenario(&args, &config, exporter.as_ref())?;
    }

    if let Some(exporter) = &exporter {
        println!("\nCSV files written to {}", exporter.output_dir().display());
    }

    if logging::is_timing_enabled() {
        logging::print_timing_report();
    }

    Ok(())
}

fn run_batch_mode(config: &ScenarioConfig, runs: usize, exporter: Option<&CsvExporter>) -> Result<()> {
    let base_seed = config.seed.unwrap_or_else(rand::random);
    println!("Running {} scenarios from seed {}", runs, base_seed);

    let summary = run_batch(config, runs, base_seed)?;
    reporting::print_batch_summary(&summary);

    if let Some(exporter) = exporter {
        exporter.export_batch(&summary)?;
    }
    Ok(())
}

fn run_single_scenario(args: &Args, config: &ScenarioConfig, exporter: Option<&CsvExporter>) -> Result<()> {
    let scenario = Scenario::generate(config)?;
    println!("Seed: {}", scenario.seed);

    let zone_stats = scenario.zones.statistics(&scenario.normal)?;
    reporting::print_zone_statistics(&zone_stats);

    let series = match args.demand_hours() {
        Some(hours) => {
            let series = scenario.demand_series(hours)?;
            reporting::print_demand_series(&series, config.total_capacity());
            Some(series)
        }
        None => None,
    };
    reporting::print_disaster_summary(&scenario.disaster, scenario.normal.total());

    let outcome = scenario.optimize(args.parallel())?;
    if outcome.fallback_rounds() > 0 {
        println!("Note: {} reactor(s) fell back to (0, 0) after all reachable demand was covered",
            outcome.fallback_rounds());
    }

    let report = build_report(&outcome, &scenario.normal, config.reactor_radius, config.reactor_capacity);
    reporting::print_placement_results(&report);
    reporting::print_final_results(&report);

    if args.render() {
        let disaster = scenario.disaster_demand();
        println!("\nDisaster Demand Map");
        println!("{}", render_surface(disaster, &report.placement, outcome.coverage.as_ref()));
        println!("{}", legend(disaster.max_value()));
    }

    let strategies = if args.compare_strategies() {
        let outcomes = compare_strategies(&scenario.normal, scenario.disaster_demand(), &default_strategies())?;
        reporting::print_strategy_table(&outcomes);
        Some(outcomes)
    } else {
        None
    };

    let curve = match args.curve() {
        Some(k_max) => {
            let curve = coverage_curve(&scenario.normal, scenario.disaster_demand(), k_max, config.reactor_radius)?;
            reporting::print_coverage_curve(&curve);
            Some(curve)
        }
        None => None,
    };

    if let Some(path) = args.lp_output() {
        let program = CoverageProgram::build(
            &scenario.normal,
            scenario.disaster_demand(),
            config.num_reactors,
            config.reactor_radius,
            args.objective(),
        )?;
        program.write_lp(path)?;
        reporting::print_program_summary(&program);
        println!("Greedy placement objective: {:.2}", program.objective_value(&report.placement));
        println!("LP written to {}", path);
    }

    if let Some(exporter) = exporter {
        exporter.export_surface("normal", &scenario.normal)?;
        exporter.export_surface("disaster", scenario.disaster_demand())?;
        exporter.export_impact(&scenario.disaster.impact)?;
        exporter.export_zone_statistics(&zone_stats)?;
        if let Some(series) = &series {
            exporter.export_demand_series(series)?;
        }
        exporter.export_placement(&report)?;
        if let Some(coverage) = &outcome.coverage {
            exporter.export_coverage(coverage)?;
        }
        if let Some(outcomes) = &strategies {
            exporter.export_strategies(outcomes)?;
        }
        if let Some(curve) = &curve {
            exporter.export_coverage_curve(curve)?;
        }
    }

    Ok(())
}
