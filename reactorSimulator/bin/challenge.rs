use anyhow::{bail, Result};
use clap::Parser;

use reactorgrid::analysis::grid_render::{legend, render_surface};
use reactorgrid::analysis::reporting;
use reactorgrid::cli::cli::ChallengeArgs;
use reactorgrid::data::scenario::Scenario;
use reactorgrid::utils::logging;

fn main() -> Result<()> {
    let args = ChallengeArgs::parse();

    logging::init_logging(false, args.debug_logging())?;

    let config = args.scenario().scenario_config()?;
    if config.seed.is_none() {
        println!("No --seed given; the scenario will differ from run to run.");
    }

    let scenario = Scenario::generate(&config)?;
    println!("Reactor Placement Challenge (seed {})", scenario.seed);
    println!("Place {} reactors with radius {} on a {}x{} grid.",
        config.num_reactors, config.reactor_radius, config.grid_rows, config.grid_cols);
    reporting::print_disaster_summary(&scenario.disaster, scenario.normal.total());

    if args.show_map() {
        println!("\nNormal Demand Map");
        println!("{}", render_surface(&scenario.normal, args.sites(), None));
        println!("\nDisaster Demand Map");
        println!("{}", render_surface(scenario.disaster_demand(), args.sites(), None));
        println!("{}", legend(scenario.normal.max_value()));
    }

    if args.sites().is_empty() {
        bail!("no sites given; pass --site ROW,COL once per reactor");
    }

    let challenge = scenario.challenge()?;
    let result = challenge.evaluate(args.sites())?;
    reporting::print_challenge_result(&result);

    Ok(())
}
