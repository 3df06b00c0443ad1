use clap::Parser;

use fog_pathfinding::batch_simulation::BatchSimulation;
use fog_pathfinding::config::{AlgorithmChoice, Config};
use fog_pathfinding::error::SimulationError;
use fog_pathfinding::simulation::Simulation;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    let config = Config::parse();

    let default_level = if config.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Err(e) = run(config) {
        error!("{}", e);
        eprintln!("Simulation failed: {}", e);
        std::process::exit(1);
    }
}

fn run(config: Config) -> Result<(), SimulationError> {
    config.validate()?;

    println!("Starting fog-of-war pathfinding simulation...");
    match &config.map_file {
        Some(path) => println!("Map file: {}", path.display()),
        None => println!("Grid size: {}x{}", config.width, config.height),
    }
    println!(
        "Terrain: {}% mountain, {}% forest, {}% hill, {}% street",
        config.mountain_pct, config.forest_pct, config.hill_pct, config.street_pct
    );
    println!("Sight radius: {}", config.sight_radius);
    println!("Algorithm: {:?}", config.algorithm);

    if config.no_visualization || config.batch_mode {
        println!("Visualization disabled - running in fast mode");
    } else {
        println!("Visualization enabled with {}ms delay", config.delay_ms);
        println!("Press Ctrl+C to stop the simulation");
    }
    println!();

    if !config.no_visualization && !config.batch_mode {
        std::thread::sleep(Duration::from_millis(1000));
    }

    if config.batch_mode {
        let mut batch_sim = BatchSimulation::new(config.clone());
        batch_sim.run()?;
        if !config.quiet {
            batch_sim.print_summary();
        }
        return Ok(());
    }

    if config.algorithm == AlgorithmChoice::All {
        let results = Simulation::run_all_algorithms(config)?;
        Simulation::print_comparison_results(&results);
        return Ok(());
    }

    let mut simulation = Simulation::new(config)?;
    let (stats, timing_data) = simulation.run()?;

    println!("\n=== FINAL RESULTS ===");
    println!("{}", stats);

    println!("\n=== TIMING ANALYSIS ===");
    println!("Total search calls: {}", timing_data.total_calls());
    println!("Average search time: {:.2?}", timing_data.average_search_time());
    println!("Average observe time: {:.2?}", timing_data.average_observe_time());
    if timing_data.total_calls() > 0 {
        let total_search_time: Duration = timing_data.search_times.iter().sum();
        println!("Total time in search: {:.2?}", total_search_time);
        let extra_cost = stats.travel_cost.saturating_sub(stats.optimal_cost);
        println!("Extra cost due to limited vision: {}", extra_cost);
    }

    Ok(())
}
