use crate::algorithms::{Graph, Strategy};
use crate::config::Config;
use crate::error::SimulationError;
use crate::simulation::{AlgorithmResult, EnvironmentSetup, Simulation};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const CSV_HEADER: &str = "simulation_id,algorithm,seed,width,height,success,total_moves,travel_cost,optimal_cost,route_efficiency,searches,failed_searches,expansions,alternative_paths,execution_time_ms,average_observe_time_ns,average_search_time_ns,total_search_calls";

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub simulation_id: usize,
    pub algorithm: String,
    pub seed: u64,
    pub width: usize,
    pub height: usize,
    pub success: bool,
    pub total_moves: usize,
    pub travel_cost: u32,
    pub optimal_cost: u32,
    pub route_efficiency: f64,
    pub searches: usize,
    pub failed_searches: usize,
    pub expansions: usize,
    pub alternative_paths: usize,
    pub execution_time_ms: u64,
    pub average_observe_time_ns: u64,
    pub average_search_time_ns: u64,
    pub total_search_calls: usize,
}

impl BatchResult {
    fn from_algorithm_result(
        result: &AlgorithmResult,
        simulation_id: usize,
        environment: &EnvironmentSetup,
        execution_time: Duration,
    ) -> Self {
        let stats = &result.statistics;
        BatchResult {
            simulation_id,
            algorithm: result.name.clone(),
            seed: environment.seed,
            width: environment.grid.width,
            height: environment.grid.height,
            success: result.success,
            total_moves: stats.total_moves,
            travel_cost: stats.travel_cost,
            optimal_cost: stats.optimal_cost,
            route_efficiency: stats.route_efficiency,
            searches: stats.searches,
            failed_searches: stats.failed_searches,
            expansions: stats.expansions,
            alternative_paths: stats.alternative_paths,
            execution_time_ms: execution_time.as_millis() as u64,
            average_observe_time_ns: result.timing_data.average_observe_time().as_nanos() as u64,
            average_search_time_ns: result.timing_data.average_search_time().as_nanos() as u64,
            total_search_calls: result.timing_data.total_calls(),
        }
    }

    /// A run whose map could not be generated.
    fn failed(simulation_id: usize, strategy: Strategy, seed: u64, config: &Config, execution_time: Duration) -> Self {
        BatchResult {
            simulation_id,
            algorithm: strategy.id().to_string(),
            seed,
            width: config.width,
            height: config.height,
            success: false,
            total_moves: 0,
            travel_cost: 0,
            optimal_cost: 0,
            route_efficiency: 0.0,
            searches: 0,
            failed_searches: 0,
            expansions: 0,
            alternative_paths: 0,
            execution_time_ms: execution_time.as_millis() as u64,
            average_observe_time_ns: 0,
            average_search_time_ns: 0,
            total_search_calls: 0,
        }
    }

    fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{:.6},{},{},{},{},{},{},{},{}",
            self.simulation_id,
            self.algorithm,
            self.seed,
            self.width,
            self.height,
            self.success,
            self.total_moves,
            self.travel_cost,
            self.optimal_cost,
            self.route_efficiency,
            self.searches,
            self.failed_searches,
            self.expansions,
            self.alternative_paths,
            self.execution_time_ms,
            self.average_observe_time_ns,
            self.average_search_time_ns,
            self.total_search_calls
        )
    }
}

pub struct BatchSimulation {
    config: Config,
    /// Rows not yet written to the CSV file.
    pending: Vec<BatchResult>,
    /// Every row of the run, kept for the summary.
    results: Vec<BatchResult>,
    start_time: Instant,
    batch_size: usize,
    total_results_written: usize,
}

impl BatchSimulation {
    pub fn new(config: Config) -> Self {
        BatchSimulation {
            config,
            pending: Vec::new(),
            results: Vec::new(),
            start_time: Instant::now(),
            batch_size: 100,
            total_results_written: 0,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn results(&self) -> &[BatchResult] {
        &self.results
    }

    pub fn run(&mut self) -> Result<(), SimulationError> {
        self.initialize_csv_file()?;
        let strategies = self.config.algorithm.strategies();
        let base_seed = self.config.seed.unwrap_or_else(rand::random);

        if !self.config.quiet {
            println!("=== BATCH SIMULATION STARTED ===");
            println!("Grid size: {}x{}", self.config.width, self.config.height);
            println!(
                "Terrain: {}% mountain, {}% forest, {}% hill, {}% street",
                self.config.mountain_pct, self.config.forest_pct, self.config.hill_pct, self.config.street_pct
            );
            println!("Simulations: {}", self.config.num_simulations);
            println!(
                "Algorithms: {}",
                strategies.iter().map(|s| s.id()).collect::<Vec<_>>().join(", ")
            );
            println!("Base seed: {}", base_seed);
            println!("Output file: {}", self.config.output_file);
            println!();
        }

        let mut run_config = self.config.clone();
        run_config.no_visualization = true;
        run_config.quiet = true;

        let progress_interval = Duration::from_secs(10);
        let mut last_progress_report = Instant::now();

        for simulation_id in 0..self.config.num_simulations {
            let seed = base_seed.wrapping_add(simulation_id as u64);
            let simulation_start = Instant::now();

            match EnvironmentSetup::generate(&run_config, Some(seed)) {
                Ok(environment) => {
                    for &strategy in &strategies {
                        let strategy_start = Instant::now();
                        let mut simulation =
                            Simulation::with_environment(run_config.clone(), environment.clone(), strategy);
                        let (statistics, timing_data) = simulation.run()?;
                        let result = AlgorithmResult {
                            name: strategy.id().to_string(),
                            success: statistics.success,
                            final_position: simulation.grid.location(simulation.agent.position),
                            statistics,
                            timing_data,
                        };
                        self.push(BatchResult::from_algorithm_result(
                            &result,
                            simulation_id,
                            &environment,
                            strategy_start.elapsed(),
                        ));
                    }
                }
                Err(e) => {
                    warn!("Simulation {} (seed {}) skipped: {}", simulation_id, seed, e);
                    for &strategy in &strategies {
                        self.push(BatchResult::failed(
                            simulation_id,
                            strategy,
                            seed,
                            &self.config,
                            simulation_start.elapsed(),
                        ));
                    }
                }
            }

            if self.pending.len() >= self.batch_size {
                self.flush_results_to_csv()?;
            }

            if last_progress_report.elapsed() > progress_interval {
                let done = simulation_id + 1;
                let progress = done as f64 / self.config.num_simulations as f64 * 100.0;
                let elapsed = self.start_time.elapsed();
                let remaining = elapsed
                    .mul_f64(self.config.num_simulations as f64 / done as f64)
                    .saturating_sub(elapsed);
                println!(
                    "Progress: {:.1}% ({}/{}) - Elapsed: {:.1}s - ETA: {:.1}s",
                    progress,
                    done,
                    self.config.num_simulations,
                    elapsed.as_secs_f64(),
                    remaining.as_secs_f64()
                );
                last_progress_report = Instant::now();
            }
        }

        self.flush_results_to_csv()?;

        info!(
            "Batch simulation completed: {} results in {:.1}s -> {}",
            self.results.len(),
            self.start_time.elapsed().as_secs_f64(),
            self.config.output_file
        );
        if !self.config.quiet {
            println!("\n=== BATCH SIMULATION COMPLETED ===");
            println!("Total results collected: {}", self.results.len());
            println!("Results saved to: {}", self.config.output_file);
            println!("Total time: {:.2?}", self.start_time.elapsed());
        }

        Ok(())
    }

    fn push(&mut self, result: BatchResult) {
        self.pending.push(result.clone());
        self.results.push(result);
    }

    fn flush_results_to_csv(&mut self) -> Result<(), SimulationError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.output_file)?;
        for result in &self.pending {
            writeln!(file, "{}", result.csv_row())?;
        }

        self.total_results_written += self.pending.len();
        if !self.config.quiet {
            println!(
                "Flushed {} results to CSV (total: {})",
                self.pending.len(),
                self.total_results_written
            );
        }
        self.pending.clear();
        Ok(())
    }

    fn initialize_csv_file(&self) -> Result<(), SimulationError> {
        let mut file = File::create(&self.config.output_file)?;
        writeln!(file, "{}", CSV_HEADER)?;
        if !self.config.quiet {
            println!("Initialized CSV file: {}", self.config.output_file);
        }
        Ok(())
    }

    pub fn print_summary(&self) {
        if self.results.is_empty() {
            println!("No results to summarize.");
            return;
        }

        println!("\n=== BATCH SIMULATION SUMMARY ===");

        let mut algorithm_groups: BTreeMap<&str, Vec<&BatchResult>> = BTreeMap::new();
        for result in &self.results {
            algorithm_groups.entry(&result.algorithm).or_default().push(result);
        }

        for (algorithm, results) in algorithm_groups {
            println!("\n{} Algorithm Results:", algorithm);
            let successful: Vec<&BatchResult> = results.iter().copied().filter(|r| r.success).collect();
            let total = results.len();
            let success_rate = successful.len() as f64 / total as f64 * 100.0;
            println!("  Success rate: {}/{} ({:.1}%)", successful.len(), total, success_rate);

            if !successful.is_empty() {
                let n = successful.len() as f64;
                let avg_moves = successful.iter().map(|r| r.total_moves as f64).sum::<f64>() / n;
                let avg_efficiency = successful.iter().map(|r| r.route_efficiency).sum::<f64>() / n;
                let avg_expansions = successful.iter().map(|r| r.expansions as f64).sum::<f64>() / n;
                let avg_time = successful.iter().map(|r| r.execution_time_ms as f64).sum::<f64>() / n;

                println!("  Average moves: {:.1}", avg_moves);
                println!("  Average efficiency: {:.3}", avg_efficiency);
                println!("  Average expansions: {:.1}", avg_expansions);
                println!("  Average execution time: {:.1}ms", avg_time);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_batch_writes_one_row_per_run_and_algorithm() {
        let output = std::env::temp_dir().join(format!("fog_batch_{}.csv", std::process::id()));
        let output_file = output.to_string_lossy().to_string();
        let config = Config::parse_from([
            "fog_pathfinding",
            "--batch-mode",
            "--quiet",
            "--width",
            "8",
            "--height",
            "8",
            "--algorithm",
            "all",
            "--num-simulations",
            "3",
            "--seed",
            "11",
            "--output-file",
            output_file.as_str(),
        ]);

        let mut batch = BatchSimulation::new(config).with_batch_size(2);
        batch.run().unwrap();

        let contents = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines.len(), 1 + 3 * Strategy::ALL.len());
        assert_eq!(batch.results().len(), 3 * Strategy::ALL.len());
        assert!(lines[1..]
            .iter()
            .all(|line| line.split(',').count() == CSV_HEADER.split(',').count()));
        assert!(batch.results().iter().all(|r| (r.width, r.height) == (8, 8)));

        std::fs::remove_file(&output).ok();
    }
}
