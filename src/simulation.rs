use crate::agent::Agent;
use crate::algorithms::{Cost, Graph, Heuristic, PathForest, SearchEngine, Step, Strategy};
use crate::config::Config;
use crate::error::{SearchError, SimulationError};
use crate::grid::{Grid, NodeId, ParsedMap, Position, Terrain};
use crate::statistics::{Statistics, TimingData};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const MAX_GENERATION_ATTEMPTS: usize = 50;

/// A generated map plus the endpoints every algorithm is compared on.
#[derive(Debug, Clone)]
pub struct EnvironmentSetup {
    pub grid: Grid,
    pub start: NodeId,
    pub goal: NodeId,
    pub seed: u64,
    /// Cheapest route with the whole map known.
    pub optimal_cost: Cost,
}

impl EnvironmentSetup {
    /// Generate a hidden map whose goal is reachable from the start. Start is
    /// placed in the top-left quadrant, the goal in the bottom-right one.
    pub fn generate(config: &Config, seed: Option<u64>) -> Result<Self, SimulationError> {
        let seed = seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let mix = config.terrain_mix();

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let start = Position::new(
                rng.gen_range(0..config.width / 2),
                rng.gen_range(0..config.height / 2),
            );
            let goal = Position::new(
                rng.gen_range(config.width / 2..config.width),
                rng.gen_range(config.height / 2..config.height),
            );
            let mut grid = Grid::random(config.width, config.height, &mix, &mut rng);
            let (Some(start), Some(goal)) = (grid.node_at(start), grid.node_at(goal)) else {
                continue;
            };
            grid.set_terrain(start, Terrain::Street);
            grid.set_terrain(goal, Terrain::Street);

            match Self::from_grid(grid, start, goal, seed) {
                Ok(environment) => {
                    debug!(
                        "Generated environment (seed {}, attempt {}) - Start: {:?}, Goal: {:?}, optimal cost {}",
                        seed,
                        attempt,
                        environment.grid.location(start),
                        environment.grid.location(goal),
                        environment.optimal_cost
                    );
                    return Ok(environment);
                }
                Err(_) => debug!("attempt {} produced a map without a route", attempt),
            }
        }

        Err(SimulationError::NoPath {
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }

    /// Read a text map with `S` and `G` markers. Every cell starts hidden.
    pub fn from_map_file(path: &Path, seed: u64) -> Result<Self, SimulationError> {
        let text = fs::read_to_string(path)?;
        let ParsedMap { mut grid, start, target } = Grid::from_ascii(&text)?;
        let (Some(start), Some(goal)) = (start, target) else {
            return Err(SimulationError::InvalidConfig(format!(
                "map {} needs both an S and a G marker",
                path.display()
            )));
        };
        grid.hide_all();
        info!(
            "Loaded {}x{} map from {}",
            grid.width,
            grid.height,
            path.display()
        );
        Self::from_grid(grid, start, goal, seed)
    }

    /// The map named by `--map-file`, or a generated one.
    pub fn load(config: &Config) -> Result<Self, SimulationError> {
        match &config.map_file {
            Some(path) => Self::from_map_file(path, config.seed.unwrap_or(0)),
            None => Self::generate(config, config.seed),
        }
    }

    /// Wrap an existing map. Its known flags are left as they are.
    pub fn from_grid(grid: Grid, start: NodeId, goal: NodeId, seed: u64) -> Result<Self, SimulationError> {
        let (_, optimal_cost) = grid
            .optimal_cost(start, goal, false)
            .ok_or(SimulationError::NoPath { attempts: 1 })?;
        Ok(EnvironmentSetup {
            grid,
            start,
            goal,
            seed,
            optimal_cost,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AlgorithmResult {
    pub name: String,
    pub statistics: Statistics,
    pub timing_data: TimingData,
    pub success: bool,
    pub final_position: Position,
}

enum Plan {
    /// A known route to the goal and every route tied with it.
    Route { path: Vec<NodeId>, forest: PathForest },
    /// No known route; walk into the most promising fog cell.
    Explore { path: Vec<NodeId> },
    Stuck,
}

struct Planned {
    plan: Plan,
    expansions: usize,
    last_step: Option<Step>,
}

pub struct Simulation {
    pub grid: Grid,
    pub agent: Agent,
    strategy: Strategy,
    config: Config,
    environment: EnvironmentSetup,
}

impl Simulation {
    pub fn new(config: Config) -> Result<Self, SimulationError> {
        let environment = EnvironmentSetup::load(&config)?;
        let strategy = config
            .algorithm
            .strategies()
            .first()
            .copied()
            .unwrap_or(Strategy::AStar);
        Ok(Self::with_environment(config, environment, strategy))
    }

    pub fn with_environment(config: Config, environment: EnvironmentSetup, strategy: Strategy) -> Self {
        let agent = Agent::new(environment.start, config.sight_radius);
        Simulation {
            grid: environment.grid.clone(),
            agent,
            strategy,
            config,
            environment,
        }
    }

    pub fn environment(&self) -> &EnvironmentSetup {
        &self.environment
    }

    /// Run every strategy on the same generated map.
    pub fn run_all_algorithms(config: Config) -> Result<Vec<AlgorithmResult>, SimulationError> {
        let environment = EnvironmentSetup::load(&config)?;

        if !config.quiet {
            println!("Running comparison of {} algorithms...", Strategy::ALL.len());
            println!("Environment seed: {} (for reproducibility)", environment.seed);
            println!(
                "Environment: Grid {}x{}, optimal cost {}",
                environment.grid.width, environment.grid.height, environment.optimal_cost
            );
            println!();
        }

        let mut results = Vec::new();
        for (i, strategy) in Strategy::ALL.into_iter().enumerate() {
            if !config.quiet {
                println!("Running algorithm {} of {}: {}", i + 1, Strategy::ALL.len(), strategy.id());
            }

            let mut algorithm_config = config.clone();
            algorithm_config.no_visualization = true;

            let mut simulation = Simulation::with_environment(algorithm_config, environment.clone(), strategy);
            let (statistics, timing_data) = simulation.run()?;
            let final_position = simulation.grid.location(simulation.agent.position);

            if !config.quiet {
                println!(
                    "Completed: {} - Success: {}, Moves: {}, Cost: {}",
                    strategy.id(),
                    statistics.success,
                    statistics.total_moves,
                    statistics.travel_cost
                );
            }

            results.push(AlgorithmResult {
                name: strategy.id().to_string(),
                success: statistics.success,
                statistics,
                timing_data,
                final_position,
            });
        }

        Ok(results)
    }

    /// Print comparison results in a table
    pub fn print_comparison_results(results: &[AlgorithmResult]) {
        println!("\n=== ALGORITHM COMPARISON RESULTS ===");
        println!();

        println!(
            "{:<10} {:<8} {:<7} {:<7} {:<8} {:<11} {:<9} {:<11} {:<14} {:<11}",
            "Algorithm", "Success", "Moves", "Cost", "Optimal", "Efficiency", "Searches", "Expansions", "Avg Search", "Tied Paths"
        );
        println!("{}", "-".repeat(104));

        for result in results {
            let stats = &result.statistics;
            println!(
                "{:<10} {:<8} {:<7} {:<7} {:<8} {:<11} {:<9} {:<11} {:<14} {:<11}",
                result.name,
                if result.success { "✓" } else { "✗" },
                stats.total_moves,
                stats.travel_cost,
                stats.optimal_cost,
                format!("{:.3}", stats.route_efficiency),
                stats.searches,
                stats.expansions,
                format!("{:.2?}", result.timing_data.average_search_time()),
                stats.alternative_paths
            );
        }
        println!();

        let successful: Vec<&AlgorithmResult> = results.iter().filter(|r| r.success).collect();
        if successful.is_empty() {
            println!("No algorithms successfully reached the goal.");
            return;
        }

        println!("=== PERFORMANCE ANALYSIS ===");
        if let Some(best) = successful.iter().min_by_key(|r| r.statistics.travel_cost) {
            println!("Cheapest travel: {} (cost {})", best.name, best.statistics.travel_cost);
        }
        if let Some(best) = successful.iter().min_by_key(|r| r.statistics.expansions) {
            println!("Fewest expansions: {} ({})", best.name, best.statistics.expansions);
        }
        if let Some(best) = successful
            .iter()
            .min_by_key(|r| r.timing_data.average_search_time())
        {
            println!(
                "Fastest search: {} ({:.2?} avg)",
                best.name,
                best.timing_data.average_search_time()
            );
        }
    }

    pub fn run(&mut self) -> Result<(Statistics, TimingData), SimulationError> {
        let mut stats = Statistics::new(self.environment.optimal_cost);
        let mut timing_data = TimingData::new();
        let goal = self.environment.goal;
        let max_iterations = self.grid.width * self.grid.height * 4;
        let mut iterations = 0;

        self.observe(&mut stats, &mut timing_data);
        if !self.config.no_visualization {
            self.render("Step 0", &[], None);
        }

        while self.agent.position != goal {
            if iterations >= max_iterations {
                warn!("Reached {} planning iterations, giving up", max_iterations);
                break;
            }
            iterations += 1;

            let search_start = Instant::now();
            let planned = self.plan()?;
            timing_data.search_times.push(search_start.elapsed());
            stats.searches += 1;
            stats.expansions += planned.expansions;

            let progress = planned
                .last_step
                .as_ref()
                .map(|step| format!("{} | explored {:.0}%", step, step.progress() * 100.0))
                .unwrap_or_default();

            match planned.plan {
                Plan::Route { path, forest } => {
                    info!(
                        "{}: route with cost {} found, {} tied paths",
                        self.strategy.name(),
                        forest.cost,
                        forest.count
                    );
                    stats.record_forest(&forest);
                    self.follow(&path, &mut stats, &mut timing_data, &progress);
                }
                Plan::Explore { path } => {
                    stats.failed_searches += 1;
                    debug!(
                        "{}: exploring towards fog at {:?}",
                        self.strategy.name(),
                        path.last().map(|&n| self.grid.location(n))
                    );
                    self.follow(&path, &mut stats, &mut timing_data, &progress);
                }
                Plan::Stuck => {
                    stats.failed_searches += 1;
                    warn!(
                        "{}: no route and no fog left at {:?}",
                        self.strategy.name(),
                        self.grid.location(self.agent.position)
                    );
                    break;
                }
            }
        }

        stats.success = self.agent.position == goal;
        stats.calculate_efficiency();

        if !self.config.no_visualization {
            self.clear_screen();
            println!("=== SIMULATION COMPLETE ===");
            if stats.success {
                println!("SUCCESS: Agent reached the goal!");
            } else {
                println!("FAILED: Agent did not reach the goal");
            }
            println!("Average search time: {:.2?}", timing_data.average_search_time());
            self.grid.print_grid(Some(self.agent.position), self.environment.start, goal, &[]);
        }

        Ok((stats, timing_data))
    }

    /// One search from the agent's position with what it knows right now.
    fn plan(&self) -> Result<Planned, SimulationError> {
        let goal = self.environment.goal;
        let position = self.agent.position;
        let mut engine = SearchEngine::new(&self.grid, self.strategy).with_max_paths(self.config.max_paths);
        engine.prepare(position, goal)?;

        if engine.find_shortest_path()? {
            let forest = engine.find_alternative_paths()?;
            let path = forest
                .first()
                .map(<[NodeId]>::to_vec)
                .ok_or(SearchError::Unreachable {
                    from: position,
                    to: goal,
                })?;
            return Ok(Planned {
                plan: Plan::Route { path, forest },
                expansions: engine.explored_count(),
                last_step: engine.take_steps().pop(),
            });
        }

        // Fog cell closest to the goal, entered from its cheapest visited neighbour.
        let goal_position = self.grid.location(goal);
        let border = engine
            .fog()
            .into_iter()
            .filter_map(|fog| {
                let entry = self
                    .grid
                    .neighbors(fog)
                    .into_iter()
                    .filter(|&n| engine.is_visited(n))
                    .min_by_key(|&n| engine.cost(n))?;
                let distance = self.grid.location(fog).manhattan(&goal_position);
                Some((distance, engine.cost(entry), fog, entry))
            })
            .min();

        let plan = match border {
            Some((_, _, fog, entry)) => {
                let mut path = engine.get_path(position, entry)?;
                path.push(fog);
                Plan::Explore { path }
            }
            None => Plan::Stuck,
        };

        Ok(Planned {
            plan,
            expansions: engine.explored_count(),
            last_step: engine.take_steps().pop(),
        })
    }

    /// Walk `path` (starting at the agent's cell), revealing as it goes.
    fn follow(&mut self, path: &[NodeId], stats: &mut Statistics, timing_data: &mut TimingData, progress: &str) {
        for &node in path.iter().skip(1) {
            if !self.grid.node(node).is_some_and(|n| n.terrain.is_passable()) {
                // Walked into fog that turned out to be a mountain.
                self.grid.set_known(node, true);
                debug!("blocked at {:?}, replanning", self.grid.location(node));
                break;
            }
            self.agent.move_to(node);
            stats.total_moves += 1;
            stats.travel_cost = stats.travel_cost.saturating_add(self.grid.intrinsic_cost(node));
            self.observe(stats, timing_data);

            if !self.config.no_visualization {
                let header = format!("Moves: {} | Cost: {} | {}", stats.total_moves, stats.travel_cost, progress);
                self.render(&header, path, Some(&*stats));
            }
        }
    }

    fn observe(&mut self, stats: &mut Statistics, timing_data: &mut TimingData) {
        let observe_start = Instant::now();
        stats.cells_revealed += self.agent.observe(&mut self.grid);
        timing_data.observe_times.push(observe_start.elapsed());
    }

    fn render(&self, header: &str, path: &[NodeId], stats: Option<&Statistics>) {
        self.clear_screen();
        println!("=== FOG PATHFINDING SIMULATION ===");
        println!("Algorithm: {} | {}", self.strategy.name(), header);
        println!(
            "Agent: {:?} | Goal: {:?} | Known cells: {}/{}",
            self.grid.location(self.agent.position),
            self.grid.location(self.environment.goal),
            self.grid.known_count(),
            self.grid.node_count()
        );
        if let Some((min, max)) = self.agent.field_of_view_bounds(&self.grid) {
            println!("View: ({}, {}) to ({}, {})", min.x, min.y, max.x, max.y);
        }
        if let Some(stats) = stats {
            println!(
                "Optimal cost (full map): {} | Searches: {} | Path weight: {:.2}",
                stats.optimal_cost, stats.searches, stats.chosen_path_weight
            );
        }
        self.grid.print_grid(
            Some(self.agent.position),
            self.environment.start,
            self.environment.goal,
            path,
        );
        thread::sleep(Duration::from_millis(self.config.delay_ms));
    }

    /// Clear the terminal screen (only used when visualization is enabled)
    fn clear_screen(&self) {
        print!("\x1B[2J\x1B[1;1H");
    }
}
