use crate::algorithms::Strategy;
use crate::error::SimulationError;
use crate::grid::TerrainMix;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmChoice {
    #[value(name = "a_star")]
    AStar,
    #[value(name = "dijkstra")]
    Dijkstra,
    #[value(name = "all")]
    All,
}

impl AlgorithmChoice {
    pub fn strategies(self) -> Vec<Strategy> {
        match self {
            AlgorithmChoice::AStar => vec![Strategy::AStar],
            AlgorithmChoice::Dijkstra => vec![Strategy::Dijkstra],
            AlgorithmChoice::All => Strategy::ALL.to_vec(),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Fog-of-war pathfinding simulation", long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 20)]
    pub width: usize,

    #[arg(long, default_value_t = 20)]
    pub height: usize,

    #[arg(long, value_enum, default_value_t = AlgorithmChoice::AStar)]
    pub algorithm: AlgorithmChoice,

    /// How far the explorer sees around itself.
    #[arg(long, default_value_t = 2)]
    pub sight_radius: usize,

    #[arg(long, default_value_t = 15)]
    pub mountain_pct: u8,

    #[arg(long, default_value_t = 15)]
    pub forest_pct: u8,

    #[arg(long, default_value_t = 10)]
    pub hill_pct: u8,

    #[arg(long, default_value_t = 20)]
    pub street_pct: u8,

    /// Seed for map generation; random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Upper bound on tied paths collected per search.
    #[arg(long, default_value_t = 64)]
    pub max_paths: usize,

    #[arg(long, default_value_t = 50)]
    pub delay_ms: u64,

    #[arg(long, default_value_t = false)]
    pub no_visualization: bool,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,

    /// Debug-level logging of every expansion.
    #[arg(long, default_value_t = false)]
    pub verbose: bool,

    #[arg(long, default_value_t = false)]
    pub batch_mode: bool,

    #[arg(long, default_value_t = 100)]
    pub num_simulations: usize,

    #[arg(long, default_value = "results.csv")]
    pub output_file: String,

    /// Text map to run on instead of a generated one; needs `S` and `G`.
    #[arg(long)]
    pub map_file: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.width < 2 || self.height < 2 {
            return Err(SimulationError::InvalidConfig(format!(
                "map must be at least 2x2, got {}x{}",
                self.width, self.height
            )));
        }
        let total = u32::from(self.mountain_pct)
            + u32::from(self.forest_pct)
            + u32::from(self.hill_pct)
            + u32::from(self.street_pct);
        if total > 100 {
            return Err(SimulationError::InvalidConfig(format!(
                "terrain percentages add up to {}%",
                total
            )));
        }
        if self.batch_mode && self.num_simulations == 0 {
            return Err(SimulationError::InvalidConfig(
                "batch mode needs at least one simulation".to_string(),
            ));
        }
        if self.batch_mode && self.map_file.is_some() {
            return Err(SimulationError::InvalidConfig(
                "batch mode generates its maps and cannot use --map-file".to_string(),
            ));
        }
        Ok(())
    }

    pub fn terrain_mix(&self) -> TerrainMix {
        TerrainMix {
            street: self.street_pct,
            forest: self.forest_pct,
            hill: self.hill_pct,
            mountain: self.mountain_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::parse_from(["fog_pathfinding"]);
        assert!(config.validate().is_ok());
        assert_eq!(config.algorithm, AlgorithmChoice::AStar);
        assert_eq!(config.terrain_mix().mountain, 15);
    }

    #[test]
    fn test_algorithm_names_match_cli() {
        let config = Config::parse_from(["fog_pathfinding", "--algorithm", "all"]);
        assert_eq!(config.algorithm.strategies(), Strategy::ALL.to_vec());
        let config = Config::parse_from(["fog_pathfinding", "--algorithm", "dijkstra"]);
        assert_eq!(config.algorithm.strategies(), vec![Strategy::Dijkstra]);
    }

    #[test]
    fn test_validate_rejects_overfull_terrain_mix() {
        let config = Config::parse_from(["fog_pathfinding", "--mountain-pct", "60", "--forest-pct", "50"]);
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidConfig(_))
        ));
        let config = Config::parse_from(["fog_pathfinding", "--width", "1"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_map_file_in_batch_mode() {
        let config = Config::parse_from(["fog_pathfinding", "--map-file", "maze.txt"]);
        assert!(config.validate().is_ok());
        let config = Config::parse_from(["fog_pathfinding", "--batch-mode", "--map-file", "maze.txt"]);
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidConfig(_))
        ));
    }
}
