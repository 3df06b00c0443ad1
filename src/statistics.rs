use crate::algorithms::{Cost, PathForest};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Statistics {
    pub total_moves: usize,
    pub travel_cost: Cost,
    /// Cheapest route with the whole map known.
    pub optimal_cost: Cost,
    pub searches: usize,
    pub failed_searches: usize,
    pub expansions: usize,
    pub cells_revealed: usize,
    pub alternative_paths: usize,
    pub min_path_len: usize,
    pub max_path_len: usize,
    /// Where the followed path sits between the shortest (0.0) and the
    /// longest (1.0) tied path of the last route.
    pub chosen_path_weight: f64,
    pub route_efficiency: f64,
    pub success: bool,
}

impl Statistics {
    pub fn new(optimal_cost: Cost) -> Self {
        Statistics {
            total_moves: 0,
            travel_cost: 0,
            optimal_cost,
            searches: 0,
            failed_searches: 0,
            expansions: 0,
            cells_revealed: 0,
            alternative_paths: 0,
            min_path_len: 0,
            max_path_len: 0,
            chosen_path_weight: 0.0,
            route_efficiency: 0.0,
            success: false,
        }
    }

    pub fn record_forest(&mut self, forest: &PathForest) {
        self.alternative_paths = forest.count;
        self.min_path_len = forest.min_len;
        self.max_path_len = forest.max_len;
        self.chosen_path_weight = forest.length_weight(0).unwrap_or(0.0);
    }

    pub fn calculate_efficiency(&mut self) {
        if self.travel_cost > 0 && self.optimal_cost > 0 {
            self.route_efficiency = f64::from(self.travel_cost) / f64::from(self.optimal_cost);
        } else {
            self.route_efficiency = 0.0;
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reached Goal: {}", if self.success { "yes" } else { "no" })?;
        writeln!(f, "Total Moves: {}", self.total_moves)?;
        writeln!(f, "Travel Cost: {}", self.travel_cost)?;
        writeln!(f, "Optimal Cost (full map): {}", self.optimal_cost)?;
        writeln!(f, "Searches: {} ({} without a route)", self.searches, self.failed_searches)?;
        writeln!(f, "Node Expansions: {}", self.expansions)?;
        writeln!(f, "Cells Revealed: {}", self.cells_revealed)?;
        writeln!(
            f,
            "Tied Final Paths: {} ({} to {} cells long)",
            self.alternative_paths, self.min_path_len, self.max_path_len
        )?;
        writeln!(f, "Chosen Path Length Weight: {:.2}", self.chosen_path_weight)?;
        writeln!(f, "Route Efficiency: {:.3}", self.route_efficiency)?;

        if self.route_efficiency > 0.0 {
            let efficiency_percentage = (100.0 / self.route_efficiency).min(100.0);
            writeln!(f, "Efficiency Percentage: {:.1}%", efficiency_percentage)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimingData {
    pub observe_times: Vec<Duration>,
    pub search_times: Vec<Duration>,
}

impl TimingData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn average_observe_time(&self) -> Duration {
        average(&self.observe_times)
    }

    pub fn average_search_time(&self) -> Duration {
        average(&self.search_times)
    }

    pub fn total_calls(&self) -> usize {
        self.search_times.len()
    }
}

fn average(times: &[Duration]) -> Duration {
    if times.is_empty() {
        Duration::from_nanos(0)
    } else {
        let total: Duration = times.iter().sum();
        total / times.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_efficiency_is_cost_ratio() {
        let mut stats = Statistics::new(8);
        stats.travel_cost = 12;
        stats.calculate_efficiency();
        assert!((stats.route_efficiency - 1.5).abs() < f64::EPSILON);

        let mut empty = Statistics::new(0);
        empty.calculate_efficiency();
        assert_eq!(empty.route_efficiency, 0.0);
    }

    #[test]
    fn test_record_forest_weighs_the_followed_path() {
        let forest = PathForest {
            paths: vec![vec![0, 3, 4, 5, 2], vec![0, 1, 2]],
            cost: 4,
            min_len: 3,
            max_len: 5,
            count: 2,
            truncated: false,
        };
        let mut stats = Statistics::new(4);
        stats.record_forest(&forest);
        assert_eq!(stats.alternative_paths, 2);
        assert_eq!((stats.min_path_len, stats.max_path_len), (3, 5));
        assert_eq!(stats.chosen_path_weight, 1.0);
        assert!(stats.to_string().contains("Chosen Path Length Weight: 1.00"));
    }

    #[test]
    fn test_timing_averages() {
        let mut timing = TimingData::new();
        assert_eq!(timing.average_search_time(), Duration::from_nanos(0));
        timing.search_times.push(Duration::from_millis(2));
        timing.search_times.push(Duration::from_millis(4));
        assert_eq!(timing.average_search_time(), Duration::from_millis(3));
        assert_eq!(timing.total_calls(), 2);
    }
}
