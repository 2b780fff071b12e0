//! Per-request planning diagnostics

use std::time::Duration;

use log::info;

/// Timings and counters gathered while setting up and post-processing one
/// planning request. Purely informational.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanningStatistics {
    pub total_setup_time: Duration,
    pub obstacle_grid_setup_time: Duration,
    pub heuristic_setup_time: Duration,
    /// BFS run time alone
    pub heuristic_run_time: Duration,
    /// Occupied fraction of the obstacle grid in [0, 1]
    pub percent_occupied: f64,
    pub num_collision_checks: usize,
    pub total_collision_check_time: Duration,
    pub shortcutting_time: Duration,
    pub num_states: usize,
}

impl PlanningStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_summary(&self) {
        info!(
            "[ArmLattice] setup {:?} (grid {:?}, heuristic {:?}, bfs {:?}), {:.2}% occupied",
            self.total_setup_time,
            self.obstacle_grid_setup_time,
            self.heuristic_setup_time,
            self.heuristic_run_time,
            self.percent_occupied * 100.0
        );
        info!(
            "[ArmLattice] {} states, {} collision checks in {:?}, shortcutting {:?}",
            self.num_states, self.num_collision_checks, self.total_collision_check_time, self.shortcutting_time
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zeroed() {
        let stats = PlanningStatistics::new();
        assert_eq!(stats.num_collision_checks, 0);
        assert_eq!(stats.shortcutting_time, Duration::default());
        stats.log_summary();
    }
}
