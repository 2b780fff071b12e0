//! Breadth-first search over the 3D obstacle grid
//!
//! Computes, for every free cell, the number of cell moves to the goal cell.
//! The result is the heuristic field queried by the lattice search; it is
//! computed once per planning request and read-only afterwards.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use itertools::iproduct;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::common::{GridCell, RoboticsError, RoboticsResult};
use crate::mapping::ObstacleGrid;
use crate::utils::Grid3D;

/// Distance of a cell the search never reached
pub const INFINITE_DISTANCE: u32 = u32::MAX;

/// Neighbourhood used by the BFS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// Face neighbours only
    Six,
    /// Face, edge and corner neighbours
    TwentySix,
}

impl Default for Connectivity {
    fn default() -> Self {
        Connectivity::Six
    }
}

impl Connectivity {
    pub fn offsets(&self) -> Vec<(i32, i32, i32)> {
        match self {
            Connectivity::Six => vec![
                (1, 0, 0),
                (-1, 0, 0),
                (0, 1, 0),
                (0, -1, 0),
                (0, 0, 1),
                (0, 0, -1),
            ],
            Connectivity::TwentySix => iproduct!(-1..=1, -1..=1, -1..=1)
                .filter(|&d| d != (0, 0, 0))
                .collect(),
        }
    }
}

/// Per-cell integer distance to the goal cell
#[derive(Debug, Clone)]
pub struct HeuristicField {
    distances: Grid3D<u32>,
    reached: usize,
    run_time: Duration,
}

impl HeuristicField {
    /// Single-source BFS from `goal` over the free cells of `grid`.
    ///
    /// The goal is seeded even when its own cell is occupied so that a goal
    /// pose grazing an obstacle still yields a usable field.
    pub fn compute(grid: &ObstacleGrid, goal: GridCell, connectivity: Connectivity) -> RoboticsResult<Self> {
        if !grid.contains(goal) {
            return Err(RoboticsError::InvalidParameter(format!(
                "BFS goal cell {:?} outside grid {:?}",
                goal,
                grid.dims()
            )));
        }

        let start = Instant::now();
        let (nx, ny, nz) = grid.dims();
        let mut distances = Grid3D::new(nx, ny, nz, INFINITE_DISTANCE)
            .map_err(|e| RoboticsError::InvalidParameter(e.to_string()))?;
        let offsets = connectivity.offsets();

        let mut queue = VecDeque::new();
        distances.set(goal, 0);
        queue.push_back(goal);
        let mut reached = 1;

        while let Some(cell) = queue.pop_front() {
            let next = distances[cell] + 1;
            for &(dx, dy, dz) in &offsets {
                let neighbor = cell.offset(dx, dy, dz);
                if grid.is_occupied(neighbor) || distances[neighbor] != INFINITE_DISTANCE {
                    continue;
                }
                distances.set(neighbor, next);
                queue.push_back(neighbor);
                reached += 1;
            }
        }

        let run_time = start.elapsed();
        debug!(
            "[BFS3D] goal=({},{},{}) reached {}/{} cells in {:?}",
            goal.x,
            goal.y,
            goal.z,
            reached,
            grid.num_cells(),
            run_time
        );

        Ok(Self {
            distances,
            reached,
            run_time,
        })
    }

    /// Cell moves from `cell` to the goal, `INFINITE_DISTANCE` if unreachable or off-grid
    pub fn distance(&self, cell: GridCell) -> u32 {
        self.distances.get(cell).copied().unwrap_or(INFINITE_DISTANCE)
    }

    pub fn is_reachable(&self, cell: GridCell) -> bool {
        self.distance(cell) != INFINITE_DISTANCE
    }

    pub fn reached_cells(&self) -> usize {
        self.reached
    }

    pub fn run_time(&self) -> Duration {
        self.run_time
    }
}
