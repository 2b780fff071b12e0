//! Common types used throughout arm_lattice

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Identifier of a discrete lattice state
pub type StateId = usize;

/// 3D point representation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0 }
    }

    pub fn distance(&self, other: &Point3D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2)).sqrt()
    }

    pub fn to_point(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }
}

impl From<(f64, f64, f64)> for Point3D {
    fn from(tuple: (f64, f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1, z: tuple.2 }
    }
}

impl From<Point3<f64>> for Point3D {
    fn from(p: Point3<f64>) -> Self {
        Self { x: p.x, y: p.y, z: p.z }
    }
}

/// Cell of the 3D obstacle / heuristic grid.
///
/// Signed so that out-of-grid positions stay representable; callers decide
/// what to do with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridCell {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        GridCell { x, y, z }
    }

    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        GridCell::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Straight-line distance in cells
    pub fn euclidean_distance(&self, other: &GridCell) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        let dz = (self.z - other.z) as f64;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn manhattan_distance(&self, other: &GridCell) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()) as u32
    }
}

/// Joint-space path: one joint vector per waypoint, labelled by joint name
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JointTrajectory {
    pub joint_names: Vec<String>,
    pub points: Vec<Vec<f64>>,
}

impl JointTrajectory {
    pub fn new(joint_names: Vec<String>) -> Self {
        Self { joint_names, points: Vec::new() }
    }

    pub fn from_points(joint_names: Vec<String>, points: Vec<Vec<f64>>) -> Self {
        Self { joint_names, points }
    }

    pub fn push(&mut self, point: Vec<f64>) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Vec<f64>> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Vec<f64>> {
        self.points.last()
    }

    /// Values of one joint over the whole trajectory
    pub fn joint_values(&self, joint: usize) -> Vec<f64> {
        self.points.iter().filter_map(|p| p.get(joint).copied()).collect()
    }

    /// Sum over waypoints of the largest per-joint change
    pub fn total_joint_motion(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.points
            .windows(2)
            .map(|w| {
                w[0].iter()
                    .zip(w[1].iter())
                    .map(|(a, b)| (b - a).abs())
                    .fold(0.0, f64::max)
            })
            .sum()
    }
}

/// Cooperative cancellation flag shared between a search loop and whoever
/// may abort it. Checked between heuristic evaluations, never inside one.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
