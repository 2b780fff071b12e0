//! Continuous <-> discrete coordinate conversion
//!
//! Joint vectors become integer lattice coordinates, workspace points become
//! obstacle grid cells. Both conversions truncate toward zero and perform no
//! bounds checking; the environment decides what an out-of-grid cell means.

use std::f64::consts::PI;

use crate::common::{GridCell, Point3D, RoboticsError, RoboticsResult};

/// Normalize angle to [-PI, PI]
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    let mut a = angle;
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}

/// Signed shortest rotation taking `from` to `to`, in [-PI, PI]
pub fn shortest_angular_distance(from: f64, to: f64) -> f64 {
    normalize_angle(normalize_angle(to) - normalize_angle(from))
}

#[derive(Debug, Clone)]
pub struct CoordinateDiscretizer {
    joint_resolutions: Vec<f64>,
    grid_origin: Point3D,
    grid_resolution: f64,
}

impl CoordinateDiscretizer {
    pub fn new(joint_resolutions: Vec<f64>, grid_origin: Point3D, grid_resolution: f64) -> RoboticsResult<Self> {
        if let Some(bad) = joint_resolutions.iter().find(|r| !(**r > 0.0)) {
            return Err(RoboticsError::InvalidParameter(format!(
                "joint lattice resolution must be positive, got {}",
                bad
            )));
        }
        if !(grid_resolution > 0.0) {
            return Err(RoboticsError::InvalidParameter(format!(
                "grid resolution must be positive, got {}",
                grid_resolution
            )));
        }
        Ok(Self {
            joint_resolutions,
            grid_origin,
            grid_resolution,
        })
    }

    pub fn num_joints(&self) -> usize {
        self.joint_resolutions.len()
    }

    /// Lattice coordinates of a joint vector: `trunc(angle / resolution)` per joint
    pub fn to_lattice_coords(&self, angles: &[f64]) -> RoboticsResult<Vec<i32>> {
        if angles.len() != self.joint_resolutions.len() {
            return Err(RoboticsError::InvalidParameter(format!(
                "expected {} joint values, got {}",
                self.joint_resolutions.len(),
                angles.len()
            )));
        }
        Ok(angles
            .iter()
            .zip(self.joint_resolutions.iter())
            .map(|(angle, res)| (angle / res) as i32)
            .collect())
    }

    /// Joint values at the lattice points (not the values that produced them)
    pub fn lattice_to_angles(&self, coords: &[i32]) -> Vec<f64> {
        coords
            .iter()
            .zip(self.joint_resolutions.iter())
            .map(|(&c, res)| c as f64 * res)
            .collect()
    }

    /// Grid cell containing `p`, truncated toward zero from the grid origin
    pub fn to_grid_cell(&self, p: &Point3D) -> GridCell {
        GridCell::new(
            ((p.x - self.grid_origin.x) / self.grid_resolution) as i32,
            ((p.y - self.grid_origin.y) / self.grid_resolution) as i32,
            ((p.z - self.grid_origin.z) / self.grid_resolution) as i32,
        )
    }

    /// World position of the corner of `cell` nearest the grid origin
    pub fn grid_cell_to_world(&self, cell: GridCell) -> Point3D {
        Point3D::new(
            self.grid_origin.x + cell.x as f64 * self.grid_resolution,
            self.grid_origin.y + cell.y as f64 * self.grid_resolution,
            self.grid_origin.z + cell.z as f64 * self.grid_resolution,
        )
    }
}
