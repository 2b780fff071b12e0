//! Lattice planning parameters
//!
//! Loaded once per planning request, typically from YAML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{RoboticsError, RoboticsResult};
use crate::mapping::GridParams;
use crate::path_planning::Connectivity;

/// Per-joint discretization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointParams {
    pub name: String,
    /// Lattice step [rad]
    pub lattice_resolution: f64,
    /// Unbounded revolute joint; distances wrap through +-PI
    #[serde(default)]
    pub continuous: bool,
    /// Overrides the global interpolation distance for this joint [rad]
    #[serde(default)]
    pub interpolation_delta: Option<f64>,
}

impl JointParams {
    pub fn new(name: &str, lattice_resolution: f64) -> Self {
        Self {
            name: name.to_string(),
            lattice_resolution,
            continuous: false,
            interpolation_delta: None,
        }
    }

    pub fn continuous(mut self) -> Self {
        self.continuous = true;
        self
    }

    pub fn with_interpolation_delta(mut self, delta: f64) -> Self {
        self.interpolation_delta = Some(delta);
        self
    }
}

/// Fixed joint-space delta applied during expansion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveParams {
    pub name: String,
    pub delta: Vec<f64>,
}

/// What to do with an end-effector cell that falls outside the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellBoundsPolicy {
    /// Fail setup for start/goal, drop the successor during expansion
    Reject,
    /// Use the nearest in-grid cell
    Clamp,
}

impl Default for CellBoundsPolicy {
    fn default() -> Self {
        CellBoundsPolicy::Reject
    }
}

/// Configuration of the lattice environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeParams {
    pub joints: Vec<JointParams>,
    /// Default interpolation step for motion checking [rad]
    pub interpolation_distance: f64,
    pub grid: GridParams,
    /// Heuristic cost of one BFS cell move
    pub cost_per_cell: u32,
    /// Heuristic cost of one meter in Euclidean mode
    pub cost_per_meter: f64,
    /// Edge cost of applying one motion primitive
    pub cost_per_action: u32,
    /// BFS heuristic; Euclidean distance when false
    pub use_bfs: bool,
    pub bfs_connectivity: Connectivity,
    /// Add the snap-to-goal primitive for joint-space goals
    pub use_joint_snap: bool,
    pub joint_snap_threshold: f64,
    /// Add +-1 lattice step per joint
    pub use_standard_primitives: bool,
    pub primitives: Vec<PrimitiveParams>,
    pub bounds_policy: CellBoundsPolicy,
    /// Shortcut the extracted trajectory
    pub shortcut_path: bool,
    /// Keep interpolated samples of shortcut spans
    pub interpolate_path: bool,
}

impl Default for LatticeParams {
    fn default() -> Self {
        Self {
            joints: Vec::new(),
            interpolation_distance: 0.05,
            grid: GridParams::default(),
            cost_per_cell: 100,
            cost_per_meter: 2000.0,
            cost_per_action: 100,
            use_bfs: true,
            bfs_connectivity: Connectivity::Six,
            use_joint_snap: true,
            joint_snap_threshold: 0.2,
            use_standard_primitives: true,
            primitives: Vec::new(),
            bounds_policy: CellBoundsPolicy::Reject,
            shortcut_path: true,
            interpolate_path: true,
        }
    }
}

impl LatticeParams {
    /// Default parameters for the named joints, all sharing one lattice resolution
    pub fn for_joints(names: &[&str], lattice_resolution: f64) -> Self {
        Self {
            joints: names.iter().map(|n| JointParams::new(n, lattice_resolution)).collect(),
            ..Default::default()
        }
    }

    pub fn num_joints(&self) -> usize {
        self.joints.len()
    }

    pub fn joint_names(&self) -> Vec<String> {
        self.joints.iter().map(|j| j.name.clone()).collect()
    }

    pub fn lattice_resolutions(&self) -> Vec<f64> {
        self.joints.iter().map(|j| j.lattice_resolution).collect()
    }

    pub fn continuous_joints(&self) -> Vec<bool> {
        self.joints.iter().map(|j| j.continuous).collect()
    }

    /// Effective interpolation step of every joint
    pub fn interpolation_deltas(&self) -> Vec<f64> {
        self.joints
            .iter()
            .map(|j| j.interpolation_delta.unwrap_or(self.interpolation_distance))
            .collect()
    }

    pub fn validate(&self) -> RoboticsResult<()> {
        if self.joints.is_empty() {
            return Err(RoboticsError::InvalidParameter("no joints configured".to_string()));
        }
        for joint in &self.joints {
            if !(joint.lattice_resolution > 0.0) {
                return Err(RoboticsError::InvalidParameter(format!(
                    "joint '{}' lattice resolution must be positive",
                    joint.name
                )));
            }
        }
        if let Some(bad) = self.interpolation_deltas().iter().find(|d| !(**d > 0.0)) {
            return Err(RoboticsError::InvalidParameter(format!(
                "interpolation distance must be positive, got {}",
                bad
            )));
        }
        if !(self.cost_per_meter >= 0.0) {
            return Err(RoboticsError::InvalidParameter("cost_per_meter must be non-negative".to_string()));
        }
        if !(self.joint_snap_threshold >= 0.0) {
            return Err(RoboticsError::InvalidParameter("joint_snap_threshold must be non-negative".to_string()));
        }
        if let Some(p) = self.primitives.iter().find(|p| p.delta.len() != self.joints.len()) {
            return Err(RoboticsError::InvalidParameter(format!(
                "primitive '{}' has {} deltas for {} joints",
                p.name,
                p.delta.len(),
                self.joints.len()
            )));
        }
        self.grid.validate()
    }

    /// Load parameters from a YAML file
    pub fn from_yaml_file(path: &Path) -> RoboticsResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load parameters from a YAML string
    pub fn from_yaml(yaml: &str) -> RoboticsResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| RoboticsError::Config(e.to_string()))
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> RoboticsResult<String> {
        serde_yaml::to_string(self).map_err(|e| RoboticsError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_need_joints() {
        assert!(LatticeParams::default().validate().is_err());
        assert!(LatticeParams::for_joints(&["shoulder", "elbow"], 0.1).validate().is_ok());
    }

    #[test]
    fn test_interpolation_override() {
        let mut params = LatticeParams::for_joints(&["a", "b"], 0.1);
        params.interpolation_distance = 0.1;
        params.joints[1] = JointParams::new("b", 0.1).with_interpolation_delta(0.02);
        assert_eq!(params.interpolation_deltas(), vec![0.1, 0.02]);
    }

    #[test]
    fn test_primitive_length_checked() {
        let mut params = LatticeParams::for_joints(&["a", "b"], 0.1);
        params.primitives.push(PrimitiveParams {
            name: "bad".to_string(),
            delta: vec![0.1],
        });
        assert!(matches!(params.validate(), Err(RoboticsError::InvalidParameter(_))));
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
joints:
  - name: shoulder
    lattice_resolution: 0.1
  - name: wrist
    lattice_resolution: 0.2
    continuous: true
interpolation_distance: 0.02
grid:
  cells_x: 10
  cells_y: 10
  cells_z: 10
  resolution: 0.1
  origin: { x: 0.0, y: 0.0, z: 0.0 }
bfs_connectivity: twenty_six
bounds_policy: clamp
use_bfs: false
"#;
        let params = LatticeParams::from_yaml(yaml).unwrap();
        assert_eq!(params.num_joints(), 2);
        assert_eq!(params.continuous_joints(), vec![false, true]);
        assert_eq!(params.bfs_connectivity, Connectivity::TwentySix);
        assert_eq!(params.bounds_policy, CellBoundsPolicy::Clamp);
        assert!(!params.use_bfs);
        // Unspecified fields keep their defaults
        assert_eq!(params.cost_per_cell, 100);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let params = LatticeParams::for_joints(&["a", "b", "c"], 0.05);
        let yaml = params.to_yaml().unwrap();
        let parsed = LatticeParams::from_yaml(&yaml).unwrap();
        assert_eq!(params, parsed);
    }

    #[test]
    fn test_bad_yaml() {
        assert!(matches!(LatticeParams::from_yaml("joints: 3"), Err(RoboticsError::Config(_))));
    }
}
