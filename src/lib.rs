//! arm_lattice - lattice planning environment for robot arms
//!
//! This crate turns a continuous-configuration arm into a graph an external
//! lattice search can plan over: discretized states, motion primitives,
//! interpolated motion checks, a 3D BFS heuristic and path shortcutting.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod mapping;
pub mod path_planning;
pub mod arm_navigation;

// Re-export common types for convenience
pub use common::{GridCell, JointTrajectory, Point3D, StateId, CancellationToken};
pub use common::{CollisionChecker, ForwardKinematics, ConstraintOracle, MotionValidator, GraphSearchEnvironment};
pub use common::{RoboticsError, RoboticsResult, SetupFailure};
pub use arm_navigation::{ArmLatticeEnvironment, LatticeParams, MotionPlanRequest, PlanningScene};
