//! Lattice planning environment for robot arms
//!
//! Joint configurations are discretized into hashed lattice states,
//! expanded with motion primitives, validated by interpolated collision
//! checks and guided by a 3D BFS heuristic over the end-effector workspace.

pub mod config;
pub mod discretization;
pub mod environment;
pub mod motion_primitives;
pub mod motion_validity;
pub mod shortcut;
pub mod state_hash;
pub mod statistics;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{CellBoundsPolicy, JointParams, LatticeParams, PrimitiveParams};
pub use discretization::{normalize_angle, shortest_angular_distance, CoordinateDiscretizer};
pub use environment::{
    ArmLatticeEnvironment, GoalConstraints, JointConstraint, MotionPlanRequest, PlanningScene, PositionConstraint,
    UNREACHABLE_COST,
};
pub use motion_primitives::{MotionPrimitive, MotionPrimitiveSet};
pub use motion_validity::{InvalidMotion, MotionValidity, MotionValidityChecker};
pub use shortcut::TrajectoryShortcutter;
pub use state_hash::{DiscreteState, StateHashTable};
pub use statistics::PlanningStatistics;
