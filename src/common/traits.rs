//! Common traits defining the collaborator interfaces of the lattice environment

use crate::arm_navigation::motion_validity::MotionValidity;
use crate::common::error::RoboticsResult;
use crate::common::types::*;

/// Collision oracle. The allowed-collision policy is fixed for the request.
pub trait CollisionChecker {
    /// True when `joints` puts the planning group in collision
    fn in_collision(&self, joints: &[f64], group: &str) -> bool;
}

/// Forward kinematics of the designated tip link
pub trait ForwardKinematics {
    /// Workspace position of the end effector for `joints`
    fn end_effector_position(&self, joints: &[f64]) -> Point3D;
}

/// Predicate over a joint configuration (path or goal constraints)
pub trait ConstraintOracle {
    fn is_satisfied(&self, joints: &[f64]) -> bool;
}

/// Constraint set with nothing in it
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconstrained;

impl ConstraintOracle for Unconstrained {
    fn is_satisfied(&self, _joints: &[f64]) -> bool {
        true
    }
}

impl<F> ConstraintOracle for F
where
    F: Fn(&[f64]) -> bool,
{
    fn is_satisfied(&self, joints: &[f64]) -> bool {
        self(joints)
    }
}

/// Anything that can decide whether the straight joint-space motion between
/// two configurations is valid
pub trait MotionValidator {
    fn check_motion(&mut self, from: &[f64], to: &[f64]) -> MotionValidity;
}

/// Interface handed to an external graph search
pub trait GraphSearchEnvironment {
    fn start_state_id(&self) -> StateId;

    fn goal_state_id(&self) -> StateId;

    /// Non-negative cost-to-go estimate, 0 at the goal
    fn heuristic(&self, id: StateId) -> RoboticsResult<u32>;

    fn is_goal(&self, id: StateId) -> RoboticsResult<bool>;

    /// Successor IDs with their edge costs
    fn expand(&mut self, id: StateId) -> RoboticsResult<Vec<(StateId, u32)>>;

    /// Map a state ID path back to joint space
    fn reconstruct_trajectory(&self, ids: &[StateId]) -> RoboticsResult<JointTrajectory>;
}
