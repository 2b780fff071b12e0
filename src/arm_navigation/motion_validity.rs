//! Interpolated motion validity checking
//!
//! A straight joint-space motion is valid when its destination and every
//! interior sample satisfy the path constraints and are collision free.
//! The sample count adapts to the largest per-joint excursion.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{trace, warn};

use crate::arm_navigation::discretization::shortest_angular_distance;
use crate::common::{CollisionChecker, ConstraintOracle, MotionValidator, Unconstrained};

/// Why a motion was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidMotion {
    /// Endpoints of different length; a caller defect, not a planning outcome
    DimensionMismatch { expected: usize, found: usize },
    Collision { sample: Vec<f64> },
    PathConstraint { sample: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MotionValidity {
    /// Interior samples that were checked, in order from the start
    Valid { intermediate: Vec<Vec<f64>> },
    Invalid(InvalidMotion),
}

impl MotionValidity {
    pub fn is_valid(&self) -> bool {
        matches!(self, MotionValidity::Valid { .. })
    }

    pub fn into_intermediate(self) -> Option<Vec<Vec<f64>>> {
        match self {
            MotionValidity::Valid { intermediate } => Some(intermediate),
            MotionValidity::Invalid(_) => None,
        }
    }
}

/// Motion checker bound to one planning group
pub struct MotionValidityChecker {
    collision_checker: Arc<dyn CollisionChecker>,
    path_constraints: Arc<dyn ConstraintOracle>,
    group: String,
    interpolation_deltas: Vec<f64>,
    continuous: Vec<bool>,
    num_collision_checks: usize,
    collision_check_time: Duration,
}

impl MotionValidityChecker {
    pub fn new(
        collision_checker: Arc<dyn CollisionChecker>,
        group: &str,
        interpolation_deltas: Vec<f64>,
        continuous: Vec<bool>,
    ) -> Self {
        Self {
            collision_checker,
            path_constraints: Arc::new(Unconstrained),
            group: group.to_string(),
            interpolation_deltas,
            continuous,
            num_collision_checks: 0,
            collision_check_time: Duration::default(),
        }
    }

    pub fn with_path_constraints(mut self, path_constraints: Arc<dyn ConstraintOracle>) -> Self {
        self.path_constraints = path_constraints;
        self
    }

    /// Single configuration check: path constraints, then collision
    pub fn check_state(&mut self, joints: &[f64]) -> Result<(), InvalidMotion> {
        if !self.path_constraints.is_satisfied(joints) {
            return Err(InvalidMotion::PathConstraint { sample: joints.to_vec() });
        }
        if self.in_collision(joints) {
            return Err(InvalidMotion::Collision { sample: joints.to_vec() });
        }
        Ok(())
    }

    /// Collision oracle call with bookkeeping
    pub fn in_collision(&mut self, joints: &[f64]) -> bool {
        let start = Instant::now();
        let collided = self.collision_checker.in_collision(joints, &self.group);
        self.collision_check_time += start.elapsed();
        self.num_collision_checks += 1;
        collided
    }

    /// Joint change from `from` to `to`, shortest arc for continuous joints
    fn joint_delta(&self, joint: usize, from: f64, to: f64) -> f64 {
        if self.continuous.get(joint).copied().unwrap_or(false) {
            shortest_angular_distance(from, to)
        } else {
            to - from
        }
    }

    /// Number of interpolation steps between two configurations of equal length
    pub fn num_steps(&self, from: &[f64], to: &[f64]) -> usize {
        from.iter()
            .zip(to.iter())
            .enumerate()
            .map(|(j, (a, b))| {
                let delta = self.interpolation_deltas.get(j).copied().unwrap_or(f64::INFINITY);
                (self.joint_delta(j, *a, *b).abs() / delta).floor() as usize
            })
            .max()
            .unwrap_or(0)
    }

    /// Configuration at `fraction` of the way from `from` to `to`
    fn interpolate(&self, from: &[f64], to: &[f64], fraction: f64) -> Vec<f64> {
        from.iter()
            .zip(to.iter())
            .enumerate()
            .map(|(j, (a, b))| a + fraction * self.joint_delta(j, *a, *b))
            .collect()
    }

    pub fn num_collision_checks(&self) -> usize {
        self.num_collision_checks
    }

    pub fn collision_check_time(&self) -> Duration {
        self.collision_check_time
    }
}

impl MotionValidator for MotionValidityChecker {
    fn check_motion(&mut self, from: &[f64], to: &[f64]) -> MotionValidity {
        if from.len() != to.len() {
            warn!(
                "[MotionValidity] dimension mismatch: {} vs {} joint values",
                from.len(),
                to.len()
            );
            return MotionValidity::Invalid(InvalidMotion::DimensionMismatch {
                expected: from.len(),
                found: to.len(),
            });
        }

        if let Err(reason) = self.check_state(to) {
            trace!("[MotionValidity] destination rejected: {:?}", reason);
            return MotionValidity::Invalid(reason);
        }

        let steps = self.num_steps(from, to);
        let mut intermediate = Vec::new();
        for i in 1..steps {
            let sample = self.interpolate(from, to, i as f64 / steps as f64);
            if let Err(reason) = self.check_state(&sample) {
                trace!("[MotionValidity] sample {}/{} rejected: {:?}", i, steps, reason);
                return MotionValidity::Invalid(reason);
            }
            intermediate.push(sample);
        }

        MotionValidity::Valid { intermediate }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm_navigation::test_support::{BlockedRegion, CountingChecker, FreeSpace};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn checker(deltas: Vec<f64>) -> MotionValidityChecker {
        let continuous = vec![false; deltas.len()];
        MotionValidityChecker::new(Arc::new(FreeSpace), "arm", deltas, continuous)
    }

    #[test]
    fn test_two_joint_scenario() {
        let counting = Arc::new(CountingChecker::new(FreeSpace));
        let mut mv = MotionValidityChecker::new(counting.clone(), "arm", vec![0.1, 0.1], vec![false, false]);

        assert_eq!(mv.num_steps(&[0.0, 0.0], &[0.5, 0.0]), 5);
        let result = mv.check_motion(&[0.0, 0.0], &[0.5, 0.0]);
        let samples = result.into_intermediate().unwrap();
        assert_eq!(samples.len(), 4);
        for (i, s) in samples.iter().enumerate() {
            assert_relative_eq!(s[0], 0.1 * (i + 1) as f64, epsilon = 1e-12);
            assert_relative_eq!(s[1], 0.0);
        }
        // Destination plus four interior samples
        assert_eq!(mv.num_collision_checks(), 5);
        assert_eq!(counting.calls(), 5);
    }

    #[test]
    fn test_zero_length_motion() {
        let mut mv = checker(vec![0.1, 0.1]);
        let result = mv.check_motion(&[0.3, 0.3], &[0.3, 0.3]);
        assert_eq!(result, MotionValidity::Valid { intermediate: vec![] });

        let mut blocked = MotionValidityChecker::new(
            Arc::new(BlockedRegion::new(0, 0.2, 0.4)),
            "arm",
            vec![0.1, 0.1],
            vec![false, false],
        );
        assert!(!blocked.check_motion(&[0.3, 0.3], &[0.3, 0.3]).is_valid());
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut mv = checker(vec![0.1, 0.1]);
        let result = mv.check_motion(&[0.0, 0.0], &[0.0]);
        assert_eq!(
            result,
            MotionValidity::Invalid(InvalidMotion::DimensionMismatch { expected: 2, found: 1 })
        );
        assert_eq!(mv.num_collision_checks(), 0);
    }

    #[test]
    fn test_destination_checked_first() {
        let counting = Arc::new(CountingChecker::new(BlockedRegion::new(0, 0.9, 1.1)));
        let mut mv = MotionValidityChecker::new(counting.clone(), "arm", vec![0.1], vec![false]);
        let result = mv.check_motion(&[0.0], &[1.0]);
        assert!(matches!(result, MotionValidity::Invalid(InvalidMotion::Collision { .. })));
        assert_eq!(counting.calls(), 1);
    }

    #[test]
    fn test_collision_in_the_middle() {
        let mut mv = MotionValidityChecker::new(
            Arc::new(BlockedRegion::new(1, 0.25, 0.35)),
            "arm",
            vec![0.1, 0.1],
            vec![false, false],
        );
        match mv.check_motion(&[0.0, 0.0], &[0.0, 0.5]) {
            MotionValidity::Invalid(InvalidMotion::Collision { sample }) => {
                assert_relative_eq!(sample[1], 0.3, epsilon = 1e-9)
            }
            other => panic!("expected collision, got {:?}", other),
        }
        // Destination, then samples 0.1, 0.2, 0.3
        assert_eq!(mv.num_collision_checks(), 4);
    }

    #[test]
    fn test_last_interior_sample_is_checked() {
        // Only the sample just before the destination is blocked
        let mut mv = MotionValidityChecker::new(
            Arc::new(BlockedRegion::new(0, 0.35, 0.45)),
            "arm",
            vec![0.1],
            vec![false],
        );
        assert!(!mv.check_motion(&[0.0], &[0.5]).is_valid());
    }

    #[test]
    fn test_path_constraint_reported_separately() {
        let constraint = |joints: &[f64]| joints[0] < 0.25;
        let mut mv = checker(vec![0.1]).with_path_constraints(Arc::new(constraint));
        match mv.check_motion(&[0.0], &[0.2]) {
            MotionValidity::Valid { intermediate } => assert_eq!(intermediate.len(), 1),
            other => panic!("expected valid, got {:?}", other),
        }
        assert!(matches!(
            mv.check_motion(&[0.0], &[0.4]),
            MotionValidity::Invalid(InvalidMotion::PathConstraint { .. })
        ));
    }

    #[test]
    fn test_long_motion_stops_at_first_bad_sample() {
        // 1e12 steps; the first interior sample is already blocked
        let counting = Arc::new(CountingChecker::new(BlockedRegion::new(0, 0.0, 1e-8)));
        let mut mv = MotionValidityChecker::new(counting.clone(), "arm", vec![1e-9], vec![false]);
        assert!(!mv.check_motion(&[0.0], &[1000.0]).is_valid());
        assert_eq!(counting.calls(), 2);
    }

    #[test]
    fn test_per_joint_interpolation_delta() {
        let mv = checker(vec![0.1, 0.01]);
        assert_eq!(mv.num_steps(&[0.0, 0.0], &[0.5, 0.105]), 10);
    }

    #[test]
    fn test_continuous_joint_takes_short_arc() {
        let mut mv = MotionValidityChecker::new(Arc::new(FreeSpace), "arm", vec![0.03], vec![true]);
        let from = [PI - 0.1];
        let to = [-PI + 0.1];
        assert_eq!(mv.num_steps(&from, &to), 6);
        let samples = mv.check_motion(&from, &to).into_intermediate().unwrap();
        assert_eq!(samples.len(), 5);
        // Samples move past +PI instead of sweeping back through zero
        assert!(samples.iter().all(|s| s[0] > PI - 0.1));

        let bounded = checker(vec![0.03]);
        assert!(bounded.num_steps(&from, &to) > 100);
    }
}
