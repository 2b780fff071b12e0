//! Fake collaborators shared by the arm_navigation tests

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::arm_navigation::motion_validity::{InvalidMotion, MotionValidity};
use crate::common::{CollisionChecker, ForwardKinematics, MotionValidator, Point3D};

/// Nothing ever collides
pub struct FreeSpace;

impl CollisionChecker for FreeSpace {
    fn in_collision(&self, _joints: &[f64], _group: &str) -> bool {
        false
    }
}

/// Collides while every listed joint lies strictly inside its open interval
pub struct BlockedRegion {
    bands: Vec<(usize, f64, f64)>,
}

impl BlockedRegion {
    pub fn new(joint: usize, low: f64, high: f64) -> Self {
        Self {
            bands: vec![(joint, low, high)],
        }
    }

    pub fn only_when(mut self, joint: usize, low: f64, high: f64) -> Self {
        self.bands.push((joint, low, high));
        self
    }
}

impl CollisionChecker for BlockedRegion {
    fn in_collision(&self, joints: &[f64], _group: &str) -> bool {
        self.bands
            .iter()
            .all(|&(j, low, high)| joints.get(j).map_or(false, |v| *v > low && *v < high))
    }
}

/// Counts oracle calls of the wrapped checker
pub struct CountingChecker<C> {
    inner: C,
    calls: AtomicUsize,
}

impl<C> CountingChecker<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<C: CollisionChecker> CollisionChecker for CountingChecker<C> {
    fn in_collision(&self, joints: &[f64], group: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.in_collision(joints, group)
    }
}

/// Validator with scripted answers, recording calls as waypoint index pairs
pub struct ScriptedValidator {
    default_valid: bool,
    invalid: HashSet<(usize, usize)>,
    samples: Vec<((usize, usize), Vec<Vec<f64>>)>,
    waypoints: Vec<Vec<f64>>,
    calls: Vec<(usize, usize)>,
}

impl ScriptedValidator {
    fn with_default(default_valid: bool) -> Self {
        Self {
            default_valid,
            invalid: HashSet::new(),
            samples: Vec::new(),
            waypoints: Vec::new(),
            calls: Vec::new(),
        }
    }

    pub fn all_valid() -> Self {
        Self::with_default(true)
    }

    pub fn all_invalid() -> Self {
        Self::with_default(false)
    }

    pub fn with_invalid(mut self, from: usize, to: usize) -> Self {
        self.invalid.insert((from, to));
        self
    }

    pub fn with_samples(mut self, from: usize, to: usize, samples: Vec<Vec<f64>>) -> Self {
        self.samples.push(((from, to), samples));
        self
    }

    pub fn set_waypoints(&mut self, waypoints: &[Vec<f64>]) {
        self.waypoints = waypoints.to_vec();
    }

    pub fn calls(&self) -> Vec<(usize, usize)> {
        self.calls.clone()
    }

    fn index_of(&self, joints: &[f64]) -> usize {
        self.waypoints
            .iter()
            .position(|w| w.as_slice() == joints)
            .unwrap_or(usize::MAX)
    }
}

impl MotionValidator for ScriptedValidator {
    fn check_motion(&mut self, from: &[f64], to: &[f64]) -> MotionValidity {
        let key = (self.index_of(from), self.index_of(to));
        self.calls.push(key);
        if !self.default_valid || self.invalid.contains(&key) {
            return MotionValidity::Invalid(InvalidMotion::Collision { sample: to.to_vec() });
        }
        let intermediate = self
            .samples
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, s)| s.clone())
            .unwrap_or_default();
        MotionValidity::Valid { intermediate }
    }
}

/// Planar two-link arm in the z = 0 plane with its shoulder at `base`
pub struct PlanarArm {
    pub base: Point3D,
    pub l1: f64,
    pub l2: f64,
}

impl PlanarArm {
    pub fn new(l1: f64, l2: f64) -> Self {
        Self {
            base: Point3D::origin(),
            l1,
            l2,
        }
    }
}

impl ForwardKinematics for PlanarArm {
    fn end_effector_position(&self, joints: &[f64]) -> Point3D {
        let t1 = joints.first().copied().unwrap_or(0.0);
        let t2 = joints.get(1).copied().unwrap_or(0.0);
        Point3D::new(
            self.base.x + self.l1 * t1.cos() + self.l2 * (t1 + t2).cos(),
            self.base.y + self.l1 * t1.sin() + self.l2 * (t1 + t2).sin(),
            self.base.z,
        )
    }
}

/// End effector at `origin` shifted by the first two joint values along x and y
pub struct SlidingTip {
    pub origin: Point3D,
}

impl SlidingTip {
    pub fn new(origin: Point3D) -> Self {
        Self { origin }
    }
}

impl ForwardKinematics for SlidingTip {
    fn end_effector_position(&self, joints: &[f64]) -> Point3D {
        Point3D::new(
            self.origin.x + joints.first().copied().unwrap_or(0.0),
            self.origin.y + joints.get(1).copied().unwrap_or(0.0),
            self.origin.z,
        )
    }
}
