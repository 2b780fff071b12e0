//! Motion primitives used to generate lattice successors

use crate::arm_navigation::discretization::{normalize_angle, shortest_angular_distance};

#[derive(Debug, Clone, PartialEq)]
pub enum MotionPrimitive {
    /// Fixed joint-space delta
    Static { name: String, delta: Vec<f64> },
    /// Jump straight to the goal vector once every joint is within
    /// `threshold` of it
    SnapToGoal { goal: Vec<f64>, threshold: f64 },
}

impl MotionPrimitive {
    pub fn name(&self) -> &str {
        match self {
            MotionPrimitive::Static { name, .. } => name,
            MotionPrimitive::SnapToGoal { .. } => "snap_to_goal",
        }
    }

    /// Candidate successor of `angles`, or None when the primitive does not
    /// apply. Continuous joints are kept in [-PI, PI].
    pub fn successor(&self, angles: &[f64], continuous: &[bool]) -> Option<Vec<f64>> {
        match self {
            MotionPrimitive::Static { delta, .. } => {
                if delta.len() != angles.len() {
                    return None;
                }
                Some(
                    angles
                        .iter()
                        .zip(delta.iter())
                        .enumerate()
                        .map(|(j, (a, d))| {
                            if is_continuous(continuous, j) {
                                normalize_angle(a + d)
                            } else {
                                a + d
                            }
                        })
                        .collect(),
                )
            }
            MotionPrimitive::SnapToGoal { goal, threshold } => {
                if goal.len() != angles.len() || goal.as_slice() == angles {
                    return None;
                }
                let within = angles.iter().zip(goal.iter()).enumerate().all(|(j, (a, g))| {
                    let diff = if is_continuous(continuous, j) {
                        shortest_angular_distance(*a, *g)
                    } else {
                        g - a
                    };
                    diff.abs() <= *threshold
                });
                if within {
                    Some(goal.clone())
                } else {
                    None
                }
            }
        }
    }
}

fn is_continuous(continuous: &[bool], joint: usize) -> bool {
    continuous.get(joint).copied().unwrap_or(false)
}

/// Ordered primitive list. Order only decides successor enumeration order.
#[derive(Debug, Clone, Default)]
pub struct MotionPrimitiveSet {
    primitives: Vec<MotionPrimitive>,
}

impl MotionPrimitiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// One positive and one negative lattice step per joint
    pub fn standard(resolutions: &[f64]) -> Self {
        let mut set = Self::new();
        for (j, res) in resolutions.iter().enumerate() {
            for (sign, suffix) in [(1.0, "+"), (-1.0, "-")].iter() {
                let mut delta = vec![0.0; resolutions.len()];
                delta[j] = sign * res;
                set.add_primitive(MotionPrimitive::Static {
                    name: format!("joint{}{}", j, suffix),
                    delta,
                });
            }
        }
        set
    }

    pub fn add_primitive(&mut self, primitive: MotionPrimitive) {
        self.primitives.push(primitive);
    }

    pub fn iter(&self) -> impl Iterator<Item = &MotionPrimitive> {
        self.primitives.iter()
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn has_snap_to_goal(&self) -> bool {
        self.primitives
            .iter()
            .any(|p| matches!(p, MotionPrimitive::SnapToGoal { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_static_successor() {
        let p = MotionPrimitive::Static {
            name: "step".to_string(),
            delta: vec![0.1, -0.2],
        };
        let next = p.successor(&[0.5, 0.5], &[false, false]).unwrap();
        assert_relative_eq!(next[0], 0.6, epsilon = 1e-12);
        assert_relative_eq!(next[1], 0.3, epsilon = 1e-12);
        assert!(p.successor(&[0.5], &[false]).is_none());
    }

    #[test]
    fn test_static_successor_wraps_continuous_joint() {
        let p = MotionPrimitive::Static {
            name: "wrap".to_string(),
            delta: vec![0.2, 0.2],
        };
        let next = p.successor(&[PI - 0.1, PI - 0.1], &[true, false]).unwrap();
        assert_relative_eq!(next[0], -PI + 0.1, epsilon = 1e-12);
        assert_relative_eq!(next[1], PI + 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_snap_to_goal_threshold() {
        let snap = MotionPrimitive::SnapToGoal {
            goal: vec![1.0, 1.0],
            threshold: 0.2,
        };
        assert_eq!(snap.successor(&[0.9, 1.15], &[false, false]), Some(vec![1.0, 1.0]));
        assert_eq!(snap.successor(&[0.7, 1.0], &[false, false]), None);
        // Already at the goal: no self-loop
        assert_eq!(snap.successor(&[1.0, 1.0], &[false, false]), None);
    }

    #[test]
    fn test_snap_to_goal_across_wrap() {
        let snap = MotionPrimitive::SnapToGoal {
            goal: vec![PI - 0.05],
            threshold: 0.2,
        };
        assert!(snap.successor(&[-PI + 0.05], &[true]).is_some());
        assert!(snap.successor(&[-PI + 0.05], &[false]).is_none());
    }

    #[test]
    fn test_standard_set_order() {
        let set = MotionPrimitiveSet::standard(&[0.1, 0.2]);
        assert_eq!(set.len(), 4);
        let names: Vec<&str> = set.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["joint0+", "joint0-", "joint1+", "joint1-"]);
        match set.iter().nth(3) {
            Some(MotionPrimitive::Static { delta, .. }) => assert_eq!(delta, &vec![0.0, -0.2]),
            other => panic!("unexpected primitive {:?}", other),
        };
    }

    #[test]
    fn test_add_primitive_appends() {
        let mut set = MotionPrimitiveSet::new();
        assert!(set.is_empty());
        set.add_primitive(MotionPrimitive::Static {
            name: "a".to_string(),
            delta: vec![0.1],
        });
        set.add_primitive(MotionPrimitive::SnapToGoal {
            goal: vec![0.0],
            threshold: 0.1,
        });
        assert_eq!(set.len(), 2);
        assert!(set.has_snap_to_goal());
        assert_eq!(set.iter().last().map(|p| p.name()), Some("snap_to_goal"));
    }
}
