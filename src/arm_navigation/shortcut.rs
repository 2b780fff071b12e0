//! Greedy trajectory shortcutting
//!
//! Walks the waypoints once, extending a straight joint-space span from the
//! last committed waypoint for as long as the motion stays valid. Every
//! validity check is made between two raw input waypoints.

use log::debug;

use crate::arm_navigation::motion_validity::MotionValidity;
use crate::common::{JointTrajectory, MotionValidator};

/// Valid straight span from the last committed waypoint
struct Span {
    end: usize,
    samples: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Copy)]
pub struct TrajectoryShortcutter {
    /// Keep the interpolated samples of every committed multi-step span
    pub interpolate_path: bool,
}

impl Default for TrajectoryShortcutter {
    fn default() -> Self {
        Self { interpolate_path: true }
    }
}

impl TrajectoryShortcutter {
    pub fn new(interpolate_path: bool) -> Self {
        Self { interpolate_path }
    }

    /// Shortcut a list of waypoints.
    ///
    /// First and last waypoints are copied verbatim. Fewer than two
    /// waypoints are returned unchanged.
    pub fn shortcut(&self, waypoints: &[Vec<f64>], validator: &mut dyn MotionValidator) -> Vec<Vec<f64>> {
        let n = waypoints.len();
        if n <= 1 {
            return waypoints.to_vec();
        }

        let mut output = vec![waypoints[0].clone()];
        let mut last = 0;
        let mut best = Span { end: 1, samples: Vec::new() };
        let mut candidate = 1;

        while candidate < n {
            match validator.check_motion(&waypoints[last], &waypoints[candidate]) {
                MotionValidity::Valid { intermediate } => {
                    best = Span {
                        end: candidate,
                        samples: intermediate,
                    };
                    candidate += 1;
                }
                MotionValidity::Invalid(_) => {
                    // An invalid adjacent pair is committed as a plain copy
                    let end = best.end;
                    self.commit(&mut output, waypoints, last, best);
                    last = end;
                    best = Span {
                        end: last + 1,
                        samples: Vec::new(),
                    };
                    candidate = last + 1;
                }
            }
        }

        if last < n - 1 {
            if self.interpolate_path {
                output.extend(best.samples);
            }
            output.push(waypoints[n - 1].clone());
        }

        debug!("[Shortcut] {} -> {} waypoints", n, output.len());
        output
    }

    fn commit(&self, output: &mut Vec<Vec<f64>>, waypoints: &[Vec<f64>], last: usize, span: Span) {
        if span.end > last + 1 && self.interpolate_path {
            output.extend(span.samples);
        }
        output.push(waypoints[span.end].clone());
    }

    /// Shortcut a whole trajectory, keeping its joint names
    pub fn shortcut_trajectory(&self, trajectory: &JointTrajectory, validator: &mut dyn MotionValidator) -> JointTrajectory {
        JointTrajectory::from_points(
            trajectory.joint_names.clone(),
            self.shortcut(&trajectory.points, validator),
        )
    }
}
