//! Visualization utilities for arm_lattice
//!
//! Plots joint trajectories and end-effector paths using gnuplot.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{JointTrajectory, Point3D, RoboticsError, RoboticsResult};

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00FF00";
    pub const BLUE: &str = "#0000FF";
    pub const ORANGE: &str = "#FFA500";
    pub const PURPLE: &str = "#800080";
    pub const GRAY: &str = "#808080";

    // Semantic colors
    pub const OBSTACLE: &str = BLACK;
    pub const START: &str = GREEN;
    pub const GOAL: &str = BLUE;
    pub const RAW_PATH: &str = GRAY;

    /// Cycled through for successive joints
    pub const JOINTS: [&str; 5] = [RED, BLUE, GREEN, ORANGE, PURPLE];
}

/// Style for one plotted trajectory
#[derive(Debug, Clone)]
pub struct JointPlotStyle {
    pub line_width: f64,
    /// Prefixed to each joint name in the legend
    pub caption: String,
    /// Single color for every joint; palette when None
    pub color: Option<String>,
    pub show_points: bool,
}

impl JointPlotStyle {
    pub fn new(caption: &str) -> Self {
        Self {
            line_width: 2.0,
            caption: caption.to_string(),
            color: None,
            show_points: false,
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn with_points(mut self) -> Self {
        self.show_points = true;
        self
    }
}

impl Default for JointPlotStyle {
    fn default() -> Self {
        Self::new("")
    }
}

/// Main visualizer struct
pub struct Visualizer {
    figure: Figure,
    title: String,
    x_label: String,
    y_label: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    aspect_ratio: Option<f64>,
}

impl Visualizer {
    /// Create a new visualizer for joint values over waypoints
    pub fn new() -> Self {
        Self {
            figure: Figure::new(),
            title: String::new(),
            x_label: "Waypoint".to_string(),
            y_label: "Angle [rad]".to_string(),
            x_range: None,
            y_range: None,
            aspect_ratio: None,
        }
    }

    /// Create a visualizer for workspace (x, y) plots
    pub fn workspace() -> Self {
        let mut vis = Self::new();
        vis.x_label = "X [m]".to_string();
        vis.y_label = "Y [m]".to_string();
        vis.aspect_ratio = Some(1.0);
        vis
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    pub fn set_x_label(&mut self, label: &str) -> &mut Self {
        self.x_label = label.to_string();
        self
    }

    pub fn set_y_label(&mut self, label: &str) -> &mut Self {
        self.y_label = label.to_string();
        self
    }

    pub fn set_x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn set_y_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_range = Some((min, max));
        self
    }

    /// Set aspect ratio (None for auto)
    pub fn set_aspect_ratio(&mut self, ratio: Option<f64>) -> &mut Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Plot every joint of a trajectory against the waypoint index
    pub fn plot_trajectory(&mut self, trajectory: &JointTrajectory, style: &JointPlotStyle) -> &mut Self {
        let index: Vec<f64> = (0..trajectory.len()).map(|i| i as f64).collect();
        let num_joints = trajectory.first().map_or(0, |p| p.len());

        for j in 0..num_joints {
            let values = trajectory.joint_values(j);
            let name = trajectory
                .joint_names
                .get(j)
                .cloned()
                .unwrap_or_else(|| format!("joint{}", j));
            let caption = if style.caption.is_empty() {
                name
            } else {
                format!("{} {}", style.caption, name)
            };
            let color = style
                .color
                .clone()
                .unwrap_or_else(|| colors::JOINTS[j % colors::JOINTS.len()].to_string());

            let axes = self.figure.axes2d();
            axes.lines(&index, &values, &[Caption(&caption), Color(&color), LineWidth(style.line_width)]);
            if style.show_points {
                axes.points(&index, &values, &[Color(&color), PointSymbol('O'), PointSize(0.6)]);
            }
        }
        self
    }

    /// Plot the x/y projection of a workspace path
    pub fn plot_workspace_path(&mut self, points: &[Point3D], caption: &str, color: &str) -> &mut Self {
        let x: Vec<f64> = points.iter().map(|p| p.x).collect();
        let y: Vec<f64> = points.iter().map(|p| p.y).collect();
        self.figure
            .axes2d()
            .lines(&x, &y, &[Caption(caption), Color(color), LineWidth(2.0)]);
        self
    }

    /// Plot workspace obstacle points (e.g. occupied cell centres)
    pub fn plot_obstacles(&mut self, points: &[Point3D]) -> &mut Self {
        let x: Vec<f64> = points.iter().map(|p| p.x).collect();
        let y: Vec<f64> = points.iter().map(|p| p.y).collect();
        self.figure.axes2d().points(
            &x,
            &y,
            &[Caption("Obstacles"), Color(colors::OBSTACLE), PointSymbol('S'), PointSize(0.5)],
        );
        self
    }

    /// Plot a single marker such as the start or goal
    pub fn plot_marker(&mut self, point: Point3D, caption: &str, color: &str) -> &mut Self {
        self.figure.axes2d().points(
            &[point.x],
            &[point.y],
            &[Caption(caption), Color(color), PointSymbol('*'), PointSize(1.5)],
        );
        self
    }

    /// Finalize and show the plot
    pub fn show(&mut self) -> RoboticsResult<()> {
        self.apply_settings();
        self.figure
            .show()
            .map(|_| ())
            .map_err(|e| RoboticsError::VisualizationError(e.to_string()))
    }

    /// Save plot to PNG file
    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> RoboticsResult<()> {
        self.apply_settings();
        self.figure
            .save_to_png(path, width, height)
            .map_err(|e| RoboticsError::VisualizationError(e.to_string()))
    }

    fn apply_settings(&mut self) {
        let axes = self.figure.axes2d();

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);

        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some(ratio) = self.aspect_ratio {
            axes.set_aspect_ratio(AutoOption::Fix(ratio));
        }
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Joint plot of a raw trajectory next to its shortcut version
pub fn compare_trajectories(raw: &JointTrajectory, shortcut: &JointTrajectory, title: &str) -> Visualizer {
    let mut vis = Visualizer::new();
    vis.set_title(title);
    vis.plot_trajectory(raw, &JointPlotStyle::new("raw").with_color(colors::RAW_PATH));
    vis.plot_trajectory(shortcut, &JointPlotStyle::new("shortcut").with_points());
    vis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visualizer_creation() {
        assert!(Visualizer::new().aspect_ratio.is_none());
        assert_eq!(Visualizer::workspace().aspect_ratio, Some(1.0));
    }

    #[test]
    fn test_joint_plot_style() {
        let style = JointPlotStyle::new("raw").with_color(colors::GRAY).with_points();
        assert_eq!(style.color.as_deref(), Some(colors::GRAY));
        assert!(style.show_points);
        assert_eq!(style.line_width, 2.0);
    }
}
