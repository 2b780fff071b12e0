//! Utility modules for arm_lattice

pub mod grid3d;
pub mod visualization;

pub use grid3d::Grid3D;
pub use visualization::{colors, JointPlotStyle, Visualizer};
