// Mapping module: spatial obstacle map and its voxel rasterization

pub mod obstacle_grid;
pub mod world;

pub use obstacle_grid::*;
pub use world::*;
