// Path Planning module: grid search producing the lattice heuristic

pub mod bfs_3d;

pub use bfs_3d::*;
