//! Common types, traits, and error definitions for arm_lattice
//!
//! This module provides the foundational building blocks shared by the
//! obstacle grid, the heuristic search and the arm environment.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
