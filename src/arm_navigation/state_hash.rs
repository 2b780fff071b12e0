//! Hash table of discrete lattice states
//!
//! Assigns dense, stable IDs and keeps the continuous joint values that
//! produced each state so trajectories can be rebuilt without quantization
//! error. Entries are never modified or removed; the whole table goes away
//! with the planning request.

use std::collections::HashMap;

use crate::common::{GridCell, RoboticsError, RoboticsResult, StateId};

/// One discrete state
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteState {
    pub id: StateId,
    /// Lattice coordinates, one per joint
    pub coords: Vec<i32>,
    /// Joint values the coordinates were derived from
    pub angles: Vec<f64>,
    /// End-effector cell in the obstacle grid
    pub end_effector: GridCell,
    pub flags: u32,
}

#[derive(Debug, Clone, Default)]
pub struct StateHashTable {
    states: Vec<DiscreteState>,
    index: HashMap<Vec<i32>, StateId>,
}

impl StateHashTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a state, or return the ID already assigned to `coords`.
    ///
    /// When the coordinates are known the stored angles and cell of the first
    /// insertion win.
    pub fn add_hash_entry(&mut self, coords: Vec<i32>, angles: Vec<f64>, end_effector: GridCell, flags: u32) -> StateId {
        if let Some(&id) = self.index.get(&coords) {
            return id;
        }
        let id = self.push(coords.clone(), angles, end_effector, flags);
        self.index.insert(coords, id);
        id
    }

    /// Insert a state with a fresh ID that lookups by coordinates never return
    pub fn add_detached_entry(&mut self, coords: Vec<i32>, angles: Vec<f64>, end_effector: GridCell, flags: u32) -> StateId {
        self.push(coords, angles, end_effector, flags)
    }

    fn push(&mut self, coords: Vec<i32>, angles: Vec<f64>, end_effector: GridCell, flags: u32) -> StateId {
        let id = self.states.len();
        self.states.push(DiscreteState {
            id,
            coords,
            angles,
            end_effector,
            flags,
        });
        id
    }

    pub fn lookup(&self, coords: &[i32]) -> Option<StateId> {
        self.index.get(coords).copied()
    }

    pub fn resolve(&self, id: StateId) -> RoboticsResult<&DiscreteState> {
        self.states.get(id).ok_or(RoboticsError::OutOfRange {
            id,
            len: self.states.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_dense_and_stable() {
        let mut table = StateHashTable::new();
        let a = table.add_hash_entry(vec![0, 0], vec![0.0, 0.0], GridCell::new(1, 2, 3), 0);
        let b = table.add_hash_entry(vec![1, 0], vec![0.1, 0.0], GridCell::new(2, 2, 3), 0);
        assert_eq!((a, b), (0, 1));
        assert_eq!(table.len(), 2);
        assert_eq!(table.resolve(a).unwrap().end_effector, GridCell::new(1, 2, 3));
        assert_eq!(table.resolve(b).unwrap().angles, vec![0.1, 0.0]);
    }

    #[test]
    fn test_duplicate_coords_map_to_same_id() {
        let mut table = StateHashTable::new();
        let first = table.add_hash_entry(vec![3, -1], vec![0.31, -0.12], GridCell::default(), 0);
        let second = table.add_hash_entry(vec![3, -1], vec![0.35, -0.18], GridCell::new(9, 9, 9), 0);
        assert_eq!(first, second);
        assert_eq!(table.len(), 1);
        // First insertion keeps its continuous values
        assert_eq!(table.resolve(first).unwrap().angles, vec![0.31, -0.12]);
        assert_eq!(table.lookup(&[3, -1]), Some(first));
    }

    #[test]
    fn test_detached_entry_is_not_indexed() {
        let mut table = StateHashTable::new();
        let start = table.add_hash_entry(vec![0, 0], vec![0.0, 0.0], GridCell::default(), 0);
        let goal = table.add_detached_entry(vec![0, 0], vec![0.0, 0.0], GridCell::new(5, 5, 5), 0);
        assert_ne!(start, goal);
        assert_eq!(table.lookup(&[0, 0]), Some(start));
        assert_eq!(table.resolve(goal).unwrap().end_effector, GridCell::new(5, 5, 5));
    }

    #[test]
    fn test_resolve_out_of_range() {
        let mut table = StateHashTable::new();
        assert!(table.is_empty());
        table.add_hash_entry(vec![0], vec![0.0], GridCell::default(), 0);
        match table.resolve(1) {
            Err(RoboticsError::OutOfRange { id, len }) => assert_eq!((id, len), (1, 1)),
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }
}
