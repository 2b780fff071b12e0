// 3D grid storage shared by the obstacle grid and the heuristic field

use std::ops::Index;

use crate::common::GridCell;

/// Dense x-major 3D array addressed by `GridCell`
#[derive(Debug, Clone, PartialEq)]
pub struct Grid3D<T> {
    nx: usize,
    ny: usize,
    nz: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid3D<T> {
    pub fn new(nx: usize, ny: usize, nz: usize, fill: T) -> Result<Self, &'static str> {
        if nx == 0 || ny == 0 || nz == 0 {
            return Err("grid dimensions must be >= 1");
        }
        Ok(Self { nx, ny, nz, data: vec![fill; nx * ny * nz] })
    }
}

impl<T> Grid3D<T> {
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    pub fn num_cells(&self) -> usize {
        self.data.len()
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && cell.z >= 0
            && (cell.x as usize) < self.nx
            && (cell.y as usize) < self.ny
            && (cell.z as usize) < self.nz
    }

    fn linear_index(&self, cell: GridCell) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        Some((cell.x as usize * self.ny + cell.y as usize) * self.nz + cell.z as usize)
    }

    pub fn get(&self, cell: GridCell) -> Option<&T> {
        self.linear_index(cell).map(|i| &self.data[i])
    }

    /// Write a cell; returns false (and writes nothing) outside the grid
    pub fn set(&mut self, cell: GridCell, value: T) -> bool {
        match self.linear_index(cell) {
            Some(i) => {
                self.data[i] = value;
                true
            }
            None => false,
        }
    }

    /// Nearest in-grid cell
    pub fn clamp(&self, cell: GridCell) -> GridCell {
        GridCell::new(
            cell.x.max(0).min(self.nx as i32 - 1),
            cell.y.max(0).min(self.ny as i32 - 1),
            cell.z.max(0).min(self.nz as i32 - 1),
        )
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

impl<T> Index<GridCell> for Grid3D<T> {
    type Output = T;

    fn index(&self, cell: GridCell) -> &T {
        match self.linear_index(cell) {
            Some(i) => &self.data[i],
            None => panic!("cell {:?} outside grid {:?}", cell, self.dims()),
        }
    }
}
