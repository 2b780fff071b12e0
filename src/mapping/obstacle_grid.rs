//! 3D occupancy grid rasterized from the spatial obstacle map
//!
//! Built once per planning request and never modified afterwards.

use itertools::iproduct;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::common::{GridCell, Point3D, RoboticsError, RoboticsResult};
use crate::mapping::world::WorldObjects;
use crate::utils::Grid3D;

/// Grid geometry: size in cells, cell edge length and world position of the
/// corner of cell (0, 0, 0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridParams {
    pub cells_x: usize,
    pub cells_y: usize,
    pub cells_z: usize,
    /// Meters per cell
    pub resolution: f64,
    pub origin: Point3D,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            cells_x: 40,
            cells_y: 40,
            cells_z: 40,
            resolution: 0.05,
            origin: Point3D::new(-1.0, -1.0, -1.0),
        }
    }
}

impl GridParams {
    /// Grid covering a box of the given size (meters) from `origin`
    pub fn for_volume(size_x: f64, size_y: f64, size_z: f64, resolution: f64, origin: Point3D) -> Self {
        let cells = |size: f64| ((size / resolution) - 1e-9).ceil().max(1.0) as usize;
        Self {
            cells_x: cells(size_x),
            cells_y: cells(size_y),
            cells_z: cells(size_z),
            resolution,
            origin,
        }
    }

    pub fn validate(&self) -> RoboticsResult<()> {
        if self.cells_x == 0 || self.cells_y == 0 || self.cells_z == 0 {
            return Err(RoboticsError::InvalidParameter("grid must have at least one cell per axis".to_string()));
        }
        if !(self.resolution > 0.0) {
            return Err(RoboticsError::InvalidParameter(format!(
                "grid resolution must be positive, got {}",
                self.resolution
            )));
        }
        Ok(())
    }
}

/// Free/occupied voxel grid
#[derive(Debug, Clone)]
pub struct ObstacleGrid {
    cells: Grid3D<bool>,
    resolution: f64,
    origin: Point3D,
    occupied: usize,
}

impl ObstacleGrid {
    /// Grid with every cell free
    pub fn empty(params: &GridParams) -> RoboticsResult<Self> {
        params.validate()?;
        let cells = Grid3D::new(params.cells_x, params.cells_y, params.cells_z, false)
            .map_err(|e| RoboticsError::InvalidParameter(e.to_string()))?;
        Ok(Self {
            cells,
            resolution: params.resolution,
            origin: params.origin,
            occupied: 0,
        })
    }

    /// Rasterize every shape of every object.
    ///
    /// Conservative: a cell is marked when the shape comes within half a cell
    /// diagonal of its centre, so any cell the geometry touches is occupied.
    pub fn from_world(params: &GridParams, world: &WorldObjects) -> RoboticsResult<Self> {
        let mut grid = Self::empty(params)?;
        let half_diagonal = 0.5 * grid.resolution * 3.0_f64.sqrt();

        for (shape, pose) in world.shapes() {
            let t = pose.translation.vector;
            let center = Point3D::new(t.x, t.y, t.z);
            let reach = shape.bounding_radius() + half_diagonal;
            let lo = grid.clamp(grid.world_to_cell(&Point3D::new(center.x - reach, center.y - reach, center.z - reach)));
            let hi = grid.clamp(grid.world_to_cell(&Point3D::new(center.x + reach, center.y + reach, center.z + reach)));

            for (x, y, z) in iproduct!(lo.x..=hi.x, lo.y..=hi.y, lo.z..=hi.z) {
                let cell = GridCell::new(x, y, z);
                let local = pose.inverse_transform_point(&grid.cell_center(cell).to_point());
                if shape.signed_distance(&local) <= half_diagonal {
                    grid.mark_occupied(cell);
                }
            }
        }

        debug!(
            "[ObstacleGrid] rasterized {} objects: {}/{} cells occupied",
            world.len(),
            grid.occupied,
            grid.cells.num_cells()
        );
        Ok(grid)
    }

    /// Mark one cell occupied; cells outside the grid are ignored
    pub fn mark_occupied(&mut self, cell: GridCell) {
        if self.cells.get(cell) == Some(&false) {
            self.cells.set(cell, true);
            self.occupied += 1;
        }
    }

    /// Occupancy of a cell; anything outside the grid counts as occupied
    pub fn is_occupied(&self, cell: GridCell) -> bool {
        self.cells.get(cell).copied().unwrap_or(true)
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        self.cells.contains(cell)
    }

    pub fn clamp(&self, cell: GridCell) -> GridCell {
        self.cells.clamp(cell)
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        self.cells.dims()
    }

    pub fn num_cells(&self) -> usize {
        self.cells.num_cells()
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn origin(&self) -> Point3D {
        self.origin
    }

    pub fn occupied_cells(&self) -> usize {
        self.occupied
    }

    /// Occupied fraction of the grid in [0, 1]
    pub fn percent_occupied(&self) -> f64 {
        self.occupied as f64 / self.cells.num_cells() as f64
    }

    /// Cell containing a world point (floor, so points below the origin land in negative cells)
    fn world_to_cell(&self, p: &Point3D) -> GridCell {
        GridCell::new(
            ((p.x - self.origin.x) / self.resolution).floor() as i32,
            ((p.y - self.origin.y) / self.resolution).floor() as i32,
            ((p.z - self.origin.z) / self.resolution).floor() as i32,
        )
    }

    pub fn cell_center(&self, cell: GridCell) -> Point3D {
        Point3D::new(
            self.origin.x + (cell.x as f64 + 0.5) * self.resolution,
            self.origin.y + (cell.y as f64 + 0.5) * self.resolution,
            self.origin.z + (cell.z as f64 + 0.5) * self.resolution,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::world::{Shape, WorldObject};
    use approx::assert_relative_eq;

    fn unit_params() -> GridParams {
        GridParams {
            cells_x: 10,
            cells_y: 10,
            cells_z: 10,
            resolution: 0.1,
            origin: Point3D::origin(),
        }
    }

    #[test]
    fn test_for_volume() {
        let params = GridParams::for_volume(1.0, 0.5, 0.25, 0.1, Point3D::origin());
        assert_eq!((params.cells_x, params.cells_y, params.cells_z), (10, 5, 3));
    }

    #[test]
    fn test_invalid_params() {
        let mut params = unit_params();
        params.resolution = 0.0;
        assert!(ObstacleGrid::empty(&params).is_err());
        params.resolution = 0.1;
        params.cells_z = 0;
        assert!(ObstacleGrid::empty(&params).is_err());
    }

    #[test]
    fn test_empty_world() {
        let grid = ObstacleGrid::from_world(&unit_params(), &WorldObjects::new()).unwrap();
        assert_eq!(grid.occupied_cells(), 0);
        assert_relative_eq!(grid.percent_occupied(), 0.0);
        assert!(!grid.is_occupied(GridCell::new(5, 5, 5)));
        assert!(grid.is_occupied(GridCell::new(10, 0, 0)));
    }

    #[test]
    fn test_sphere_rasterization_is_conservative() {
        let world = WorldObjects::from_objects(vec![WorldObject::with_shape(
            "ball",
            Shape::sphere(0.12),
            Point3D::new(0.5, 0.5, 0.5),
        )]);
        let grid = ObstacleGrid::from_world(&unit_params(), &world).unwrap();

        // Every cell whose centre lies inside the sphere must be occupied
        for (x, y, z) in iproduct!(0..10, 0..10, 0..10) {
            let cell = GridCell::new(x, y, z);
            if world.is_point_occupied(&grid.cell_center(cell), 0.0) {
                assert!(grid.is_occupied(cell), "cell {:?} should be occupied", cell);
            }
        }
        // Cells sharing the corner at the sphere centre
        assert!(grid.is_occupied(GridCell::new(4, 4, 4)));
        assert!(grid.is_occupied(GridCell::new(5, 5, 5)));
        // Far corner stays free
        assert!(!grid.is_occupied(GridCell::new(0, 0, 0)));
        assert!(grid.percent_occupied() > 0.0 && grid.percent_occupied() < 0.2);
    }

    #[test]
    fn test_shape_outside_grid_is_ignored() {
        let world = WorldObjects::from_objects(vec![WorldObject::with_shape(
            "far",
            Shape::cuboid(0.2, 0.2, 0.2),
            Point3D::new(5.0, 5.0, 5.0),
        )]);
        let grid = ObstacleGrid::from_world(&unit_params(), &world).unwrap();
        assert_eq!(grid.occupied_cells(), 0);
    }

    #[test]
    fn test_wall_rasterization() {
        // Slab at x in [0.4, 0.6] spanning the whole grid
        let world = WorldObjects::from_objects(vec![WorldObject::with_shape(
            "wall",
            Shape::cuboid(0.2, 2.0, 2.0),
            Point3D::new(0.5, 0.5, 0.5),
        )]);
        let grid = ObstacleGrid::from_world(&unit_params(), &world).unwrap();
        for (y, z) in iproduct!(0..10, 0..10) {
            assert!(grid.is_occupied(GridCell::new(4, y, z)));
            assert!(grid.is_occupied(GridCell::new(5, y, z)));
            assert!(!grid.is_occupied(GridCell::new(1, y, z)));
        }
    }
}
