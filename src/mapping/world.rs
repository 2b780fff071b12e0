//! Spatial obstacle map: solid shapes with poses
//!
//! This is the enumerable view of the planning scene that gets rasterized
//! into the obstacle grid once per request.

use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};

use crate::common::Point3D;

/// Solid primitive expressed in its own frame (centered at the origin)
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Sphere { radius: f64 },
    /// Axis-aligned box in the shape frame, given by half extents
    Cuboid { half_extents: Vector3<f64> },
    /// Cylinder along the shape-frame z axis
    Cylinder { radius: f64, half_length: f64 },
}

impl Shape {
    pub fn sphere(radius: f64) -> Self {
        Shape::Sphere { radius }
    }

    pub fn cuboid(size_x: f64, size_y: f64, size_z: f64) -> Self {
        Shape::Cuboid { half_extents: Vector3::new(size_x / 2.0, size_y / 2.0, size_z / 2.0) }
    }

    pub fn cylinder(radius: f64, length: f64) -> Self {
        Shape::Cylinder { radius, half_length: length / 2.0 }
    }

    /// Signed distance from a shape-frame point to the surface (negative inside)
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        match self {
            Shape::Sphere { radius } => p.coords.norm() - radius,
            Shape::Cuboid { half_extents } => {
                let q = p.coords.abs() - half_extents;
                let outside = q.map(|v| v.max(0.0)).norm();
                let inside = q.x.max(q.y).max(q.z).min(0.0);
                outside + inside
            }
            Shape::Cylinder { radius, half_length } => {
                let radial = (p.x * p.x + p.y * p.y).sqrt() - radius;
                let axial = p.z.abs() - half_length;
                let outside = (radial.max(0.0).powi(2) + axial.max(0.0).powi(2)).sqrt();
                outside + radial.max(axial).min(0.0)
            }
        }
    }

    /// Radius of a sphere around the shape origin enclosing the whole shape
    pub fn bounding_radius(&self) -> f64 {
        match self {
            Shape::Sphere { radius } => *radius,
            Shape::Cuboid { half_extents } => half_extents.norm(),
            Shape::Cylinder { radius, half_length } => (radius * radius + half_length * half_length).sqrt(),
        }
    }
}

/// A named collision object made of one or more posed shapes
#[derive(Debug, Clone)]
pub struct WorldObject {
    pub id: String,
    pub shapes: Vec<(Shape, Isometry3<f64>)>,
}

impl WorldObject {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string(), shapes: Vec::new() }
    }

    /// Single shape at a position, no rotation
    pub fn with_shape(id: &str, shape: Shape, position: Point3D) -> Self {
        let mut object = Self::new(id);
        object.add_shape(shape, Isometry3::from_parts(Translation3::new(position.x, position.y, position.z), UnitQuaternion::identity()));
        object
    }

    pub fn add_shape(&mut self, shape: Shape, pose: Isometry3<f64>) {
        self.shapes.push((shape, pose));
    }

    /// Smallest signed distance from a world point to any shape of the object
    pub fn signed_distance(&self, point: &Point3D) -> f64 {
        let p = point.to_point();
        self.shapes
            .iter()
            .map(|(shape, pose)| shape.signed_distance(&pose.inverse_transform_point(&p)))
            .fold(f64::INFINITY, f64::min)
    }
}

/// All collision objects of the scene
#[derive(Debug, Clone, Default)]
pub struct WorldObjects {
    pub objects: Vec<WorldObject>,
}

impl WorldObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_objects(objects: Vec<WorldObject>) -> Self {
        Self { objects }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Every posed shape in the scene, skipping objects without geometry
    pub fn shapes(&self) -> impl Iterator<Item = &(Shape, Isometry3<f64>)> {
        self.objects.iter().flat_map(|o| o.shapes.iter())
    }

    /// True if `point` lies inside (or within `margin` of) any object
    pub fn is_point_occupied(&self, point: &Point3D, margin: f64) -> bool {
        self.objects.iter().any(|o| o.signed_distance(point) <= margin)
    }
}
