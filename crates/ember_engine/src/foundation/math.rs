//! Math utilities and types
//!
//! Provides fundamental math types for 2D/3D graphics and game development.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
};
use serde::{Serialize, Deserialize};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// 2D size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size2 {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Size2 {
    /// Create a new size from width and height
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Check whether either dimension is zero or negative
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// 2D axis-aligned bounding box
///
/// A default-constructed box is empty (min above max), meaning "no extent".
/// An empty box is the "always visible" sentinel used by full-screen effects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB2 {
    /// Minimum corner of the bounding box
    pub min: Vec2,
    /// Maximum corner of the bounding box
    pub max: Vec2,
}

impl Default for AABB2 {
    fn default() -> Self {
        Self::empty()
    }
}

impl AABB2 {
    /// Create a new box from min and max points
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create an empty box (inverted extremes, grows via `insert_point`)
    pub fn empty() -> Self {
        Self {
            min: Vec2::new(f32::INFINITY, f32::INFINITY),
            max: Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Create a box centered at a point with given extents
    pub fn from_center_extents(center: Vec2, extents: Vec2) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Check whether the box has no extent
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Grow the box to contain a point
    pub fn insert_point(&mut self, point: Vec2) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// Check if this box contains a point
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y
    }

    /// Check if this box intersects another box
    pub fn intersects(&self, other: &AABB2) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y
    }

    /// Get the four corners in counter-clockwise order starting at min
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.min.x, self.min.y),
            Vec2::new(self.max.x, self.min.y),
            Vec2::new(self.max.x, self.max.y),
            Vec2::new(self.min.x, self.max.y),
        ]
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;

    /// Create a centered orthographic projection matrix
    ///
    /// Maps x in [-width/2, width/2] and y in [-height/2, height/2] to the
    /// NDC square, and z in [near, far] to [0, 1].
    fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Mat4;

    /// Transform a 2D point, treating it as (x, y, 0, 1)
    fn transform_point2(&self, point: Vec2) -> Vec2;
}

impl Mat4Ext for Mat4 {
    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Mat4 {
        let mut result = Mat4::identity();

        result[(0, 0)] = 2.0 / width;
        result[(1, 1)] = 2.0 / height;
        result[(2, 2)] = 1.0 / (near - far);
        result[(2, 3)] = near / (near - far);

        result
    }

    fn transform_point2(&self, point: Vec2) -> Vec2 {
        let transformed = self.transform_point(&Point3::new(point.x, point.y, 0.0));
        Vec2::new(transformed.x, transformed.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_box_is_empty() {
        let aabb = AABB2::empty();
        assert!(aabb.is_empty());

        let mut grown = aabb;
        grown.insert_point(Vec2::new(1.0, 2.0));
        assert!(!grown.is_empty());
        assert!(grown.contains_point(Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn test_aabb_intersects() {
        let a = AABB2::new(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0));
        let b = AABB2::new(Vec2::new(1.0, 1.0), Vec2::new(3.0, 3.0));
        let c = AABB2::new(Vec2::new(5.0, 5.0), Vec2::new(7.0, 7.0));

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_orthographic_maps_extents_to_ndc() {
        let projection = Mat4::orthographic(800.0, 600.0, -1.0, 1.0);

        let corner = projection.transform_point2(Vec2::new(400.0, 300.0));
        assert_relative_eq!(corner.x, 1.0);
        assert_relative_eq!(corner.y, 1.0);

        let center = projection.transform_point2(Vec2::zeros());
        assert_relative_eq!(center.x, 0.0);
        assert_relative_eq!(center.y, 0.0);
    }

    #[test]
    fn test_rotation_z_quarter_turn() {
        let rotation = Mat4::rotation_z(constants::PI * 0.5);
        let rotated = rotation.transform_point2(Vec2::new(1.0, 0.0));

        assert_relative_eq!(rotated.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(rotated.y, 1.0, epsilon = 1e-6);
    }
}
