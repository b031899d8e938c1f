//! Layer camera
//!
//! Holds the orthographic projection a layer renders with. The projection
//! is cached and recomputed when the back buffer size, zoom, or camera
//! position changes.

use crate::foundation::math::{Mat4, Mat4Ext, Size2, Vec2, Vec3};

/// 2D camera with position, zoom, and a cached projection
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec2,
    zoom: f32,
    content_size: Size2,
    projection: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// Create a camera at the origin with unit zoom
    ///
    /// The projection is the identity until the first
    /// `recalculate_projection` call supplies a back buffer size.
    pub fn new() -> Self {
        Self {
            position: Vec2::zeros(),
            zoom: 1.0,
            content_size: Size2::default(),
            projection: Mat4::identity(),
        }
    }

    /// Recompute the projection for a back buffer size
    pub fn recalculate_projection(&mut self, size: Size2) {
        self.content_size = size;

        if size.is_degenerate() || self.zoom <= 0.0 {
            self.projection = Mat4::identity();
            return;
        }

        self.projection = Mat4::orthographic(size.width / self.zoom, size.height / self.zoom, -1.0, 1.0)
            * Mat4::new_translation(&Vec3::new(-self.position.x, -self.position.y, 0.0));
    }

    /// Move the camera, recomputing the projection
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.recalculate_projection(self.content_size);
    }

    /// Change the zoom factor, recomputing the projection
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
        self.recalculate_projection(self.content_size);
    }

    /// Camera position in world space
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Zoom factor (2.0 shows half the world extent)
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// The cached projection matrix
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_projection_identity_before_size_known() {
        let camera = Camera::new();
        assert_eq!(*camera.projection(), Mat4::identity());
    }

    #[test]
    fn test_projection_centers_camera_position() {
        let mut camera = Camera::new();
        camera.set_position(Vec2::new(100.0, 50.0));
        camera.recalculate_projection(Size2::new(800.0, 600.0));

        let center = camera.projection().transform_point2(Vec2::new(100.0, 50.0));
        assert_relative_eq!(center.x, 0.0);
        assert_relative_eq!(center.y, 0.0);
    }

    #[test]
    fn test_zoom_scales_visible_extent() {
        let mut camera = Camera::new();
        camera.recalculate_projection(Size2::new(800.0, 600.0));
        camera.set_zoom(2.0);

        // At zoom 2, a point half the former extent away lands on the edge
        let edge = camera.projection().transform_point2(Vec2::new(200.0, 0.0));
        assert_relative_eq!(edge.x, 1.0);
    }
}
