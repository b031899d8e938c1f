//! Drawable shapes owned by nodes
//!
//! A drawable is the leaf renderable: a mesh buffer plus shader plus the
//! per-kind bind state. Kinds are a closed set of tagged variants with
//! exhaustive matching in draw dispatch.

use crate::foundation::math::{AABB2, Mat4, Size2, Vec2};
use crate::render::{DrawMode, MeshBufferId, Renderer, ShaderId, TextureId};

/// The closed set of renderable shapes
#[derive(Debug, Clone)]
pub enum DrawableKind {
    /// Textured quad
    Sprite {
        /// Sprite sheet or image texture
        texture: TextureId,
    },
    /// Glyph quads over a font atlas
    Label {
        /// Font atlas texture
        texture: TextureId,
    },
    /// Point or quad particles sharing one texture
    ParticleSystem {
        /// Particle texture
        texture: TextureId,
        /// Number of live particles (six indices each)
        particle_count: u32,
    },
    /// Untextured colored geometry
    Shape,
}

/// A renderable shape owned by exactly one node
#[derive(Debug, Clone)]
pub struct Drawable {
    kind: DrawableKind,
    mesh_buffer: MeshBufferId,
    shader: ShaderId,
    index_count: u32,
    mode: DrawMode,
    bounding_box: AABB2,
    visible: bool,
}

impl Drawable {
    /// Create a sprite covering `size`, centered on the node origin
    pub fn sprite(mesh_buffer: MeshBufferId, shader: ShaderId, texture: TextureId, size: Size2) -> Self {
        Self {
            kind: DrawableKind::Sprite { texture },
            mesh_buffer,
            shader,
            index_count: 6,
            mode: DrawMode::TriangleList,
            bounding_box: AABB2::from_center_extents(
                Vec2::zeros(),
                Vec2::new(size.width * 0.5, size.height * 0.5),
            ),
            visible: true,
        }
    }

    /// Create a text label with explicit glyph bounds
    pub fn label(
        mesh_buffer: MeshBufferId,
        shader: ShaderId,
        texture: TextureId,
        index_count: u32,
        bounds: AABB2,
    ) -> Self {
        Self {
            kind: DrawableKind::Label { texture },
            mesh_buffer,
            shader,
            index_count,
            mode: DrawMode::TriangleList,
            bounding_box: bounds,
            visible: true,
        }
    }

    /// Create a particle system
    ///
    /// Particles move freely, so the bounding box is empty ("always
    /// visible") and culling never drops them.
    pub fn particle_system(
        mesh_buffer: MeshBufferId,
        shader: ShaderId,
        texture: TextureId,
        particle_count: u32,
    ) -> Self {
        Self {
            kind: DrawableKind::ParticleSystem { texture, particle_count },
            mesh_buffer,
            shader,
            index_count: particle_count * 6,
            mode: DrawMode::TriangleList,
            bounding_box: AABB2::empty(),
            visible: true,
        }
    }

    /// Create untextured geometry with explicit bounds
    ///
    /// An empty `bounds` makes the shape always visible, the convention
    /// full-screen effects use.
    pub fn shape(
        mesh_buffer: MeshBufferId,
        shader: ShaderId,
        index_count: u32,
        mode: DrawMode,
        bounds: AABB2,
    ) -> Self {
        Self {
            kind: DrawableKind::Shape,
            mesh_buffer,
            shader,
            index_count,
            mode,
            bounding_box: bounds,
            visible: true,
        }
    }

    /// The drawable's kind tag
    pub fn kind(&self) -> &DrawableKind {
        &self.kind
    }

    /// Local-space bounding box
    pub fn bounding_box(&self) -> &AABB2 {
        &self.bounding_box
    }

    /// Replace the local-space bounding box
    pub fn set_bounding_box(&mut self, bounds: AABB2) {
        self.bounding_box = bounds;
    }

    /// Whether the drawable participates in drawing
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the drawable
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Update the number of live particles
    ///
    /// No effect on other kinds.
    pub fn set_particle_count(&mut self, count: u32) {
        if let DrawableKind::ParticleSystem { particle_count, .. } = &mut self.kind {
            *particle_count = count;
        }
    }

    /// Hit-test a point already converted to the owning node's local space
    pub fn point_on(&self, local_position: Vec2) -> bool {
        !self.bounding_box.is_empty() && self.bounding_box.contains_point(local_position)
    }

    /// Bind state for this drawable and issue the draw call
    ///
    /// Returns the draw call's success flag. Opacity modulates the color
    /// constant's alpha channel.
    pub fn draw(&self, renderer: &mut Renderer, projection: &Mat4, transform: &Mat4, opacity: f32) -> bool {
        if !self.visible {
            return false;
        }

        let model_view_projection = projection * transform;

        let index_count = match &self.kind {
            DrawableKind::Sprite { texture } | DrawableKind::Label { texture } => {
                renderer.activate_texture(Some(*texture), 0);
                self.index_count
            }
            DrawableKind::ParticleSystem { texture, particle_count } => {
                renderer.activate_texture(Some(*texture), 0);
                // Only live particles are drawn
                self.index_count.min(particle_count * 6)
            }
            DrawableKind::Shape => {
                renderer.activate_texture(None, 0);
                self.index_count
            }
        };

        renderer.activate_shader(Some(self.shader));
        renderer.set_shader_constant(&model_view_projection);
        renderer.set_shader_color([1.0, 1.0, 1.0, opacity]);

        renderer.draw_mesh_buffer(self.mesh_buffer, index_count, self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Size2;
    use crate::render::{quad, HeadlessDevice, VertexPCT};

    fn renderer_with_quad() -> (Renderer, MeshBufferId, ShaderId, TextureId) {
        let mut renderer = Renderer::init(
            Box::new(HeadlessDevice::new()),
            Size2::new(640.0, 480.0),
            false,
            false,
            [0.0; 4],
        )
        .unwrap();

        let (vertices, indices) = quad(32.0, 32.0, [255; 4]);
        let mesh_buffer = renderer
            .create_mesh_buffer(
                bytemuck::cast_slice(&indices),
                2,
                false,
                bytemuck::cast_slice(&vertices),
                VertexPCT::ATTRIBUTES,
                false,
            )
            .unwrap();
        let shader = renderer
            .load_shader_from_buffers(&[1], &[1], VertexPCT::ATTRIBUTES)
            .unwrap();
        let texture = renderer
            .create_texture(Size2::new(32.0, 32.0), false, false)
            .unwrap();

        (renderer, mesh_buffer, shader, texture)
    }

    #[test]
    fn test_sprite_draw_issues_one_call() {
        let (mut renderer, mesh_buffer, shader, texture) = renderer_with_quad();
        let sprite = Drawable::sprite(mesh_buffer, shader, texture, Size2::new(32.0, 32.0));

        assert!(sprite.draw(&mut renderer, &Mat4::identity(), &Mat4::identity(), 1.0));
        assert_eq!(renderer.draw_call_count(), 1);
        assert_eq!(renderer.active_texture(0), Some(texture));
    }

    #[test]
    fn test_hidden_drawable_skips_draw() {
        let (mut renderer, mesh_buffer, shader, texture) = renderer_with_quad();
        let mut sprite = Drawable::sprite(mesh_buffer, shader, texture, Size2::new(32.0, 32.0));
        sprite.set_visible(false);

        assert!(!sprite.draw(&mut renderer, &Mat4::identity(), &Mat4::identity(), 1.0));
        assert_eq!(renderer.draw_call_count(), 0);
    }

    #[test]
    fn test_particle_system_is_always_visible() {
        let (_, mesh_buffer, shader, texture) = renderer_with_quad();
        let particles = Drawable::particle_system(mesh_buffer, shader, texture, 16);
        assert!(particles.bounding_box().is_empty());
    }

    #[test]
    fn test_point_on_uses_bounds() {
        let (_, mesh_buffer, shader, texture) = renderer_with_quad();
        let sprite = Drawable::sprite(mesh_buffer, shader, texture, Size2::new(32.0, 32.0));

        assert!(sprite.point_on(Vec2::new(0.0, 0.0)));
        assert!(sprite.point_on(Vec2::new(15.9, -15.9)));
        assert!(!sprite.point_on(Vec2::new(17.0, 0.0)));
    }

    #[test]
    fn test_shape_unbinds_texture() {
        let (mut renderer, mesh_buffer, shader, texture) = renderer_with_quad();
        renderer.activate_texture(Some(texture), 0);

        let shape = Drawable::shape(mesh_buffer, shader, 6, DrawMode::TriangleList, AABB2::empty());
        assert!(shape.draw(&mut renderer, &Mat4::identity(), &Mat4::identity(), 0.5));
        assert_eq!(renderer.active_texture(0), None);
    }
}
