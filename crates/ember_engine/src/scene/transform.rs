//! Lazy transform cache
//!
//! Each node owns one cache holding the parent's last-pushed transform and
//! the derived local/world/inverse matrices under three independent dirty
//! bits. Resolution is an explicit step: callers resolve before reading, so
//! cache invalidation is visible in the contract instead of hidden behind
//! shared accessors.

use crate::foundation::math::{constants::TAU, Mat4, Mat4Ext, Vec2, Vec3};

/// Local transform parameters a node exposes to its cache
#[derive(Debug, Clone, PartialEq)]
pub struct LocalTransform {
    /// Translation
    pub position: Vec2,
    /// Rotation in radians
    pub rotation: f32,
    /// Scale factors
    pub scale: Vec2,
    /// Mirror along the X axis
    pub flip_x: bool,
    /// Mirror along the Y axis
    pub flip_y: bool,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            flip_x: false,
            flip_y: false,
        }
    }
}

/// Cached local/world/inverse matrices with independent dirty bits
#[derive(Debug, Clone)]
pub struct TransformCache {
    parent_transform: Mat4,
    local: Mat4,
    world: Mat4,
    inverse: Mat4,
    local_dirty: bool,
    world_dirty: bool,
    inverse_dirty: bool,
    update_children: bool,
}

impl Default for TransformCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformCache {
    /// Create a cache with every matrix pending recomputation
    pub fn new() -> Self {
        Self {
            parent_transform: Mat4::identity(),
            local: Mat4::identity(),
            world: Mat4::identity(),
            inverse: Mat4::identity(),
            local_dirty: true,
            world_dirty: true,
            inverse_dirty: true,
            update_children: false,
        }
    }

    /// Mark local, world, and inverse stale
    ///
    /// Called by every setter that changes the local geometry. Changing the
    /// z sort key does NOT go through here.
    pub fn invalidate_local(&mut self) {
        self.local_dirty = true;
        self.world_dirty = true;
        self.inverse_dirty = true;
    }

    /// Store a newly pushed parent transform, marking world and inverse stale
    pub fn set_parent_transform(&mut self, parent_transform: &Mat4) {
        self.parent_transform = *parent_transform;
        self.world_dirty = true;
        self.inverse_dirty = true;
    }

    /// Recompute any stale matrix
    ///
    /// The local matrix composes translate(position), rotate-Z by
    /// `TAU - rotation`, then scale with flip signs applied. A world
    /// recomputation raises the children-refresh flag so the next visit
    /// pushes the new transform down the subtree.
    pub fn resolve(&mut self, local: &LocalTransform) {
        if self.local_dirty {
            let scale = Vec3::new(
                local.scale.x * if local.flip_x { -1.0 } else { 1.0 },
                local.scale.y * if local.flip_y { -1.0 } else { 1.0 },
                1.0,
            );

            self.local = Mat4::new_translation(&Vec3::new(local.position.x, local.position.y, 0.0))
                * Mat4::rotation_z(TAU - local.rotation)
                * Mat4::new_nonuniform_scaling(&scale);

            self.local_dirty = false;
        }

        if self.world_dirty {
            self.world = self.parent_transform * self.local;
            self.world_dirty = false;
            self.update_children = true;
        }
    }

    /// The cached world transform
    ///
    /// Callers resolve first; the cache never recomputes behind a shared
    /// reference.
    pub fn world(&self) -> &Mat4 {
        &self.world
    }

    /// The cached inverse world transform, recomputing lazily
    ///
    /// A non-invertible world transform (zero scale) leaves the previous
    /// inverse in place.
    pub fn inverse(&mut self, local: &LocalTransform) -> &Mat4 {
        self.resolve(local);

        if self.inverse_dirty {
            match self.world.try_inverse() {
                Some(inverse) => self.inverse = inverse,
                None => log::warn!("world transform is not invertible, keeping previous inverse"),
            }
            self.inverse_dirty = false;
        }

        &self.inverse
    }

    /// Whether the world matrix is stale
    pub fn is_world_dirty(&self) -> bool {
        self.world_dirty || self.local_dirty
    }

    /// Consume the children-refresh flag raised by a world recomputation
    pub fn take_update_children(&mut self) -> bool {
        std::mem::replace(&mut self.update_children, false)
    }
}
