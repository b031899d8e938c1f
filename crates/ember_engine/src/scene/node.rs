//! Scene tree node
//!
//! A node carries local transform state, sort and visibility flags, its
//! drawables, and explicit arena identifiers for its parent and owning
//! layer. Nodes are constructed detached and joined to a tree through the
//! scene manager.

use crate::foundation::math::{Mat4, Mat4Ext, Vec2};
use crate::scene::drawable::Drawable;
use crate::scene::transform::{LocalTransform, TransformCache};
use crate::scene::{LayerId, NodeId};

/// Identifies what a node is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeParent {
    /// Attached directly to a layer (the node is a root)
    Layer(LayerId),
    /// Attached to another node
    Node(NodeId),
}

/// Scene tree entity owning drawables and a transform cache
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) local: LocalTransform,
    pub(crate) cache: TransformCache,
    z: f32,
    opacity: f32,
    visible: bool,
    global_order: bool,
    pub(crate) drawables: Vec<Drawable>,
    pub(crate) parent: Option<NodeParent>,
    pub(crate) layer: Option<LayerId>,
    pub(crate) children: Vec<NodeId>,
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    /// Create a detached node with identity transform
    pub fn new() -> Self {
        Self {
            local: LocalTransform::default(),
            cache: TransformCache::new(),
            z: 0.0,
            opacity: 1.0,
            visible: true,
            global_order: false,
            drawables: Vec::new(),
            parent: None,
            layer: None,
            children: Vec::new(),
        }
    }

    /// Set the local position
    pub fn set_position(&mut self, position: Vec2) {
        self.local.position = position;
        self.cache.invalidate_local();
    }

    /// Local position
    pub fn position(&self) -> Vec2 {
        self.local.position
    }

    /// Set the local rotation in radians
    pub fn set_rotation(&mut self, rotation: f32) {
        self.local.rotation = rotation;
        self.cache.invalidate_local();
    }

    /// Local rotation in radians
    pub fn rotation(&self) -> f32 {
        self.local.rotation
    }

    /// Set the local scale
    pub fn set_scale(&mut self, scale: Vec2) {
        self.local.scale = scale;
        self.cache.invalidate_local();
    }

    /// Local scale
    pub fn scale(&self) -> Vec2 {
        self.local.scale
    }

    /// Mirror along the X axis
    pub fn set_flip_x(&mut self, flip_x: bool) {
        self.local.flip_x = flip_x;
        self.cache.invalidate_local();
    }

    /// Whether the node mirrors along the X axis
    pub fn flip_x(&self) -> bool {
        self.local.flip_x
    }

    /// Mirror along the Y axis
    pub fn set_flip_y(&mut self, flip_y: bool) {
        self.local.flip_y = flip_y;
        self.cache.invalidate_local();
    }

    /// Whether the node mirrors along the Y axis
    pub fn flip_y(&self) -> bool {
        self.local.flip_y
    }

    /// Set the z sort key
    ///
    /// z affects only sibling draw order, not geometry, so the transform
    /// cache stays valid.
    pub fn set_z(&mut self, z: f32) {
        self.z = z;
    }

    /// z sort key
    pub fn z(&self) -> f32 {
        self.z
    }

    /// Set the opacity, clamped to [0, 1]
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Opacity in [0, 1]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Show or hide the node and its entire subtree
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether the node (and therefore its subtree) is visited
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Allow the node into the draw queue even when it is not a root
    pub fn set_global_order(&mut self, global_order: bool) {
        self.global_order = global_order;
    }

    /// Whether the node enters the draw queue directly
    pub fn is_global_order(&self) -> bool {
        self.global_order
    }

    /// What the node is attached to, if anything
    pub fn parent(&self) -> Option<NodeParent> {
        self.parent
    }

    /// The layer this node's tree hangs from, if attached
    pub fn layer(&self) -> Option<LayerId> {
        self.layer
    }

    /// Child nodes in insertion order (visit order re-sorts by z)
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Attach a drawable; the node owns it
    pub fn add_drawable(&mut self, drawable: Drawable) {
        self.drawables.push(drawable);
    }

    /// Remove a drawable by index
    pub fn remove_drawable(&mut self, index: usize) -> Option<Drawable> {
        if index < self.drawables.len() {
            Some(self.drawables.remove(index))
        } else {
            None
        }
    }

    /// Owned drawables
    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    /// Mutable access to owned drawables
    pub fn drawables_mut(&mut self) -> &mut [Drawable] {
        &mut self.drawables
    }

    /// The world transform, resolving the cache if stale
    pub fn transform(&mut self) -> &Mat4 {
        self.cache.resolve(&self.local);
        self.cache.world()
    }

    /// The inverse world transform, resolving lazily
    pub fn inverse_transform(&mut self) -> &Mat4 {
        self.cache.inverse(&self.local)
    }

    /// Convert a world-space point into this node's local space
    pub fn convert_world_to_local(&mut self, position: Vec2) -> Vec2 {
        self.inverse_transform().transform_point2(position)
    }

    /// Convert a local-space point into world space
    pub fn convert_local_to_world(&mut self, position: Vec2) -> Vec2 {
        self.transform().transform_point2(position)
    }

    /// Hit-test a world-space point against the node's drawables
    pub fn point_on(&mut self, position: Vec2) -> bool {
        let local_position = self.convert_world_to_local(position);
        self.drawables.iter().any(|drawable| drawable.point_on(local_position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_setters_invalidate_transform() {
        let mut node = Node::new();
        let identity = *node.transform();

        node.set_position(Vec2::new(10.0, 0.0));
        assert!(node.cache.is_world_dirty());
        let moved = *node.transform();
        assert_ne!(identity, moved);
    }

    #[test]
    fn test_set_z_keeps_transform_clean() {
        let mut node = Node::new();
        node.transform();
        node.cache.take_update_children();

        node.set_z(5.0);
        assert!(!node.cache.is_world_dirty());
    }

    #[test]
    fn test_opacity_is_clamped() {
        let mut node = Node::new();
        node.set_opacity(2.5);
        assert_relative_eq!(node.opacity(), 1.0);
        node.set_opacity(-1.0);
        assert_relative_eq!(node.opacity(), 0.0);
    }

    #[test]
    fn test_world_local_round_trip() {
        let mut node = Node::new();
        node.set_position(Vec2::new(7.0, -3.0));
        node.set_rotation(0.4);
        node.set_scale(Vec2::new(2.0, 2.0));

        let world = node.convert_local_to_world(Vec2::new(1.0, 1.0));
        let local = node.convert_world_to_local(world);

        assert_relative_eq!(local.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(local.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_new_node_is_detached() {
        let node = Node::new();
        assert!(node.parent().is_none());
        assert!(node.layer().is_none());
        assert!(node.children().is_empty());
    }
}
