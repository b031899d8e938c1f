//! Scene manager - node arena, layers, and the visit/draw pipeline
//!
//! Nodes and layers live in generational arenas; tree edges are arena keys.
//! Each frame the manager drains queued structural mutations, then visits
//! every layer's roots to rebuild the draw queues, then processes the
//! queues issuing draw calls in order.

use crate::foundation::collections::SlotMap;
use crate::foundation::math::{Mat4, Size2};
use crate::render::Renderer;
use crate::scene::command::{SceneCommand, SceneCommandQueue};
use crate::scene::layer::Layer;
use crate::scene::node::{Node, NodeParent};
use crate::scene::{LayerId, NodeId};

/// Owner of the scene: node arena, layer arena, and per-frame pipeline
#[derive(Default)]
pub struct SceneManager {
    nodes: SlotMap<NodeId, Node>,
    layers: SlotMap<LayerId, Layer>,
    layer_order: Vec<LayerId>,
    commands: SceneCommandQueue,
    content_size: Size2,
}

impl SceneManager {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer; layers draw in the order they were added
    ///
    /// The layer's camera, if any, is projected against the last known
    /// back buffer size immediately.
    pub fn add_layer(&mut self, mut layer: Layer) -> LayerId {
        if let Some(camera) = layer.camera_mut() {
            camera.recalculate_projection(self.content_size);
        }

        let id = self.layers.insert(layer);
        self.layer_order.push(id);
        id
    }

    /// Look up a layer
    pub fn layer(&self, layer: LayerId) -> Option<&Layer> {
        self.layers.get(layer)
    }

    /// Mutable access to a layer
    pub fn layer_mut(&mut self, layer: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(layer)
    }

    /// Layers in draw order
    pub fn layer_order(&self) -> &[LayerId] {
        &self.layer_order
    }

    /// Insert a detached node into the arena
    pub fn create_node(&mut self, node: Node) -> NodeId {
        self.nodes.insert(node)
    }

    /// Look up a node
    pub fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node)
    }

    /// Mutable access to a node
    pub fn node_mut(&mut self, node: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node)
    }

    /// Number of nodes in the arena, attached or detached
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Handle for queueing structural mutations from any thread
    pub fn command_queue(&self) -> SceneCommandQueue {
        self.commands.clone()
    }

    /// Attach a detached node under a parent
    ///
    /// Pushes the parent's current world transform into the child and
    /// propagates the owning layer down the child's subtree. Fails if the
    /// child is already attached, the parent is missing, or the child would
    /// become its own ancestor.
    pub fn add_child(&mut self, parent: NodeParent, child: NodeId) -> bool {
        let Some(child_node) = self.nodes.get(child) else {
            return false;
        };
        if child_node.parent.is_some() {
            log::warn!("add_child: node is already attached");
            return false;
        }

        let (parent_transform, layer) = match parent {
            NodeParent::Layer(layer) => {
                if !self.layers.contains_key(layer) {
                    return false;
                }
                (Mat4::identity(), Some(layer))
            }
            NodeParent::Node(parent_node) => {
                if parent_node == child || !self.nodes.contains_key(parent_node) {
                    return false;
                }
                if self.is_ancestor(child, parent_node) {
                    log::warn!("add_child: attachment would create a cycle");
                    return false;
                }
                let node = &mut self.nodes[parent_node];
                node.cache.resolve(&node.local);
                (*node.cache.world(), node.layer)
            }
        };

        match parent {
            NodeParent::Layer(layer) => self.layers[layer].roots.push(child),
            NodeParent::Node(parent_node) => self.nodes[parent_node].children.push(child),
        }

        let child_node = &mut self.nodes[child];
        child_node.parent = Some(parent);
        child_node.cache.set_parent_transform(&parent_transform);
        self.set_layer_recursive(child, layer);

        true
    }

    /// Detach a node from its parent, clearing layer references downward
    ///
    /// The node stays in the arena and can be re-attached; its subtree is
    /// untouched.
    pub fn remove_child(&mut self, child: NodeId) -> bool {
        let Some(parent) = self.nodes.get(child).and_then(|n| n.parent) else {
            return false;
        };

        match parent {
            NodeParent::Layer(layer) => {
                if let Some(layer) = self.layers.get_mut(layer) {
                    layer.roots.retain(|id| *id != child);
                }
            }
            NodeParent::Node(parent_node) => {
                if let Some(parent_node) = self.nodes.get_mut(parent_node) {
                    parent_node.children.retain(|id| *id != child);
                }
            }
        }

        self.nodes[child].parent = None;
        self.set_layer_recursive(child, None);
        true
    }

    /// Detach a node and free its entire subtree
    pub fn destroy_node(&mut self, node: NodeId) {
        self.remove_child(node);

        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            if let Some(node) = self.nodes.remove(id) {
                pending.extend(node.children);
            }
        }
    }

    /// Whether `ancestor` is on `node`'s parent chain (or is the node)
    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = match self.nodes.get(id).and_then(|n| n.parent) {
                Some(NodeParent::Node(parent)) => Some(parent),
                _ => None,
            };
        }
        false
    }

    fn set_layer_recursive(&mut self, node: NodeId, layer: Option<LayerId>) {
        let Some(node_ref) = self.nodes.get_mut(node) else {
            return;
        };
        node_ref.layer = layer;

        let children = node_ref.children.clone();
        for child in children {
            self.set_layer_recursive(child, layer);
        }
    }

    /// Apply every queued structural mutation
    ///
    /// Runs automatically at the start of `visit`/`draw`; exposed for
    /// callers that need the mutations applied without rendering.
    pub fn apply_pending(&mut self) {
        for command in self.commands.drain() {
            match command {
                SceneCommand::AddChild { parent, node } => {
                    let id = self.create_node(*node);
                    if !self.add_child(parent, id) {
                        log::warn!("queued add_child failed, dropping node");
                        self.nodes.remove(id);
                    }
                }
                SceneCommand::RemoveChild { node } => {
                    self.destroy_node(node);
                }
                SceneCommand::SetVisible { node, visible } => {
                    if let Some(node) = self.nodes.get_mut(node) {
                        node.set_visible(visible);
                    }
                }
            }
        }
    }

    /// Recompute every layer camera's projection for a back buffer size
    pub fn recalculate_projection(&mut self, size: Size2) {
        self.content_size = size;

        for layer in self.layers.values_mut() {
            if let Some(camera) = layer.camera_mut() {
                camera.recalculate_projection(size);
            }
        }
    }

    /// Rebuild every layer's draw queue without issuing draw calls
    pub fn visit(&mut self, renderer: &Renderer) {
        self.apply_pending();

        let layer_order = self.layer_order.clone();
        for layer_id in layer_order {
            self.visit_layer(layer_id, renderer);
        }
    }

    /// Run the full frame pipeline: drain commands, visit, then draw
    pub fn draw(&mut self, renderer: &mut Renderer) {
        self.apply_pending();

        let layer_order = self.layer_order.clone();
        for layer_id in layer_order {
            self.visit_layer(layer_id, renderer);
            self.process_layer(layer_id, renderer);
        }
    }

    fn visit_layer(&mut self, layer_id: LayerId, renderer: &Renderer) {
        let Some(layer) = self.layers.get_mut(layer_id) else {
            return;
        };
        layer.clear_draw_queue();

        let mut roots = std::mem::take(&mut layer.roots);
        self.sort_by_z(&mut roots);

        for root in &roots {
            self.visit_node(*root, &Mat4::identity(), false, layer_id, renderer);
        }

        if let Some(layer) = self.layers.get_mut(layer_id) {
            layer.roots = roots;
        }
    }

    /// Visit one node: refresh its transform, then collect it and its
    /// subtree into the draw queue in z order
    fn visit_node(
        &mut self,
        id: NodeId,
        parent_transform: &Mat4,
        parent_transform_dirty: bool,
        layer_id: LayerId,
        renderer: &Renderer,
    ) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };

        if parent_transform_dirty {
            node.cache.set_parent_transform(parent_transform);
        }

        // An invisible node skips its whole subtree for this frame
        if !node.is_visible() {
            return;
        }

        node.cache.resolve(&node.local);

        let world = *node.cache.world();
        let children_dirty = node.cache.take_update_children();
        let is_root = matches!(node.parent, Some(NodeParent::Layer(layer)) if layer == layer_id);
        let global_order = node.is_global_order();

        let mut children = std::mem::take(&mut self.nodes[id].children);
        self.sort_by_z(&mut children);
        let front = self.z_split(&children);

        // Children behind the node first, then the node, then the rest:
        // negative z renders behind its parent, non-negative in front
        for child in &children[..front] {
            self.visit_node(*child, &world, children_dirty, layer_id, renderer);
        }

        if self.node_qualifies(id, layer_id, is_root, global_order, renderer) {
            self.layers[layer_id].add_to_draw_queue(id);
        }

        for child in &children[front..] {
            self.visit_node(*child, &world, children_dirty, layer_id, renderer);
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.children = children;
        }
    }

    /// Stable ascending z sort; ties keep insertion order
    ///
    /// Stability is a correctness requirement: draw order of same-z
    /// siblings must be deterministic.
    fn sort_by_z(&self, ids: &mut [NodeId]) {
        ids.sort_by(|a, b| {
            let z_a = self.nodes.get(*a).map_or(0.0, Node::z);
            let z_b = self.nodes.get(*b).map_or(0.0, Node::z);
            z_a.total_cmp(&z_b)
        });
    }

    /// Index of the first child with z >= 0 in a z-sorted list
    fn z_split(&self, ids: &[NodeId]) -> usize {
        ids.iter()
            .position(|id| self.nodes.get(*id).map_or(true, |n| n.z() >= 0.0))
            .unwrap_or(ids.len())
    }

    fn node_qualifies(
        &self,
        id: NodeId,
        layer_id: LayerId,
        is_root: bool,
        global_order: bool,
        renderer: &Renderer,
    ) -> bool {
        if self.nodes[id].layer != Some(layer_id) {
            return false;
        }
        if !(global_order || is_root) {
            return false;
        }
        self.check_visibility(id, layer_id, renderer)
    }

    /// Whether any of the node's drawables would be seen by the layer camera
    ///
    /// An empty bounding box means "always visible" (full-screen effects);
    /// otherwise the renderer performs the geometric test against the
    /// node's world transform and the camera projection.
    fn check_visibility(&self, id: NodeId, layer_id: LayerId, renderer: &Renderer) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        if node.layer != Some(layer_id) {
            return false;
        }

        let camera = self.layers.get(layer_id).and_then(Layer::camera);

        node.drawables.iter().any(|drawable| {
            drawable.is_visible()
                && (drawable.bounding_box().is_empty()
                    || camera.map_or(false, |camera| {
                        renderer.check_visibility(node.cache.world(), drawable.bounding_box(), camera)
                    }))
        })
    }

    fn process_layer(&mut self, layer_id: LayerId, renderer: &mut Renderer) {
        let Some(layer) = self.layers.get(layer_id) else {
            return;
        };

        let queue = layer.draw_queue.clone();
        for id in queue {
            self.process_node(id, layer_id, renderer);
        }
    }

    /// Draw a queued node's subtree in z order
    ///
    /// Children that are themselves in the draw queue (global order),
    /// invisible, or out of view are skipped; the rest recurse so nested
    /// subtrees draw back to front.
    fn process_node(&mut self, id: NodeId, layer_id: LayerId, renderer: &mut Renderer) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };

        // Children were z-sorted by this frame's visit
        let children = node.children.clone();
        let front = self.z_split(&children);

        for child in &children[..front] {
            if self.should_process(*child, layer_id, renderer) {
                self.process_node(*child, layer_id, renderer);
            }
        }

        self.draw_node(id, layer_id, renderer);

        for child in &children[front..] {
            if self.should_process(*child, layer_id, renderer) {
                self.process_node(*child, layer_id, renderer);
            }
        }
    }

    fn should_process(&self, id: NodeId, layer_id: LayerId, renderer: &Renderer) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        !node.is_global_order() && node.is_visible() && self.check_visibility(id, layer_id, renderer)
    }

    /// Issue draw calls for one node's drawables
    fn draw_node(&mut self, id: NodeId, layer_id: LayerId, renderer: &mut Renderer) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.cache.resolve(&node.local);

        let world = *node.cache.world();
        let opacity = node.opacity();

        let Some(projection) = self.layers.get(layer_id).and_then(Layer::camera).map(|c| *c.projection())
        else {
            return;
        };

        let node = &self.nodes[id];
        for drawable in &node.drawables {
            if drawable.is_visible() {
                drawable.draw(renderer, &projection, &world, opacity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::foundation::math::{AABB2, Vec2};
    use crate::render::{quad, DrawMode, HeadlessDevice, MeshBufferId, ShaderId, VertexPCT};
    use crate::scene::camera::Camera;
    use crate::scene::drawable::Drawable;

    struct Fixture {
        renderer: Renderer,
        scene: SceneManager,
        layer: LayerId,
        mesh_buffer: MeshBufferId,
        shader: ShaderId,
    }

    fn fixture() -> Fixture {
        let mut renderer = Renderer::init(
            Box::new(HeadlessDevice::new()),
            Size2::new(800.0, 600.0),
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

        let mut scene = SceneManager::new();
        scene.recalculate_projection(renderer.size());
        let layer = scene.add_layer(Layer::with_camera(Camera::new()));

        Fixture { renderer, scene, layer, mesh_buffer, shader }
    }

    impl Fixture {
        /// A node that always qualifies for the draw queue (empty bounds)
        fn unbounded_node(&mut self) -> Node {
            let mut node = Node::new();
            node.add_drawable(Drawable::shape(
                self.mesh_buffer,
                self.shader,
                6,
                DrawMode::TriangleList,
                AABB2::empty(),
            ));
            node
        }

        /// A node culled against its 32x32 shape bounds
        fn bounded_node(&mut self) -> Node {
            let mut node = Node::new();
            node.add_drawable(Drawable::shape(
                self.mesh_buffer,
                self.shader,
                6,
                DrawMode::TriangleList,
                AABB2::from_center_extents(Vec2::zeros(), Vec2::new(16.0, 16.0)),
            ));
            node
        }
    }

    #[test]
    fn test_children_draw_queue_order() {
        let mut f = fixture();

        let root = {
            let node = f.unbounded_node();
            f.scene.create_node(node)
        };
        f.scene.add_child(NodeParent::Layer(f.layer), root);

        // Children at z = {-1, 0, 2, -3}, all global order so they queue
        let mut child_ids = Vec::new();
        for z in [-1.0, 0.0, 2.0, -3.0] {
            let mut node = f.unbounded_node();
            node.set_z(z);
            node.set_global_order(true);
            let id = f.scene.create_node(node);
            f.scene.add_child(NodeParent::Node(root), id);
            child_ids.push(id);
        }

        f.scene.visit(&f.renderer);

        let queue = f.scene.layer(f.layer).unwrap().draw_queue().to_vec();
        // z < 0 back to front, then the node, then z >= 0
        assert_eq!(
            queue,
            vec![child_ids[3], child_ids[0], root, child_ids[1], child_ids[2]]
        );
    }

    #[test]
    fn test_equal_z_preserves_insertion_order() {
        let mut f = fixture();

        let root = {
            let node = f.unbounded_node();
            f.scene.create_node(node)
        };
        f.scene.add_child(NodeParent::Layer(f.layer), root);

        let mut child_ids = Vec::new();
        for _ in 0..3 {
            let mut node = f.unbounded_node();
            node.set_global_order(true);
            let id = f.scene.create_node(node);
            f.scene.add_child(NodeParent::Node(root), id);
            child_ids.push(id);
        }

        // Two visits: the sort must be stable across frames too
        f.scene.visit(&f.renderer);
        f.scene.visit(&f.renderer);

        let queue = f.scene.layer(f.layer).unwrap().draw_queue().to_vec();
        assert_eq!(queue, vec![root, child_ids[0], child_ids[1], child_ids[2]]);
    }

    #[test]
    fn test_invisible_subtree_contributes_nothing() {
        let mut f = fixture();

        let root = {
            let mut node = f.unbounded_node();
            node.set_visible(false);
            f.scene.create_node(node)
        };
        f.scene.add_child(NodeParent::Layer(f.layer), root);

        // Individually visible children under an invisible parent
        for _ in 0..2 {
            let mut node = f.unbounded_node();
            node.set_global_order(true);
            let id = f.scene.create_node(node);
            f.scene.add_child(NodeParent::Node(root), id);
        }

        f.scene.visit(&f.renderer);
        assert!(f.scene.layer(f.layer).unwrap().draw_queue().is_empty());
    }

    #[test]
    fn test_static_transform_is_bit_identical_across_visits() {
        let mut f = fixture();

        let root = {
            let mut node = f.unbounded_node();
            node.set_position(Vec2::new(12.5, -3.25));
            node.set_rotation(0.3);
            f.scene.create_node(node)
        };
        f.scene.add_child(NodeParent::Layer(f.layer), root);

        let child = {
            let mut node = f.unbounded_node();
            node.set_position(Vec2::new(1.0, 1.0));
            f.scene.create_node(node)
        };
        f.scene.add_child(NodeParent::Node(root), child);

        f.scene.visit(&f.renderer);
        let first = *f.scene.node(child).unwrap().cache.world();

        f.scene.visit(&f.renderer);
        let second = *f.scene.node(child).unwrap().cache.world();

        assert_eq!(first, second);
    }

    #[test]
    fn test_parent_move_propagates_next_visit() {
        let mut f = fixture();

        let root = {
            let node = f.unbounded_node();
            f.scene.create_node(node)
        };
        f.scene.add_child(NodeParent::Layer(f.layer), root);

        let child = {
            let mut node = f.unbounded_node();
            node.set_position(Vec2::new(1.0, 0.0));
            f.scene.create_node(node)
        };
        f.scene.add_child(NodeParent::Node(root), child);

        f.scene.visit(&f.renderer);

        f.scene.node_mut(root).unwrap().set_position(Vec2::new(10.0, 0.0));

        // Frame 1 recomputes the parent and raises the push-down flag;
        // the child picks the new parent transform up on the same visit
        f.scene.visit(&f.renderer);

        let world = *f.scene.node(child).unwrap().cache.world();
        let origin = {
            use crate::foundation::math::Mat4Ext;
            world.transform_point2(Vec2::zeros())
        };
        assert!((origin.x - 11.0).abs() < 1e-5);
    }

    #[test]
    fn test_out_of_view_node_is_culled() {
        let mut f = fixture();

        let visible = {
            let node = f.bounded_node();
            f.scene.create_node(node)
        };
        f.scene.add_child(NodeParent::Layer(f.layer), visible);

        let culled = {
            let mut node = f.bounded_node();
            node.set_position(Vec2::new(10_000.0, 0.0));
            f.scene.create_node(node)
        };
        f.scene.add_child(NodeParent::Layer(f.layer), culled);

        f.scene.visit(&f.renderer);

        let queue = f.scene.layer(f.layer).unwrap().draw_queue().to_vec();
        assert_eq!(queue, vec![visible]);
    }

    #[test]
    fn test_non_global_children_draw_through_process() {
        let mut f = fixture();

        let root = {
            let node = f.bounded_node();
            f.scene.create_node(node)
        };
        f.scene.add_child(NodeParent::Layer(f.layer), root);

        // Not global order: absent from the queue, still drawn in z order
        let child = {
            let mut node = f.bounded_node();
            node.set_z(-1.0);
            f.scene.create_node(node)
        };
        f.scene.add_child(NodeParent::Node(root), child);

        let grandchild = {
            let node = f.bounded_node();
            f.scene.create_node(node)
        };
        f.scene.add_child(NodeParent::Node(child), grandchild);

        f.renderer.clear().unwrap();
        f.scene.draw(&mut f.renderer);

        assert_eq!(f.scene.layer(f.layer).unwrap().draw_queue().len(), 1);
        assert_eq!(f.renderer.draw_call_count(), 3);
    }

    #[test]
    fn test_camera_less_layer_issues_no_draws() {
        let mut f = fixture();
        let bare_layer = f.scene.add_layer(Layer::new());

        let node = {
            let node = f.unbounded_node();
            f.scene.create_node(node)
        };
        f.scene.add_child(NodeParent::Layer(bare_layer), node);

        f.renderer.clear().unwrap();
        f.scene.draw(&mut f.renderer);

        // Queued (empty bounds qualify without a camera) but never drawn
        assert_eq!(f.scene.layer(bare_layer).unwrap().draw_queue().len(), 1);
        assert_eq!(f.renderer.draw_call_count(), 0);
    }

    #[test]
    fn test_detached_cycle_and_double_attach_rejected() {
        let mut f = fixture();

        let a = f.scene.create_node(Node::new());
        let b = f.scene.create_node(Node::new());

        assert!(f.scene.add_child(NodeParent::Layer(f.layer), a));
        assert!(f.scene.add_child(NodeParent::Node(a), b));

        // Already attached
        assert!(!f.scene.add_child(NodeParent::Layer(f.layer), b));
        // Would create a cycle
        f.scene.remove_child(a);
        assert!(!f.scene.add_child(NodeParent::Node(b), a));
    }

    #[test]
    fn test_remove_child_clears_layer_recursively() {
        let mut f = fixture();

        let a = f.scene.create_node(Node::new());
        let b = f.scene.create_node(Node::new());
        f.scene.add_child(NodeParent::Layer(f.layer), a);
        f.scene.add_child(NodeParent::Node(a), b);

        assert_eq!(f.scene.node(b).unwrap().layer(), Some(f.layer));

        f.scene.remove_child(a);
        assert_eq!(f.scene.node(a).unwrap().layer(), None);
        assert_eq!(f.scene.node(b).unwrap().layer(), None);
        // Detached, not destroyed
        assert!(f.scene.node(a).is_some());
    }

    #[test]
    fn test_queued_visibility_change_applies_at_frame_boundary() {
        let mut f = fixture();

        let root = {
            let node = f.unbounded_node();
            f.scene.create_node(node)
        };
        f.scene.add_child(NodeParent::Layer(f.layer), root);

        let queue = f.scene.command_queue();
        queue.push(SceneCommand::SetVisible { node: root, visible: false });

        // Not applied until the next frame boundary
        assert!(f.scene.node(root).unwrap().is_visible());

        f.scene.visit(&f.renderer);
        assert!(!f.scene.node(root).unwrap().is_visible());
        assert!(f.scene.layer(f.layer).unwrap().draw_queue().is_empty());
    }

    #[test]
    fn test_concurrent_commands_never_corrupt_child_list() {
        let mut f = fixture();

        let root = f.scene.create_node(Node::new());
        f.scene.add_child(NodeParent::Layer(f.layer), root);

        // Pre-attach children that mutator threads will remove
        const THREADS: usize = 4;
        const PER_THREAD: usize = 25;
        let mut doomed: Vec<Vec<NodeId>> = Vec::new();
        for _ in 0..THREADS {
            let mut ids = Vec::new();
            for _ in 0..PER_THREAD {
                let id = f.scene.create_node(Node::new());
                f.scene.add_child(NodeParent::Node(root), id);
                ids.push(id);
            }
            doomed.push(ids);
        }

        let scene = &mut f.scene;
        let renderer = &mut f.renderer;
        let queue = scene.command_queue();

        std::thread::scope(|scope| {
            for ids in doomed.clone() {
                let queue = queue.clone();
                scope.spawn(move || {
                    for id in ids {
                        queue.push(SceneCommand::RemoveChild { node: id });
                        let mut node = Node::new();
                        node.set_z(0.5);
                        queue.push(SceneCommand::AddChild {
                            parent: NodeParent::Node(root),
                            node: Box::new(node),
                        });
                    }
                });
            }

            // Render thread keeps visiting while mutators enqueue
            for _ in 0..50 {
                scene.draw(renderer);
            }
        });

        // Drain whatever arrived after the last frame
        scene.apply_pending();

        let children = scene.node(root).unwrap().children().to_vec();
        let unique: HashSet<NodeId> = children.iter().copied().collect();

        // No duplicates, all doomed nodes gone, all added nodes present
        assert_eq!(unique.len(), children.len());
        for ids in &doomed {
            for id in ids {
                assert!(!unique.contains(id));
                assert!(scene.node(*id).is_none());
            }
        }
        assert_eq!(children.len(), THREADS * PER_THREAD);
        for child in &children {
            assert_eq!(scene.node(*child).unwrap().parent(), Some(NodeParent::Node(root)));
        }
    }
}
