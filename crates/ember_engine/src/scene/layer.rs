//! Render layer
//!
//! A layer owns an optional camera, an ordered set of root nodes, and the
//! per-frame draw queue the visit traversal fills.

use crate::scene::camera::Camera;
use crate::scene::NodeId;

/// A drawing plane with its own camera and draw queue
#[derive(Debug, Clone, Default)]
pub struct Layer {
    camera: Option<Camera>,
    pub(crate) roots: Vec<NodeId>,
    pub(crate) draw_queue: Vec<NodeId>,
}

impl Layer {
    /// Create a layer without a camera
    ///
    /// A camera-less layer still builds its draw queue (nodes with empty
    /// bounding boxes qualify) but issues no draw calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a layer with a camera
    pub fn with_camera(camera: Camera) -> Self {
        Self {
            camera: Some(camera),
            roots: Vec::new(),
            draw_queue: Vec::new(),
        }
    }

    /// Attach or replace the camera
    pub fn set_camera(&mut self, camera: Option<Camera>) {
        self.camera = camera;
    }

    /// The layer's camera, if any
    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    /// Mutable access to the layer's camera
    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    /// Root nodes in insertion order (visit order re-sorts by z)
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Append a node to this frame's draw queue
    pub fn add_to_draw_queue(&mut self, node: NodeId) {
        self.draw_queue.push(node);
    }

    /// The draw queue built by the most recent visit
    pub fn draw_queue(&self) -> &[NodeId] {
        &self.draw_queue
    }

    pub(crate) fn clear_draw_queue(&mut self) {
        self.draw_queue.clear();
    }
}
