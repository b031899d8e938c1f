//! Scene graph
//!
//! Node hierarchy with lazy transform caching, per-frame visit/draw
//! traversal in z order, visibility culling, and layer management.

pub mod camera;
pub mod command;
pub mod drawable;
pub mod graph;
pub mod layer;
pub mod node;
pub mod transform;

pub use camera::Camera;
pub use command::{SceneCommand, SceneCommandQueue};
pub use drawable::{Drawable, DrawableKind};
pub use graph::SceneManager;
pub use layer::Layer;
pub use node::{Node, NodeParent};
pub use transform::{LocalTransform, TransformCache};

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a node in the scene manager's arena
    pub struct NodeId;

    /// Handle to a layer in the scene manager's arena
    pub struct LayerId;
}
