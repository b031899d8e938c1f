//! # Ember Engine
//!
//! A 2D/3D scene-graph engine core with a backend-abstracted renderer.
//!
//! ## Features
//!
//! - **Scene Graph**: node hierarchy with lazy transform caching, dirty
//!   propagation, z-ordered traversal, and visibility culling
//! - **Abstract Renderer**: one validated draw-call contract over pluggable
//!   graphics backends
//! - **Resource Factory**: textures, shaders, mesh buffers, and render
//!   targets behind generational handles
//! - **Thread-Friendly Scenes**: structural mutations queue from any thread
//!   and apply at frame boundaries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ember_engine::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     let config = EngineConfig::new("my game").with_size(800.0, 600.0);
//!     let mut engine = Engine::init(config)?;
//!
//!     let camera = Camera::new();
//!     let layer = engine.scene_manager_mut().add_layer(Layer::with_camera(camera));
//!
//!     let node = engine.scene_manager_mut().create_node(Node::new());
//!     engine.scene_manager_mut().add_child(NodeParent::Layer(layer), node);
//!
//!     engine.render_frame()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod assets;
pub mod core;
pub mod events;
pub mod foundation;
pub mod render;
pub mod scene;

mod engine;

pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Engine, EngineError,
        core::config::{Config, Driver, EngineConfig},
        events::{Event, EventDispatcher, EventHandler, EventType},
        foundation::math::{AABB2, Mat4, Mat4Ext, Size2, Vec2, Vec3},
        render::{
            DrawMode, MeshBufferId, RenderError, RenderTargetId, Renderer, ShaderId, TextureId,
            VertexAttributes, VertexPCT,
        },
        scene::{
            Camera, Drawable, DrawableKind, Layer, LayerId, Node, NodeId, NodeParent,
            SceneCommand, SceneCommandQueue, SceneManager,
        },
    };
}
