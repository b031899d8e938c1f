//! Cross-thread scene mutation queue
//!
//! Structural mutations from outside the render thread are queued here and
//! drained at the frame boundary, before traversal starts. Child lists are
//! therefore never structurally mutated during an in-progress visit; the
//! queue's mutex is the only lock on the path.

use std::sync::{Arc, Mutex};

use crate::scene::node::{Node, NodeParent};
use crate::scene::NodeId;

/// A structural mutation to apply at the next frame boundary
#[derive(Debug)]
pub enum SceneCommand {
    /// Insert a detached node and attach it under a parent
    AddChild {
        /// What to attach the node to
        parent: NodeParent,
        /// The detached node, constructed on the sending thread
        node: Box<Node>,
    },
    /// Detach a node and destroy its subtree
    RemoveChild {
        /// The node to remove
        node: NodeId,
    },
    /// Show or hide a node
    SetVisible {
        /// The node to change
        node: NodeId,
        /// New visibility
        visible: bool,
    },
}

/// Cloneable handle for queueing scene commands from any thread
#[derive(Debug, Clone, Default)]
pub struct SceneCommandQueue {
    commands: Arc<Mutex<Vec<SceneCommand>>>,
}

impl SceneCommandQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command for the next frame boundary
    pub fn push(&self, command: SceneCommand) {
        self.commands.lock().expect("scene command queue poisoned").push(command);
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.commands.lock().expect("scene command queue poisoned").len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take every queued command, leaving the queue empty
    pub(crate) fn drain(&self) -> Vec<SceneCommand> {
        std::mem::take(&mut *self.commands.lock().expect("scene command queue poisoned"))
    }
}
