//! Render target resource record
//!
//! An off-screen surface the renderer can bind instead of the back buffer.
//! The color attachment is a texture owned by the renderer, so render-to-
//! texture results can be sampled by later draws.

use slotmap::new_key_type;

use crate::foundation::math::Size2;
use crate::render::texture::TextureId;
use crate::render::{RenderError, RenderResult};

new_key_type! {
    /// Handle to a render target owned by the renderer
    pub struct RenderTargetId;
}

/// Engine-side description of an off-screen render target
#[derive(Debug, Clone)]
pub struct RenderTarget {
    size: Size2,
    depth_buffer: bool,
    texture: TextureId,
    ready: bool,
}

impl RenderTarget {
    /// Create a render target record attached to a color texture
    pub(crate) fn new(size: Size2, depth_buffer: bool, texture: TextureId) -> RenderResult<Self> {
        if size.is_degenerate() {
            return Err(RenderError::ResourceCreation(format!(
                "invalid render target size {}x{}", size.width, size.height
            )));
        }

        Ok(Self {
            size,
            depth_buffer,
            texture,
            ready: false,
        })
    }

    pub(crate) fn set_ready(&mut self) {
        self.ready = true;
    }

    /// Surface size
    pub fn size(&self) -> Size2 {
        self.size
    }

    /// Whether a depth attachment was allocated
    pub fn has_depth_buffer(&self) -> bool {
        self.depth_buffer
    }

    /// Color attachment texture
    pub fn texture(&self) -> TextureId {
        self.texture
    }

    /// Whether the device has acknowledged the attachments
    pub fn is_ready(&self) -> bool {
        self.ready
    }
}
