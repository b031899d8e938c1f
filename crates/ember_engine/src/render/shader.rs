//! Shader resource record
//!
//! The engine treats shader binaries as opaque: compilation happens in the
//! backend. The record keeps the vertex attribute mask the shader expects,
//! which the draw-call validator matches against mesh buffers.

use slotmap::new_key_type;

use crate::render::vertex::VertexAttributes;
use crate::render::{RenderError, RenderResult};

new_key_type! {
    /// Handle to a shader owned by the renderer
    pub struct ShaderId;
}

/// Engine-side description of a shader program
#[derive(Debug, Clone)]
pub struct Shader {
    vertex_attributes: VertexAttributes,
    ready: bool,
}

impl Shader {
    /// Create a shader record, validating the program binaries
    pub(crate) fn new(
        fragment_shader: &[u8],
        vertex_shader: &[u8],
        vertex_attributes: VertexAttributes,
    ) -> RenderResult<Self> {
        if fragment_shader.is_empty() || vertex_shader.is_empty() {
            return Err(RenderError::ResourceCreation(
                "empty shader program".to_string(),
            ));
        }
        if vertex_attributes.is_empty() {
            return Err(RenderError::ResourceCreation(
                "shader declares no vertex attributes".to_string(),
            ));
        }

        Ok(Self {
            vertex_attributes,
            ready: false,
        })
    }

    pub(crate) fn set_ready(&mut self) {
        self.ready = true;
    }

    /// Vertex attribute mask this shader consumes
    pub fn vertex_attributes(&self) -> VertexAttributes {
        self.vertex_attributes
    }

    /// Whether the device has acknowledged the program
    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_program_rejected() {
        assert!(Shader::new(&[], &[1, 2, 3], VertexAttributes::POSITION).is_err());
        assert!(Shader::new(&[1, 2, 3], &[], VertexAttributes::POSITION).is_err());
    }

    #[test]
    fn test_no_attributes_rejected() {
        assert!(Shader::new(&[1], &[1], VertexAttributes::empty()).is_err());
    }

    #[test]
    fn test_attributes_kept() {
        let shader = Shader::new(&[1], &[1], VertexAttributes::POSITION | VertexAttributes::COLOR)
            .unwrap();
        assert_eq!(
            shader.vertex_attributes(),
            VertexAttributes::POSITION | VertexAttributes::COLOR
        );
        assert!(!shader.is_ready());
    }
}
