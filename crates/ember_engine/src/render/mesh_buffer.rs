//! Mesh buffer resource record
//!
//! Describes an index buffer and a vertex buffer pair. The record is the
//! authority the draw-call validator consults: attribute mask, index count,
//! and readiness all live here.

use slotmap::new_key_type;

use crate::render::vertex::VertexAttributes;
use crate::render::{RenderError, RenderResult};

new_key_type! {
    /// Handle to a mesh buffer owned by the renderer
    pub struct MeshBufferId;
}

/// Engine-side description of an index/vertex buffer pair
#[derive(Debug, Clone)]
pub struct MeshBuffer {
    index_size: u32,
    index_count: u32,
    dynamic_indices: bool,
    vertex_size: u32,
    vertex_count: u32,
    dynamic_vertices: bool,
    vertex_attributes: VertexAttributes,
    ready: bool,
}

impl MeshBuffer {
    /// Create a mesh buffer record, validating the data against the layout
    pub(crate) fn new(
        indices: &[u8],
        index_size: u32,
        dynamic_indices: bool,
        vertices: &[u8],
        vertex_attributes: VertexAttributes,
        dynamic_vertices: bool,
    ) -> RenderResult<Self> {
        if index_size != 2 && index_size != 4 {
            return Err(RenderError::ResourceCreation(format!(
                "invalid index size {index_size} (expected 2 or 4)"
            )));
        }
        if indices.len() % index_size as usize != 0 {
            return Err(RenderError::ResourceCreation(format!(
                "index data length {} is not a multiple of index size {index_size}",
                indices.len()
            )));
        }

        let vertex_size = vertex_attributes.stride();
        if vertex_size == 0 {
            return Err(RenderError::ResourceCreation(
                "mesh buffer declares no vertex attributes".to_string(),
            ));
        }
        if vertices.len() % vertex_size as usize != 0 {
            return Err(RenderError::ResourceCreation(format!(
                "vertex data length {} is not a multiple of vertex stride {vertex_size}",
                vertices.len()
            )));
        }

        Ok(Self {
            index_size,
            index_count: (indices.len() / index_size as usize) as u32,
            dynamic_indices,
            vertex_size,
            vertex_count: (vertices.len() / vertex_size as usize) as u32,
            dynamic_vertices,
            vertex_attributes,
            ready: false,
        })
    }

    pub(crate) fn set_ready(&mut self) {
        self.ready = true;
    }

    /// Validate an index re-upload, returning the new index count
    ///
    /// Dynamic buffers accept new data without reallocation, so the new
    /// count must not exceed the allocated count. The record is only
    /// mutated once the device accepts the upload (`set_index_count`).
    pub(crate) fn validate_index_upload(&self, indices: &[u8]) -> RenderResult<u32> {
        if !self.dynamic_indices {
            return Err(RenderError::Upload("index buffer is not dynamic".to_string()));
        }
        if indices.len() % self.index_size as usize != 0 {
            return Err(RenderError::Upload(format!(
                "index data length {} is not a multiple of index size {}",
                indices.len(),
                self.index_size
            )));
        }
        let new_count = (indices.len() / self.index_size as usize) as u32;
        if new_count > self.index_count {
            return Err(RenderError::Upload(format!(
                "index upload of {new_count} exceeds allocated count {}",
                self.index_count
            )));
        }
        Ok(new_count)
    }

    /// Validate a vertex re-upload, returning the new vertex count
    pub(crate) fn validate_vertex_upload(&self, vertices: &[u8]) -> RenderResult<u32> {
        if !self.dynamic_vertices {
            return Err(RenderError::Upload("vertex buffer is not dynamic".to_string()));
        }
        if vertices.len() % self.vertex_size as usize != 0 {
            return Err(RenderError::Upload(format!(
                "vertex data length {} is not a multiple of vertex stride {}",
                vertices.len(),
                self.vertex_size
            )));
        }
        let new_count = (vertices.len() / self.vertex_size as usize) as u32;
        if new_count > self.vertex_count {
            return Err(RenderError::Upload(format!(
                "vertex upload of {new_count} exceeds allocated count {}",
                self.vertex_count
            )));
        }
        Ok(new_count)
    }

    pub(crate) fn set_index_count(&mut self, count: u32) {
        self.index_count = count;
    }

    pub(crate) fn set_vertex_count(&mut self, count: u32) {
        self.vertex_count = count;
    }

    /// Bytes per index (2 or 4)
    pub fn index_size(&self) -> u32 {
        self.index_size
    }

    /// Number of indices available for drawing
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Bytes per vertex
    pub fn vertex_size(&self) -> u32 {
        self.vertex_size
    }

    /// Number of vertices in the buffer
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Vertex attribute mask describing the vertex layout
    pub fn vertex_attributes(&self) -> VertexAttributes {
        self.vertex_attributes
    }

    /// Whether the device has acknowledged the buffers
    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::vertex::{quad, VertexPCT};

    fn quad_buffer() -> MeshBuffer {
        let (vertices, indices) = quad(1.0, 1.0, [255; 4]);
        MeshBuffer::new(
            bytemuck::cast_slice(&indices),
            2,
            true,
            bytemuck::cast_slice(&vertices),
            VertexPCT::ATTRIBUTES,
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_counts_derived_from_data() {
        let buffer = quad_buffer();
        assert_eq!(buffer.index_count(), 6);
        assert_eq!(buffer.vertex_count(), 4);
        assert_eq!(buffer.vertex_size(), 24);
    }

    #[test]
    fn test_invalid_index_size_rejected() {
        let err = MeshBuffer::new(&[0; 6], 3, false, &[0; 24], VertexPCT::ATTRIBUTES, false);
        assert!(err.is_err());
    }

    #[test]
    fn test_misaligned_vertex_data_rejected() {
        let err = MeshBuffer::new(&[0; 4], 2, false, &[0; 25], VertexPCT::ATTRIBUTES, false);
        assert!(err.is_err());
    }

    #[test]
    fn test_dynamic_upload_shrinks_count() {
        let buffer = quad_buffer();
        let indices: [u16; 3] = [0, 1, 2];
        let new_count = buffer.validate_index_upload(bytemuck::cast_slice(&indices)).unwrap();
        assert_eq!(new_count, 3);
    }

    #[test]
    fn test_dynamic_upload_cannot_grow() {
        let buffer = quad_buffer();
        let indices = [0u16; 12];
        assert!(buffer.validate_index_upload(bytemuck::cast_slice(&indices)).is_err());
        assert_eq!(buffer.index_count(), 6);
    }
}
