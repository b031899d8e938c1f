//! Vertex formats and attribute layout description
//!
//! The attribute mask is the contract between mesh buffers and shaders: a
//! draw call is only valid when both sides agree on the mask.

use bitflags::bitflags;

bitflags! {
    /// Vertex attribute mask describing the layout of a vertex buffer
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VertexAttributes: u32 {
        /// 3 x f32 position
        const POSITION = 0x01;
        /// 4 x u8 normalized color
        const COLOR = 0x02;
        /// 3 x f32 normal
        const NORMAL = 0x04;
        /// 2 x f32 texture coordinate, unit 0
        const TEX_COORD0 = 0x08;
        /// 2 x f32 texture coordinate, unit 1
        const TEX_COORD1 = 0x10;
    }
}

impl VertexAttributes {
    /// Byte stride of a single vertex with this attribute mask
    pub fn stride(&self) -> u32 {
        let mut stride = 0;
        if self.contains(Self::POSITION) { stride += 12; }
        if self.contains(Self::COLOR) { stride += 4; }
        if self.contains(Self::NORMAL) { stride += 12; }
        if self.contains(Self::TEX_COORD0) { stride += 8; }
        if self.contains(Self::TEX_COORD1) { stride += 8; }
        stride
    }
}

/// Position-color-texcoord vertex used by sprites, labels, and particles
///
/// The `#[repr(C)]` attribute ensures consistent memory layout across
/// platforms, which is essential for GPU buffer uploads.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexPCT {
    /// Position in local space
    pub position: [f32; 3],
    /// Normalized RGBA color
    pub color: [u8; 4],
    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

// Safe to implement Pod and Zeroable since the struct is repr(C) with no
// padding: 12 + 4 + 8 = 24 bytes, 4-byte aligned.
unsafe impl bytemuck::Pod for VertexPCT {}
unsafe impl bytemuck::Zeroable for VertexPCT {}

impl VertexPCT {
    /// Attribute mask matching this vertex layout
    pub const ATTRIBUTES: VertexAttributes = VertexAttributes::POSITION
        .union(VertexAttributes::COLOR)
        .union(VertexAttributes::TEX_COORD0);

    /// Create a new vertex
    pub fn new(position: [f32; 3], color: [u8; 4], tex_coord: [f32; 2]) -> Self {
        Self { position, color, tex_coord }
    }
}

/// Build the vertices and indices of a textured unit quad scaled to
/// `width` x `height`, centered at the origin
pub fn quad(width: f32, height: f32, color: [u8; 4]) -> (Vec<VertexPCT>, Vec<u16>) {
    let half_width = width * 0.5;
    let half_height = height * 0.5;

    let vertices = vec![
        VertexPCT::new([-half_width, -half_height, 0.0], color, [0.0, 1.0]),
        VertexPCT::new([half_width, -half_height, 0.0], color, [1.0, 1.0]),
        VertexPCT::new([half_width, half_height, 0.0], color, [1.0, 0.0]),
        VertexPCT::new([-half_width, half_height, 0.0], color, [0.0, 0.0]),
    ];
    let indices = vec![0, 1, 2, 0, 2, 3];

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_matches_layout() {
        assert_eq!(VertexPCT::ATTRIBUTES.stride(), std::mem::size_of::<VertexPCT>() as u32);
        assert_eq!(VertexAttributes::POSITION.stride(), 12);
        assert_eq!(
            (VertexAttributes::POSITION | VertexAttributes::NORMAL | VertexAttributes::TEX_COORD0).stride(),
            32
        );
    }

    #[test]
    fn test_quad_winding() {
        let (vertices, indices) = quad(2.0, 2.0, [255; 4]);
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices.len(), 6);
        assert_eq!(vertices[0].position, [-1.0, -1.0, 0.0]);
        assert_eq!(vertices[2].position, [1.0, 1.0, 0.0]);
    }
}
