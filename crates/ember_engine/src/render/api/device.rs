//! Render device trait
//!
//! This is the contract a concrete GPU backend (OpenGL, Direct3D 11, Metal)
//! implements. The high-level `Renderer` owns the resource records and
//! performs draw-call validation; the device only ever sees calls that have
//! already passed validation, identified by the renderer's handles.

use crate::foundation::math::{Mat4, Size2};
use crate::render::mesh_buffer::MeshBufferId;
use crate::render::render_target::RenderTargetId;
use crate::render::shader::ShaderId;
use crate::render::texture::TextureId;
use crate::render::vertex::VertexAttributes;
use crate::render::{DrawMode, RenderError};

/// Result type for device operations
pub type DeviceResult<T> = Result<T, RenderError>;

/// Rendering device trait
///
/// Resource methods are lifecycle notifications: the device allocates its
/// native object for the given handle and returning `Ok` acknowledges that
/// the resource is ready for drawing. Bind methods are pure state
/// assignment and must not fail.
pub trait RenderDevice: Send {
    /// Initialize the device for the given back buffer configuration
    ///
    /// Valid only as the first call. Failure is fatal for the renderer.
    fn init(&mut self, size: Size2, resizable: bool, fullscreen: bool) -> DeviceResult<()>;

    /// Update the back buffer size after a window resize
    fn set_size(&mut self, size: Size2);

    /// Set the color the target is cleared to
    fn set_clear_color(&mut self, color: [f32; 4]);

    /// Clear the currently bound target
    fn clear(&mut self) -> DeviceResult<()>;

    /// Present the frame
    fn present(&mut self) -> DeviceResult<()>;

    /// Allocate texture storage for a handle, optionally with initial pixels
    fn create_texture(
        &mut self,
        texture: TextureId,
        size: Size2,
        dynamic: bool,
        mipmaps: bool,
        data: Option<&[u8]>,
    ) -> DeviceResult<()>;

    /// Replace the base level pixels of a dynamic texture
    fn upload_texture(&mut self, texture: TextureId, data: &[u8], size: Size2) -> DeviceResult<()>;

    /// Replace the pixels of one mipmap level of a dynamic texture
    fn upload_texture_mipmap(&mut self, texture: TextureId, level: u32, data: &[u8]) -> DeviceResult<()>;

    /// Release the native texture for a handle
    fn destroy_texture(&mut self, texture: TextureId);

    /// Compile and link a shader program for a handle
    fn create_shader(
        &mut self,
        shader: ShaderId,
        fragment_shader: &[u8],
        vertex_shader: &[u8],
        vertex_attributes: VertexAttributes,
    ) -> DeviceResult<()>;

    /// Release the native program for a handle
    fn destroy_shader(&mut self, shader: ShaderId);

    /// Allocate an index/vertex buffer pair for a handle
    fn create_mesh_buffer(
        &mut self,
        mesh_buffer: MeshBufferId,
        indices: &[u8],
        index_size: u32,
        vertices: &[u8],
        vertex_attributes: VertexAttributes,
    ) -> DeviceResult<()>;

    /// Replace the contents of a dynamic index buffer
    fn upload_mesh_buffer_indices(&mut self, mesh_buffer: MeshBufferId, indices: &[u8]) -> DeviceResult<()>;

    /// Replace the contents of a dynamic vertex buffer
    fn upload_mesh_buffer_vertices(&mut self, mesh_buffer: MeshBufferId, vertices: &[u8]) -> DeviceResult<()>;

    /// Release the native buffers for a handle
    fn destroy_mesh_buffer(&mut self, mesh_buffer: MeshBufferId);

    /// Allocate an off-screen surface for a handle
    fn create_render_target(
        &mut self,
        render_target: RenderTargetId,
        size: Size2,
        depth_buffer: bool,
    ) -> DeviceResult<()>;

    /// Release the native surface for a handle
    fn destroy_render_target(&mut self, render_target: RenderTargetId);

    /// Bind a texture to a sampler slot (`None` unbinds)
    fn bind_texture(&mut self, texture: Option<TextureId>, slot: u32);

    /// Bind a shader program (`None` unbinds)
    fn bind_shader(&mut self, shader: Option<ShaderId>);

    /// Bind an off-screen target, or the back buffer for `None`
    fn bind_render_target(&mut self, render_target: Option<RenderTargetId>);

    /// Stage the model-view-projection constant for the bound shader
    fn set_shader_constant(&mut self, matrix: &Mat4);

    /// Stage the color constant for the bound shader
    fn set_shader_color(&mut self, color: [f32; 4]);

    /// Draw `index_count` indices from a mesh buffer with the bound state
    ///
    /// The call has already passed the renderer's validation; a device
    /// failure here is a backend fault, not a contract violation.
    fn draw(&mut self, mesh_buffer: MeshBufferId, index_count: u32, mode: DrawMode) -> DeviceResult<()>;
}
