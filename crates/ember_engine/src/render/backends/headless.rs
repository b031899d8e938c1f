//! Headless render device
//!
//! A device with no GPU behind it: it tracks resource handles, bound state,
//! and draw statistics, and acknowledges every valid lifecycle call. Used
//! by tests and by applications that run the scene pipeline without a
//! swapchain (server-side culling, CI).

use std::collections::HashSet;

use crate::foundation::math::{Mat4, Size2};
use crate::render::api::{DeviceResult, RenderDevice};
use crate::render::mesh_buffer::MeshBufferId;
use crate::render::render_target::RenderTargetId;
use crate::render::shader::ShaderId;
use crate::render::texture::TextureId;
use crate::render::vertex::VertexAttributes;
use crate::render::{DrawMode, RenderError};

/// Device implementation that records state instead of driving a GPU
pub struct HeadlessDevice {
    initialized: bool,
    size: Size2,
    clear_color: [f32; 4],
    textures: HashSet<TextureId>,
    shaders: HashSet<ShaderId>,
    mesh_buffers: HashSet<MeshBufferId>,
    render_targets: HashSet<RenderTargetId>,
    bound_shader: Option<ShaderId>,
    bound_render_target: Option<RenderTargetId>,
    shader_constant: Mat4,
    shader_color: [f32; 4],
    draws_submitted: u64,
    frames_presented: u64,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    /// Create an uninitialized headless device
    pub fn new() -> Self {
        Self {
            initialized: false,
            size: Size2::default(),
            clear_color: [0.0; 4],
            textures: HashSet::new(),
            shaders: HashSet::new(),
            mesh_buffers: HashSet::new(),
            render_targets: HashSet::new(),
            bound_shader: None,
            bound_render_target: None,
            shader_constant: Mat4::identity(),
            shader_color: [1.0; 4],
            draws_submitted: 0,
            frames_presented: 0,
        }
    }

    /// Total draws submitted over the device lifetime
    pub fn draws_submitted(&self) -> u64 {
        self.draws_submitted
    }

    /// Total frames presented over the device lifetime
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Last staged model-view-projection constant
    pub fn shader_constant(&self) -> &Mat4 {
        &self.shader_constant
    }

    /// Last staged color constant
    pub fn shader_color(&self) -> [f32; 4] {
        self.shader_color
    }

    fn require_init(&self) -> DeviceResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(RenderError::Backend("device not initialized".to_string()))
        }
    }
}

impl RenderDevice for HeadlessDevice {
    fn init(&mut self, size: Size2, resizable: bool, fullscreen: bool) -> DeviceResult<()> {
        if self.initialized {
            return Err(RenderError::Initialization(
                "device already initialized".to_string(),
            ));
        }

        self.initialized = true;
        self.size = size;
        log::info!(
            "headless device initialized: {}x{} resizable={} fullscreen={}",
            size.width, size.height, resizable, fullscreen
        );
        Ok(())
    }

    fn set_size(&mut self, size: Size2) {
        self.size = size;
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }

    fn clear(&mut self) -> DeviceResult<()> {
        self.require_init()
    }

    fn present(&mut self) -> DeviceResult<()> {
        self.require_init()?;
        self.frames_presented += 1;
        Ok(())
    }

    fn create_texture(
        &mut self,
        texture: TextureId,
        size: Size2,
        dynamic: bool,
        mipmaps: bool,
        data: Option<&[u8]>,
    ) -> DeviceResult<()> {
        self.require_init()?;
        if let Some(data) = data {
            let expected = size.width as usize * size.height as usize * 4;
            if data.len() != expected {
                return Err(RenderError::Backend(format!(
                    "texture data length {} does not match {}x{} RGBA",
                    data.len(),
                    size.width,
                    size.height
                )));
            }
        }
        let _ = (dynamic, mipmaps);
        self.textures.insert(texture);
        Ok(())
    }

    fn upload_texture(&mut self, texture: TextureId, data: &[u8], size: Size2) -> DeviceResult<()> {
        self.require_init()?;
        if !self.textures.contains(&texture) {
            return Err(RenderError::Backend("unknown texture handle".to_string()));
        }
        let expected = size.width as usize * size.height as usize * 4;
        if data.len() != expected {
            return Err(RenderError::Backend(format!(
                "texture data length {} does not match {}x{} RGBA",
                data.len(),
                size.width,
                size.height
            )));
        }
        Ok(())
    }

    fn upload_texture_mipmap(&mut self, texture: TextureId, _level: u32, _data: &[u8]) -> DeviceResult<()> {
        self.require_init()?;
        if !self.textures.contains(&texture) {
            return Err(RenderError::Backend("unknown texture handle".to_string()));
        }
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
    }

    fn create_shader(
        &mut self,
        shader: ShaderId,
        _fragment_shader: &[u8],
        _vertex_shader: &[u8],
        _vertex_attributes: VertexAttributes,
    ) -> DeviceResult<()> {
        self.require_init()?;
        self.shaders.insert(shader);
        Ok(())
    }

    fn destroy_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(&shader);
    }

    fn create_mesh_buffer(
        &mut self,
        mesh_buffer: MeshBufferId,
        _indices: &[u8],
        _index_size: u32,
        _vertices: &[u8],
        _vertex_attributes: VertexAttributes,
    ) -> DeviceResult<()> {
        self.require_init()?;
        self.mesh_buffers.insert(mesh_buffer);
        Ok(())
    }

    fn upload_mesh_buffer_indices(&mut self, mesh_buffer: MeshBufferId, _indices: &[u8]) -> DeviceResult<()> {
        self.require_init()?;
        if !self.mesh_buffers.contains(&mesh_buffer) {
            return Err(RenderError::Backend("unknown mesh buffer handle".to_string()));
        }
        Ok(())
    }

    fn upload_mesh_buffer_vertices(&mut self, mesh_buffer: MeshBufferId, _vertices: &[u8]) -> DeviceResult<()> {
        self.require_init()?;
        if !self.mesh_buffers.contains(&mesh_buffer) {
            return Err(RenderError::Backend("unknown mesh buffer handle".to_string()));
        }
        Ok(())
    }

    fn destroy_mesh_buffer(&mut self, mesh_buffer: MeshBufferId) {
        self.mesh_buffers.remove(&mesh_buffer);
    }

    fn create_render_target(
        &mut self,
        render_target: RenderTargetId,
        _size: Size2,
        _depth_buffer: bool,
    ) -> DeviceResult<()> {
        self.require_init()?;
        self.render_targets.insert(render_target);
        Ok(())
    }

    fn destroy_render_target(&mut self, render_target: RenderTargetId) {
        self.render_targets.remove(&render_target);
    }

    fn bind_texture(&mut self, _texture: Option<TextureId>, _slot: u32) {}

    fn bind_shader(&mut self, shader: Option<ShaderId>) {
        self.bound_shader = shader;
    }

    fn bind_render_target(&mut self, render_target: Option<RenderTargetId>) {
        self.bound_render_target = render_target;
    }

    fn set_shader_constant(&mut self, matrix: &Mat4) {
        self.shader_constant = *matrix;
    }

    fn set_shader_color(&mut self, color: [f32; 4]) {
        self.shader_color = color;
    }

    fn draw(&mut self, mesh_buffer: MeshBufferId, _index_count: u32, _mode: DrawMode) -> DeviceResult<()> {
        self.require_init()?;
        if !self.mesh_buffers.contains(&mesh_buffer) {
            return Err(RenderError::Backend("unknown mesh buffer handle".to_string()));
        }
        self.draws_submitted += 1;
        Ok(())
    }
}
