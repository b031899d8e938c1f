//! # Rendering System
//!
//! The core rendering abstraction layer. The [`Renderer`] is a high-level,
//! backend-agnostic facade: it owns the engine-side resource records, the
//! bound-state registers, and the draw-call validator, and delegates native
//! work to a [`RenderDevice`] implementation.
//!
//! ## Architecture
//!
//! - **Renderer**: resource factory, state tracker, draw-call validator
//! - **RenderDevice**: backend trait (`api`), implemented per graphics API
//! - **Resource records**: textures, shaders, mesh buffers, render targets
//!
//! The validator is the system's safety net: a draw call that would hit the
//! GPU with a mismatched vertex layout or an out-of-range index count is
//! rejected before it reaches the device.

pub mod api;
pub mod backends;
pub mod mesh_buffer;
pub mod render_target;
pub mod shader;
pub mod texture;
pub mod vertex;

pub use api::{DeviceResult, RenderDevice};
pub use backends::{create_device, HeadlessDevice};
pub use mesh_buffer::{MeshBuffer, MeshBufferId};
pub use render_target::{RenderTarget, RenderTargetId};
pub use shader::{Shader, ShaderId};
pub use texture::{Texture, TextureId};
pub use vertex::{quad, VertexAttributes, VertexPCT};

use thiserror::Error;

use crate::assets::ImageData;
use crate::foundation::collections::SlotMap;
use crate::events::{Event, EventArg, EventDispatcher, EventSource, EventType};
use crate::foundation::math::{AABB2, Mat4, Size2, Vec2};
use crate::scene::{Camera, SceneManager};

/// Number of texture sampler slots the renderer tracks
pub const TEXTURE_SLOTS: usize = 8;

/// High-level rendering error types
///
/// Abstracted from backend-specific error types so callers handle one
/// taxonomy regardless of the active graphics API.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Renderer or backend initialization failed
    #[error("Renderer initialization failed: {0}")]
    Initialization(String),

    /// Resource creation failed; no handle was produced
    #[error("Resource creation failed: {0}")]
    ResourceCreation(String),

    /// Data upload to an existing resource was rejected
    #[error("Resource upload failed: {0}")]
    Upload(String),

    /// Backend-specific error, wrapped in a generic form
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Primitive assembly mode for draw calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// Isolated points
    PointList,
    /// Isolated line segments
    LineList,
    /// Connected line segments
    LineStrip,
    /// Isolated triangles
    TriangleList,
    /// Connected triangles
    TriangleStrip,
}

/// High-level renderer facade over an abstract device
///
/// Owns every GPU resource record, tracks the bound shader/textures/target,
/// counts draw calls per frame, and validates every draw before it reaches
/// the device.
pub struct Renderer {
    device: Box<dyn RenderDevice>,
    size: Size2,
    resizable: bool,
    fullscreen: bool,
    title: String,

    textures: SlotMap<TextureId, Texture>,
    shaders: SlotMap<ShaderId, Shader>,
    mesh_buffers: SlotMap<MeshBufferId, MeshBuffer>,
    render_targets: SlotMap<RenderTargetId, RenderTarget>,

    active_textures: [Option<TextureId>; TEXTURE_SLOTS],
    active_shader: Option<ShaderId>,
    active_render_target: Option<RenderTargetId>,

    draw_call_count: u32,
}

impl Renderer {
    /// Initialize the renderer over a device
    ///
    /// Backend initialization failure is fatal and propagated; a renderer
    /// is never constructed over a dead device.
    pub fn init(
        mut device: Box<dyn RenderDevice>,
        size: Size2,
        resizable: bool,
        fullscreen: bool,
        clear_color: [f32; 4],
    ) -> RenderResult<Self> {
        device.init(size, resizable, fullscreen)?;
        device.set_clear_color(clear_color);

        log::info!(
            "renderer initialized: {}x{} resizable={} fullscreen={}",
            size.width, size.height, resizable, fullscreen
        );

        Ok(Self {
            device,
            size,
            resizable,
            fullscreen,
            title: String::new(),
            textures: SlotMap::with_key(),
            shaders: SlotMap::with_key(),
            mesh_buffers: SlotMap::with_key(),
            render_targets: SlotMap::with_key(),
            active_textures: [None; TEXTURE_SLOTS],
            active_shader: None,
            active_render_target: None,
            draw_call_count: 0,
        })
    }

    /// Current back buffer size
    pub fn size(&self) -> Size2 {
        self.size
    }

    /// Whether the window can be resized
    pub fn is_resizable(&self) -> bool {
        self.resizable
    }

    /// Whether the window is fullscreen
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Current window title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Draw calls issued since the last `clear`
    pub fn draw_call_count(&self) -> u32 {
        self.draw_call_count
    }

    /// Begin a frame: reset statistics and clear the bound target
    pub fn clear(&mut self) -> RenderResult<()> {
        self.draw_call_count = 0;
        self.device.clear()
    }

    /// End a frame: present the back buffer
    pub fn flush(&mut self) -> RenderResult<()> {
        self.device.present()
    }

    /// Resize the back buffer
    ///
    /// A no-op when the size is unchanged. Otherwise updates the stored
    /// size, recomputes every camera projection through the scene manager,
    /// and publishes exactly one size-change event.
    pub fn resize(
        &mut self,
        size: Size2,
        scene_manager: &mut SceneManager,
        events: &mut EventDispatcher,
    ) {
        if self.size == size {
            return;
        }

        self.size = size;
        self.device.set_size(size);
        scene_manager.recalculate_projection(size);

        log::debug!("resized to {}x{}", size.width, size.height);

        events.dispatch_event(
            Event::new(EventType::WindowSizeChange, EventSource::Renderer)
                .with_arg("size", EventArg::Size(size))
                .with_arg("title", EventArg::Title(self.title.clone())),
        );
    }

    /// Change the window title, publishing a title-change event
    ///
    /// A no-op when the title is unchanged.
    pub fn set_title(&mut self, title: &str, events: &mut EventDispatcher) {
        if self.title == title {
            return;
        }

        self.title = title.to_string();

        events.dispatch_event(
            Event::new(EventType::WindowTitleChange, EventSource::Renderer)
                .with_arg("size", EventArg::Size(self.size))
                .with_arg("title", EventArg::Title(self.title.clone())),
        );
    }

    /// Create a texture with allocated but unwritten storage
    pub fn create_texture(&mut self, size: Size2, dynamic: bool, mipmaps: bool) -> RenderResult<TextureId> {
        let texture = Texture::new(size, dynamic, mipmaps)?;
        let id = self.textures.insert(texture);

        if let Err(error) = self.device.create_texture(id, size, dynamic, mipmaps, None) {
            self.textures.remove(id);
            return Err(error);
        }

        self.textures[id].set_ready();
        Ok(id)
    }

    /// Create a texture from decoded image data
    pub fn load_texture_from_data(
        &mut self,
        data: &[u8],
        size: Size2,
        dynamic: bool,
        mipmaps: bool,
    ) -> RenderResult<TextureId> {
        let texture = Texture::new(size, dynamic, mipmaps)?;
        let id = self.textures.insert(texture);

        if let Err(error) = self.device.create_texture(id, size, dynamic, mipmaps, Some(data)) {
            self.textures.remove(id);
            return Err(error);
        }

        self.textures[id].set_ready();
        Ok(id)
    }

    /// Load a texture from an image file
    pub fn load_texture_from_file(
        &mut self,
        filename: &str,
        dynamic: bool,
        mipmaps: bool,
    ) -> RenderResult<TextureId> {
        let image = ImageData::from_file(filename)
            .map_err(|e| RenderError::ResourceCreation(e.to_string()))?;

        let id = self.load_texture_from_data(&image.data, image.size(), dynamic, mipmaps)?;
        self.textures[id].set_filename(filename);
        Ok(id)
    }

    /// Replace the base-level pixels of a dynamic texture
    pub fn upload_texture(&mut self, texture: TextureId, data: &[u8], size: Size2) -> RenderResult<()> {
        let record = self.textures.get(texture)
            .ok_or_else(|| RenderError::Upload("unknown texture handle".to_string()))?;
        record.validate_upload(size)?;
        self.device.upload_texture(texture, data, size)
    }

    /// Replace the pixels of one mipmap level of a dynamic texture
    pub fn upload_texture_mipmap(&mut self, texture: TextureId, level: u32, data: &[u8]) -> RenderResult<()> {
        let record = self.textures.get(texture)
            .ok_or_else(|| RenderError::Upload("unknown texture handle".to_string()))?;
        record.validate_mipmap_upload(level)?;
        self.device.upload_texture_mipmap(texture, level, data)
    }

    /// Destroy a texture and release its device storage
    pub fn destroy_texture(&mut self, texture: TextureId) {
        if self.textures.remove(texture).is_some() {
            self.device.destroy_texture(texture);
        }
        for slot in &mut self.active_textures {
            if *slot == Some(texture) {
                *slot = None;
            }
        }
    }

    /// Look up a texture record
    pub fn texture(&self, texture: TextureId) -> Option<&Texture> {
        self.textures.get(texture)
    }

    /// Load a shader from program binaries in memory
    pub fn load_shader_from_buffers(
        &mut self,
        fragment_shader: &[u8],
        vertex_shader: &[u8],
        vertex_attributes: VertexAttributes,
    ) -> RenderResult<ShaderId> {
        let shader = Shader::new(fragment_shader, vertex_shader, vertex_attributes)?;
        let id = self.shaders.insert(shader);

        if let Err(error) = self.device.create_shader(id, fragment_shader, vertex_shader, vertex_attributes) {
            self.shaders.remove(id);
            return Err(error);
        }

        self.shaders[id].set_ready();
        Ok(id)
    }

    /// Load a shader from program files on disk
    pub fn load_shader_from_files(
        &mut self,
        fragment_shader: &str,
        vertex_shader: &str,
        vertex_attributes: VertexAttributes,
    ) -> RenderResult<ShaderId> {
        let fragment = std::fs::read(fragment_shader).map_err(|e| {
            RenderError::ResourceCreation(format!("failed to read {fragment_shader}: {e}"))
        })?;
        let vertex = std::fs::read(vertex_shader).map_err(|e| {
            RenderError::ResourceCreation(format!("failed to read {vertex_shader}: {e}"))
        })?;

        self.load_shader_from_buffers(&fragment, &vertex, vertex_attributes)
    }

    /// Destroy a shader and release its device program
    pub fn destroy_shader(&mut self, shader: ShaderId) {
        if self.shaders.remove(shader).is_some() {
            self.device.destroy_shader(shader);
        }
        if self.active_shader == Some(shader) {
            self.active_shader = None;
        }
    }

    /// Look up a shader record
    pub fn shader(&self, shader: ShaderId) -> Option<&Shader> {
        self.shaders.get(shader)
    }

    /// Create an index/vertex buffer pair
    pub fn create_mesh_buffer(
        &mut self,
        indices: &[u8],
        index_size: u32,
        dynamic_indices: bool,
        vertices: &[u8],
        vertex_attributes: VertexAttributes,
        dynamic_vertices: bool,
    ) -> RenderResult<MeshBufferId> {
        let mesh_buffer = MeshBuffer::new(
            indices,
            index_size,
            dynamic_indices,
            vertices,
            vertex_attributes,
            dynamic_vertices,
        )?;
        let id = self.mesh_buffers.insert(mesh_buffer);

        if let Err(error) = self.device.create_mesh_buffer(id, indices, index_size, vertices, vertex_attributes) {
            self.mesh_buffers.remove(id);
            return Err(error);
        }

        self.mesh_buffers[id].set_ready();
        Ok(id)
    }

    /// Replace the contents of a dynamic index buffer
    ///
    /// The record's index count changes only after the device accepts the
    /// upload, so a failed upload leaves the buffer untouched.
    pub fn upload_mesh_buffer_indices(&mut self, mesh_buffer: MeshBufferId, indices: &[u8]) -> RenderResult<()> {
        let record = self.mesh_buffers.get(mesh_buffer)
            .ok_or_else(|| RenderError::Upload("unknown mesh buffer handle".to_string()))?;
        let new_count = record.validate_index_upload(indices)?;
        self.device.upload_mesh_buffer_indices(mesh_buffer, indices)?;
        self.mesh_buffers[mesh_buffer].set_index_count(new_count);
        Ok(())
    }

    /// Replace the contents of a dynamic vertex buffer
    pub fn upload_mesh_buffer_vertices(&mut self, mesh_buffer: MeshBufferId, vertices: &[u8]) -> RenderResult<()> {
        let record = self.mesh_buffers.get(mesh_buffer)
            .ok_or_else(|| RenderError::Upload("unknown mesh buffer handle".to_string()))?;
        let new_count = record.validate_vertex_upload(vertices)?;
        self.device.upload_mesh_buffer_vertices(mesh_buffer, vertices)?;
        self.mesh_buffers[mesh_buffer].set_vertex_count(new_count);
        Ok(())
    }

    /// Destroy a mesh buffer and release its device buffers
    pub fn destroy_mesh_buffer(&mut self, mesh_buffer: MeshBufferId) {
        if self.mesh_buffers.remove(mesh_buffer).is_some() {
            self.device.destroy_mesh_buffer(mesh_buffer);
        }
    }

    /// Look up a mesh buffer record
    pub fn mesh_buffer(&self, mesh_buffer: MeshBufferId) -> Option<&MeshBuffer> {
        self.mesh_buffers.get(mesh_buffer)
    }

    /// Create an off-screen render target with a color texture attachment
    pub fn create_render_target(&mut self, size: Size2, depth_buffer: bool) -> RenderResult<RenderTargetId> {
        let texture = self.create_texture(size, false, false)?;

        let render_target = match RenderTarget::new(size, depth_buffer, texture) {
            Ok(render_target) => render_target,
            Err(error) => {
                self.destroy_texture(texture);
                return Err(error);
            }
        };
        let id = self.render_targets.insert(render_target);

        if let Err(error) = self.device.create_render_target(id, size, depth_buffer) {
            self.render_targets.remove(id);
            self.destroy_texture(texture);
            return Err(error);
        }

        self.render_targets[id].set_ready();
        Ok(id)
    }

    /// Destroy a render target and its color attachment
    pub fn destroy_render_target(&mut self, render_target: RenderTargetId) {
        if let Some(record) = self.render_targets.remove(render_target) {
            self.device.destroy_render_target(render_target);
            self.destroy_texture(record.texture());
        }
        if self.active_render_target == Some(render_target) {
            self.active_render_target = None;
        }
    }

    /// Look up a render target record
    pub fn render_target(&self, render_target: RenderTargetId) -> Option<&RenderTarget> {
        self.render_targets.get(render_target)
    }

    /// Bind a texture to a sampler slot
    ///
    /// Pure state assignment; always succeeds. The bool return keeps a
    /// uniform signature with the draw path.
    pub fn activate_texture(&mut self, texture: Option<TextureId>, slot: u32) -> bool {
        if let Some(active) = self.active_textures.get_mut(slot as usize) {
            *active = texture;
            self.device.bind_texture(texture, slot);
        }
        true
    }

    /// Bind a shader
    pub fn activate_shader(&mut self, shader: Option<ShaderId>) -> bool {
        self.active_shader = shader;
        self.device.bind_shader(shader);
        true
    }

    /// Bind a render target (`None` binds the back buffer)
    pub fn activate_render_target(&mut self, render_target: Option<RenderTargetId>) -> bool {
        self.active_render_target = render_target;
        self.device.bind_render_target(render_target);
        true
    }

    /// Texture bound to a sampler slot
    pub fn active_texture(&self, slot: u32) -> Option<TextureId> {
        self.active_textures.get(slot as usize).copied().flatten()
    }

    /// Currently bound shader
    pub fn active_shader(&self) -> Option<ShaderId> {
        self.active_shader
    }

    /// Currently bound render target
    pub fn active_render_target(&self) -> Option<RenderTargetId> {
        self.active_render_target
    }

    /// Stage the model-view-projection constant for the bound shader
    ///
    /// Fails (returns false) when no shader is bound.
    pub fn set_shader_constant(&mut self, matrix: &Mat4) -> bool {
        if self.active_shader.is_none() {
            log::warn!("set_shader_constant with no shader bound");
            return false;
        }
        self.device.set_shader_constant(matrix);
        true
    }

    /// Stage the color constant for the bound shader
    pub fn set_shader_color(&mut self, color: [f32; 4]) -> bool {
        if self.active_shader.is_none() {
            log::warn!("set_shader_color with no shader bound");
            return false;
        }
        self.device.set_shader_color(color);
        true
    }

    /// Issue a validated draw call
    ///
    /// Validates that a shader is bound, that the mesh buffer's vertex
    /// layout matches the shader's expected attributes, that the requested
    /// index count is available, and that both resources are device-ready.
    /// Any violation returns false with no side effects; the draw-call
    /// counter increments only on success.
    pub fn draw_mesh_buffer(&mut self, mesh_buffer: MeshBufferId, index_count: u32, mode: DrawMode) -> bool {
        let Some(shader_id) = self.active_shader else {
            log::warn!("draw_mesh_buffer with no shader bound");
            return false;
        };
        let Some(shader) = self.shaders.get(shader_id) else {
            log::warn!("draw_mesh_buffer with a destroyed shader bound");
            return false;
        };
        let Some(buffer) = self.mesh_buffers.get(mesh_buffer) else {
            log::warn!("draw_mesh_buffer with an unknown mesh buffer");
            return false;
        };

        if buffer.vertex_attributes() != shader.vertex_attributes() {
            log::warn!(
                "draw_mesh_buffer vertex layout mismatch: buffer {:?} vs shader {:?}",
                buffer.vertex_attributes(),
                shader.vertex_attributes()
            );
            return false;
        }
        if index_count > buffer.index_count() {
            log::warn!(
                "draw_mesh_buffer index count {} exceeds available {}",
                index_count,
                buffer.index_count()
            );
            return false;
        }
        if !buffer.is_ready() || !shader.is_ready() {
            log::warn!("draw_mesh_buffer with resources not yet device-ready");
            return false;
        }

        if let Err(error) = self.device.draw(mesh_buffer, index_count, mode) {
            log::error!("device draw failed: {error}");
            return false;
        }

        self.draw_call_count += 1;
        true
    }

    /// Map a view-space pixel location (origin top-left, y-down) to
    /// normalized device coordinates (origin center, y-up)
    pub fn view_to_screen_location(&self, position: Vec2) -> Vec2 {
        let x = 2.0 * position.x / self.size.width - 1.0;
        let y = 2.0 * (self.size.height - position.y) / self.size.height - 1.0;

        Vec2::new(x, y)
    }

    /// Map normalized device coordinates back to view-space pixels
    ///
    /// The algebraic inverse of `view_to_screen_location`; the round trip
    /// is exact up to floating-point rounding.
    pub fn screen_to_view_location(&self, position: Vec2) -> Vec2 {
        let x = (position.x + 1.0) / 2.0 * self.size.width;
        let y = self.size.height - (position.y + 1.0) / 2.0 * self.size.height;

        Vec2::new(x, y)
    }

    /// Geometric culling test for a bounding box under a world transform
    ///
    /// Projects the box corners through the camera projection and the world
    /// transform and intersects the resulting bounds with the NDC square.
    /// An empty box has no corners and fails; callers treat an empty box as
    /// "always visible" before reaching this test.
    pub fn check_visibility(&self, transform: &Mat4, bounding_box: &AABB2, camera: &Camera) -> bool {
        use crate::foundation::math::Mat4Ext;

        if bounding_box.is_empty() {
            return false;
        }

        let mvp = camera.projection() * transform;

        let mut projected = AABB2::empty();
        for corner in bounding_box.corners() {
            projected.insert_point(mvp.transform_point2(corner));
        }

        let ndc = AABB2::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));
        projected.intersects(&ndc)
    }
}
