//! Texture resource record
//!
//! Holds the engine-side description of a GPU texture. Pixel storage lives
//! on the device; the record tracks size, mutability, and the mipmap chain
//! so uploads can be validated before they reach the backend.

use slotmap::new_key_type;

use crate::foundation::math::Size2;
use crate::render::{RenderError, RenderResult};

new_key_type! {
    /// Handle to a texture owned by the renderer
    pub struct TextureId;
}

/// Engine-side description of a GPU texture
#[derive(Debug, Clone)]
pub struct Texture {
    filename: Option<String>,
    size: Size2,
    dynamic: bool,
    mipmaps: bool,
    mipmap_sizes: Vec<Size2>,
    ready: bool,
}

impl Texture {
    /// Create a texture record, validating the requested size
    pub(crate) fn new(size: Size2, dynamic: bool, mipmaps: bool) -> RenderResult<Self> {
        if size.is_degenerate() {
            return Err(RenderError::ResourceCreation(format!(
                "invalid texture size {}x{}", size.width, size.height
            )));
        }

        Ok(Self {
            filename: None,
            size,
            dynamic,
            mipmaps,
            mipmap_sizes: Self::mipmap_chain(size, mipmaps),
            ready: false,
        })
    }

    /// Sizes of every mipmap level, starting at the base level
    fn mipmap_chain(size: Size2, mipmaps: bool) -> Vec<Size2> {
        let mut sizes = vec![size];

        if mipmaps {
            let mut width = size.width;
            let mut height = size.height;
            while width > 1.0 || height > 1.0 {
                width = (width / 2.0).floor().max(1.0);
                height = (height / 2.0).floor().max(1.0);
                sizes.push(Size2::new(width, height));
            }
        }

        sizes
    }

    pub(crate) fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = Some(filename.into());
    }

    pub(crate) fn set_ready(&mut self) {
        self.ready = true;
    }

    /// Validate a base-level upload against this record
    ///
    /// Dynamic textures accept new pixel data without reallocation, so the
    /// incoming size must match the allocated size exactly.
    pub(crate) fn validate_upload(&self, size: Size2) -> RenderResult<()> {
        if !self.dynamic {
            return Err(RenderError::Upload("texture is not dynamic".to_string()));
        }
        if size != self.size {
            return Err(RenderError::Upload(format!(
                "upload size {}x{} does not match texture size {}x{}",
                size.width, size.height, self.size.width, self.size.height
            )));
        }
        Ok(())
    }

    /// Validate a mipmap-level upload against this record
    pub(crate) fn validate_mipmap_upload(&self, level: u32) -> RenderResult<()> {
        if !self.dynamic {
            return Err(RenderError::Upload("texture is not dynamic".to_string()));
        }
        if level as usize >= self.mipmap_sizes.len() {
            return Err(RenderError::Upload(format!(
                "mipmap level {} out of range ({} levels)",
                level,
                self.mipmap_sizes.len()
            )));
        }
        Ok(())
    }

    /// Source file this texture was loaded from, if any
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Base level size
    pub fn size(&self) -> Size2 {
        self.size
    }

    /// Whether the pixel data can be re-uploaded
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Whether a mipmap chain was allocated
    pub fn has_mipmaps(&self) -> bool {
        self.mipmaps
    }

    /// Number of mipmap levels, counting the base level
    pub fn mipmap_level_count(&self) -> u32 {
        self.mipmap_sizes.len() as u32
    }

    /// Whether the device has acknowledged the texture's storage
    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mipmap_chain_reaches_one_by_one() {
        let texture = Texture::new(Size2::new(8.0, 4.0), false, true).unwrap();
        // 8x4, 4x2, 2x1, 1x1
        assert_eq!(texture.mipmap_level_count(), 4);
    }

    #[test]
    fn test_no_mipmaps_single_level() {
        let texture = Texture::new(Size2::new(64.0, 64.0), false, false).unwrap();
        assert_eq!(texture.mipmap_level_count(), 1);
    }

    #[test]
    fn test_degenerate_size_rejected() {
        assert!(Texture::new(Size2::new(0.0, 32.0), false, false).is_err());
    }

    #[test]
    fn test_static_texture_rejects_upload() {
        let texture = Texture::new(Size2::new(16.0, 16.0), false, false).unwrap();
        assert!(texture.validate_upload(Size2::new(16.0, 16.0)).is_err());
    }

    #[test]
    fn test_dynamic_texture_upload_size_must_match() {
        let texture = Texture::new(Size2::new(16.0, 16.0), true, false).unwrap();
        assert!(texture.validate_upload(Size2::new(16.0, 16.0)).is_ok());
        assert!(texture.validate_upload(Size2::new(32.0, 16.0)).is_err());
    }
}
