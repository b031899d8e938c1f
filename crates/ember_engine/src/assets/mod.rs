//! Asset loading utilities
//!
//! Only image decoding lives here; model and audio loading belong to
//! external loader crates.

pub mod image_loader;

pub use image_loader::ImageData;

use thiserror::Error;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset could not be loaded
    #[error("Asset load failed: {0}")]
    LoadFailed(String),
}
