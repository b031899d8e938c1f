//! Backend abstraction for the rendering system
//!
//! Defines the trait that rendering backends implement to provide a
//! consistent interface for the high-level renderer.

mod device;

pub use device::{RenderDevice, DeviceResult};
