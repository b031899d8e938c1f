//! Graphics backend implementations
//!
//! Only the headless device ships with the engine crate; GPU backends
//! (OpenGL, Direct3D 11, Metal) live in backend crates that implement
//! [`RenderDevice`] against their native APIs.

mod headless;

pub use headless::HeadlessDevice;

use crate::core::config::Driver;
use crate::render::api::RenderDevice;
use crate::render::{RenderError, RenderResult};

/// Create the device for the configured driver
///
/// Fails with a descriptive error when the driver's backend is not linked
/// into this build; backend initialization failure is fatal, never silent.
pub fn create_device(driver: Driver) -> RenderResult<Box<dyn RenderDevice>> {
    match driver {
        Driver::Headless => Ok(Box::new(HeadlessDevice::new())),
        Driver::OpenGl | Driver::Direct3D11 | Driver::Metal => Err(RenderError::Initialization(
            format!("driver {driver:?} backend is not linked into this build"),
        )),
    }
}
