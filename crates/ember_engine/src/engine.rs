//! Engine aggregate
//!
//! Wires the renderer, scene manager, and event dispatcher together and
//! drives the per-frame pipeline. Platform loops (windowing, input) live
//! outside the engine crate and call into this aggregate.

use thiserror::Error;

use crate::core::config::{ConfigError, EngineConfig};
use crate::events::EventDispatcher;
use crate::foundation::math::Size2;
use crate::render::{create_device, RenderError, Renderer};
use crate::scene::SceneManager;

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Rendering system error
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Owner of the engine subsystems
pub struct Engine {
    config: EngineConfig,
    renderer: Renderer,
    scene_manager: SceneManager,
    event_dispatcher: EventDispatcher,
}

impl Engine {
    /// Initialize every subsystem from a configuration
    ///
    /// Backend selection happens here: an unavailable driver is a fatal,
    /// descriptive error rather than a silently dead renderer.
    pub fn init(config: EngineConfig) -> Result<Self, EngineError> {
        log::info!("initializing engine '{}'", config.window.title);

        let device = create_device(config.device.driver)?;
        let mut renderer = Renderer::init(
            device,
            config.window.size(),
            config.window.resizable,
            config.window.fullscreen,
            config.device.clear_color,
        )?;

        let mut scene_manager = SceneManager::new();
        scene_manager.recalculate_projection(config.window.size());

        let mut event_dispatcher = EventDispatcher::new();
        renderer.set_title(&config.window.title, &mut event_dispatcher);
        // The initial title is configuration, not a change worth announcing
        event_dispatcher.clear();

        Ok(Self {
            config,
            renderer,
            scene_manager,
            event_dispatcher,
        })
    }

    /// The configuration the engine was initialized with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The renderer
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Mutable access to the renderer
    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// The scene manager
    pub fn scene_manager(&self) -> &SceneManager {
        &self.scene_manager
    }

    /// Mutable access to the scene manager
    pub fn scene_manager_mut(&mut self) -> &mut SceneManager {
        &mut self.scene_manager
    }

    /// The event dispatcher
    pub fn event_dispatcher(&self) -> &EventDispatcher {
        &self.event_dispatcher
    }

    /// Mutable access to the event dispatcher
    pub fn event_dispatcher_mut(&mut self) -> &mut EventDispatcher {
        &mut self.event_dispatcher
    }

    /// Resize the back buffer, recomputing projections and publishing the
    /// size-change event
    pub fn resize(&mut self, size: Size2) {
        self.renderer.resize(size, &mut self.scene_manager, &mut self.event_dispatcher);
    }

    /// Change the window title, publishing the title-change event
    pub fn set_title(&mut self, title: &str) {
        self.renderer.set_title(title, &mut self.event_dispatcher);
    }

    /// Run one frame: deliver events, clear, visit and draw the scene,
    /// then present
    pub fn render_frame(&mut self) -> Result<(), EngineError> {
        self.event_dispatcher.dispatch_queued();

        self.renderer.clear()?;
        self.scene_manager.draw(&mut self.renderer);
        self.renderer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::core::config::Driver;
    use crate::events::{Event, EventHandler, EventType};
    use crate::foundation::math::Size2;

    struct SizeProbe {
        events: Arc<AtomicUsize>,
        last_width: Arc<AtomicUsize>,
    }

    impl EventHandler for SizeProbe {
        fn on_event(&mut self, event: &Event) -> bool {
            self.events.fetch_add(1, Ordering::SeqCst);
            if let Some(size) = event.get_size() {
                self.last_width.store(size.width as usize, Ordering::SeqCst);
            }
            false
        }
    }

    fn headless_engine() -> Engine {
        Engine::init(EngineConfig::new("test").with_size(800.0, 600.0)).unwrap()
    }

    #[test]
    fn test_unavailable_driver_fails_init() {
        let result = Engine::init(EngineConfig::new("test").with_driver(Driver::Metal));
        assert!(result.is_err());
    }

    #[test]
    fn test_resize_same_size_issues_no_event() {
        let mut engine = headless_engine();
        engine.resize(Size2::new(800.0, 600.0));
        assert_eq!(engine.event_dispatcher().pending_count(), 0);
    }

    #[test]
    fn test_resize_issues_exactly_one_event_with_new_size() {
        use crate::foundation::math::{Mat4Ext, Vec2};
        use crate::scene::{Camera, Layer};

        let mut engine = headless_engine();
        let layer = engine.scene_manager_mut().add_layer(Layer::with_camera(Camera::new()));

        let events = Arc::new(AtomicUsize::new(0));
        let last_width = Arc::new(AtomicUsize::new(0));
        engine.event_dispatcher_mut().register_handler(
            EventType::WindowSizeChange,
            Box::new(SizeProbe { events: events.clone(), last_width: last_width.clone() }),
        );

        engine.resize(Size2::new(1024.0, 768.0));
        assert_eq!(engine.event_dispatcher().pending_count(), 1);

        engine.event_dispatcher_mut().dispatch_queued();
        assert_eq!(events.load(Ordering::SeqCst), 1);
        assert_eq!(last_width.load(Ordering::SeqCst), 1024);
        assert_eq!(engine.renderer().size(), Size2::new(1024.0, 768.0));

        // The camera projection was recomputed against the new size
        let projection = *engine
            .scene_manager()
            .layer(layer)
            .unwrap()
            .camera()
            .unwrap()
            .projection();
        let corner = projection.transform_point2(Vec2::new(512.0, 384.0));
        assert!((corner.x - 1.0).abs() < 1e-5);
        assert!((corner.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_set_title_change_and_no_change() {
        let mut engine = headless_engine();

        engine.set_title("test");
        assert_eq!(engine.event_dispatcher().pending_count(), 0);

        engine.set_title("renamed");
        assert_eq!(engine.event_dispatcher().pending_count(), 1);
        assert_eq!(engine.renderer().title(), "renamed");
    }

    #[test]
    fn test_render_frame_runs_empty_scene() {
        let mut engine = headless_engine();
        engine.render_frame().unwrap();
        assert_eq!(engine.renderer().draw_call_count(), 0);
    }
}
