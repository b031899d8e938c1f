//! Event dispatch system
//!
//! Key principles:
//! - Typed arguments carried on the event itself (no order dependency)
//! - Handler returns bool (true = consumed, stops forwarding)
//! - Registration system (only notify interested handlers)
//! - Queuing support (events are delivered when the queue is dispatched)

use std::collections::HashMap;

use crate::foundation::math::Size2;

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Back buffer size changed
    WindowSizeChange,
    /// Window title changed
    WindowTitleChange,
    /// Window entered or left fullscreen
    WindowFullscreenChange,
}

/// Subsystem that published an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    /// Published by the renderer
    Renderer,
    /// Published by the platform window
    Window,
}

/// Variant for type-safe event arguments
#[derive(Debug, Clone)]
pub enum EventArg {
    /// Back buffer size
    Size(Size2),
    /// Window title
    Title(String),
    /// Fullscreen state
    Fullscreen(bool),
}

/// Event with type ID, source, and keyed arguments
#[derive(Debug, Clone)]
pub struct Event {
    /// Type of event
    pub event_type: EventType,
    /// Subsystem that published the event
    pub source: EventSource,
    args: HashMap<&'static str, EventArg>,
}

impl Event {
    /// Create a new event with the given type and source
    pub fn new(event_type: EventType, source: EventSource) -> Self {
        Self {
            event_type,
            source,
            args: HashMap::new(),
        }
    }

    /// Add an argument to the event (builder pattern)
    pub fn with_arg(mut self, key: &'static str, value: EventArg) -> Self {
        self.args.insert(key, value);
        self
    }

    /// Get an argument by key
    pub fn get_arg(&self, key: &str) -> Option<&EventArg> {
        self.args.get(key)
    }

    /// Get the size argument if present
    pub fn get_size(&self) -> Option<Size2> {
        if let Some(EventArg::Size(size)) = self.get_arg("size") {
            Some(*size)
        } else {
            None
        }
    }

    /// Get the title argument if present
    pub fn get_title(&self) -> Option<&str> {
        if let Some(EventArg::Title(title)) = self.get_arg("title") {
            Some(title)
        } else {
            None
        }
    }
}

/// Event handler trait
///
/// Returns true if the event was consumed (stops forwarding), false to allow
/// forwarding to other handlers.
pub trait EventHandler {
    /// Handle an event, return true if consumed
    fn on_event(&mut self, event: &Event) -> bool;
}

/// Event dispatcher with registration and queuing
///
/// Follows the chain of responsibility pattern: handlers are notified in
/// registration order until one consumes the event.
#[derive(Default)]
pub struct EventDispatcher {
    queue: Vec<Event>,
    handlers: HashMap<EventType, Vec<Box<dyn EventHandler>>>,
}

impl EventDispatcher {
    /// Create a new empty event dispatcher
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a specific event type
    ///
    /// Only handlers registered for this type will be notified.
    pub fn register_handler(&mut self, event_type: EventType, handler: Box<dyn EventHandler>) {
        self.handlers
            .entry(event_type)
            .or_default()
            .push(handler);
    }

    /// Queue an event for delivery on the next dispatch
    pub fn dispatch_event(&mut self, event: Event) {
        self.queue.push(event);
    }

    /// Number of events waiting for delivery
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Deliver all pending events
    pub fn dispatch_queued(&mut self) {
        let queued = std::mem::take(&mut self.queue);
        for event in queued {
            self.deliver(&event);
        }
    }

    /// Deliver a single event to registered handlers
    ///
    /// Stops on the first handler that returns true (consumed).
    fn deliver(&mut self, event: &Event) {
        if let Some(handlers) = self.handlers.get_mut(&event.event_type) {
            for handler in handlers.iter_mut() {
                if handler.on_event(event) {
                    // Event consumed, stop forwarding
                    break;
                }
            }
        }
    }

    /// Clear all queued events (useful for state transitions)
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        received: Arc<AtomicUsize>,
        consume: bool,
    }

    impl EventHandler for CountingHandler {
        fn on_event(&mut self, _event: &Event) -> bool {
            self.received.fetch_add(1, Ordering::SeqCst);
            self.consume
        }
    }

    #[test]
    fn test_queued_dispatch() {
        let mut dispatcher = EventDispatcher::new();
        let received = Arc::new(AtomicUsize::new(0));
        dispatcher.register_handler(
            EventType::WindowSizeChange,
            Box::new(CountingHandler { received: received.clone(), consume: false }),
        );

        let event = Event::new(EventType::WindowSizeChange, EventSource::Renderer)
            .with_arg("size", EventArg::Size(Size2::new(640.0, 480.0)));
        dispatcher.dispatch_event(event);
        assert_eq!(dispatcher.pending_count(), 1);
        assert_eq!(received.load(Ordering::SeqCst), 0);

        dispatcher.dispatch_queued();
        assert_eq!(dispatcher.pending_count(), 0);
        assert_eq!(received.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_event_consumption_stops_forwarding() {
        let mut dispatcher = EventDispatcher::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        dispatcher.register_handler(
            EventType::WindowTitleChange,
            Box::new(CountingHandler { received: first.clone(), consume: true }),
        );
        dispatcher.register_handler(
            EventType::WindowTitleChange,
            Box::new(CountingHandler { received: second.clone(), consume: false }),
        );

        dispatcher.dispatch_event(Event::new(EventType::WindowTitleChange, EventSource::Renderer));
        dispatcher.dispatch_queued();

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unregistered_type_is_ignored() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.dispatch_event(Event::new(EventType::WindowFullscreenChange, EventSource::Window));
        dispatcher.dispatch_queued();
        assert_eq!(dispatcher.pending_count(), 0);
    }

    #[test]
    fn test_event_args() {
        let event = Event::new(EventType::WindowTitleChange, EventSource::Renderer)
            .with_arg("title", EventArg::Title("ember".to_string()))
            .with_arg("size", EventArg::Size(Size2::new(800.0, 600.0)));

        assert_eq!(event.get_title(), Some("ember"));
        assert_eq!(event.get_size(), Some(Size2::new(800.0, 600.0)));
    }
}
