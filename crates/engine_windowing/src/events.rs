//! Engine-facing window and input events
//! Key principles:
//! - Handler returns bool (true = consumed, stops forwarding)
//! - Registration per event kind (only interested handlers are notified)
//! - Events nobody consumed are queued for polling

use std::collections::{HashMap, VecDeque};

use crate::input::{Key, KeyAction, Modifiers, MouseButton};
use crate::types::{MonitorId, Vec2, Vec2i, WindowId};

const MAX_QUEUED_EVENTS: usize = 4096;

/// Event kind used for handler registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineEventKind {
    /// Mouse moved
    MouseMoved,
    /// Mouse button transition
    MouseButton,
    /// Scroll
    MouseWheel,
    /// Cursor entered or left a window
    MouseEnterLeave,
    /// Key transition
    Key,
    /// Committed text
    TextEntered,
    /// IME composition
    TextEditing,
    /// Window resized
    WindowResized,
    /// Window moved
    WindowMoved,
    /// Focus change
    WindowFocus,
    /// Minimize change
    WindowMinimized,
    /// Content scale change
    WindowContentScale,
    /// Close requested by the user
    WindowCloseRequested,
    /// Window created
    WindowCreated,
    /// Window released
    WindowDestroyed,
    /// Monitor connected
    MonitorConnected,
    /// Monitor disconnected
    MonitorDisconnected,
    /// Keyboard layout changed
    KeyMapChanged,
}

/// Window or input notification raised to the rest of the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Mouse moved
    MouseMoved {
        /// Window under the cursor
        window: WindowId,
        /// Position in framebuffer pixels
        position: Vec2,
    },
    /// Mouse button transition
    MouseButton {
        /// Window
        window: WindowId,
        /// Button
        button: MouseButton,
        /// Transition
        action: KeyAction,
        /// Modifiers
        mods: Modifiers,
        /// Position in framebuffer pixels
        position: Vec2,
    },
    /// Scroll
    MouseWheel {
        /// Window
        window: WindowId,
        /// Offset
        delta: Vec2,
    },
    /// Cursor entered or left a window
    MouseEnterLeave {
        /// Window
        window: WindowId,
        /// True on enter
        entered: bool,
    },
    /// Key transition
    Key {
        /// Window
        window: WindowId,
        /// Key
        key: Key,
        /// Scan code
        scan_code: i32,
        /// Transition
        action: KeyAction,
        /// Modifiers
        mods: Modifiers,
    },
    /// Committed text
    TextEntered {
        /// Window
        window: WindowId,
        /// Text
        text: String,
    },
    /// IME composition
    TextEditing {
        /// Window
        window: WindowId,
        /// Composition
        text: String,
        /// Selection start
        start: i32,
        /// Selection length
        length: i32,
    },
    /// Window resized
    WindowResized {
        /// Window
        window: WindowId,
        /// Framebuffer size in pixels
        framebuffer_size: Vec2i,
        /// Logical size
        window_size: Vec2i,
        /// The framebuffer is empty, most likely because the window was minimized
        minimized_hint: bool,
    },
    /// Window moved
    WindowMoved {
        /// Window
        window: WindowId,
        /// Position
        position: Vec2i,
    },
    /// Focus change
    WindowFocus {
        /// Window
        window: WindowId,
        /// Focused
        focused: bool,
    },
    /// Minimize change
    WindowMinimized {
        /// Window
        window: WindowId,
        /// Minimized
        minimized: bool,
    },
    /// Content scale change
    WindowContentScale {
        /// Window
        window: WindowId,
        /// Scale
        scale: Vec2,
    },
    /// Close requested by the user
    WindowCloseRequested {
        /// Window
        window: WindowId,
    },
    /// Window created
    WindowCreated {
        /// Window
        window: WindowId,
    },
    /// Window released
    WindowDestroyed {
        /// Window
        window: WindowId,
    },
    /// Monitor connected
    MonitorConnected {
        /// Monitor
        monitor: MonitorId,
    },
    /// Monitor disconnected
    MonitorDisconnected {
        /// Monitor
        monitor: MonitorId,
    },
    /// Keyboard layout changed
    KeyMapChanged,
}

impl EngineEvent {
    /// Registration kind of this event
    pub fn kind(&self) -> EngineEventKind {
        match self {
            EngineEvent::MouseMoved { .. } => EngineEventKind::MouseMoved,
            EngineEvent::MouseButton { .. } => EngineEventKind::MouseButton,
            EngineEvent::MouseWheel { .. } => EngineEventKind::MouseWheel,
            EngineEvent::MouseEnterLeave { .. } => EngineEventKind::MouseEnterLeave,
            EngineEvent::Key { .. } => EngineEventKind::Key,
            EngineEvent::TextEntered { .. } => EngineEventKind::TextEntered,
            EngineEvent::TextEditing { .. } => EngineEventKind::TextEditing,
            EngineEvent::WindowResized { .. } => EngineEventKind::WindowResized,
            EngineEvent::WindowMoved { .. } => EngineEventKind::WindowMoved,
            EngineEvent::WindowFocus { .. } => EngineEventKind::WindowFocus,
            EngineEvent::WindowMinimized { .. } => EngineEventKind::WindowMinimized,
            EngineEvent::WindowContentScale { .. } => EngineEventKind::WindowContentScale,
            EngineEvent::WindowCloseRequested { .. } => EngineEventKind::WindowCloseRequested,
            EngineEvent::WindowCreated { .. } => EngineEventKind::WindowCreated,
            EngineEvent::WindowDestroyed { .. } => EngineEventKind::WindowDestroyed,
            EngineEvent::MonitorConnected { .. } => EngineEventKind::MonitorConnected,
            EngineEvent::MonitorDisconnected { .. } => EngineEventKind::MonitorDisconnected,
            EngineEvent::KeyMapChanged => EngineEventKind::KeyMapChanged,
        }
    }
}

/// Engine event handler
/// Returns true if event was consumed (stops forwarding)
/// Returns false to allow forwarding to other handlers
pub trait EngineEventHandler: Send {
    /// Handle an event, return true if consumed
    fn on_event(&mut self, event: &EngineEvent) -> bool;
}

impl<F> EngineEventHandler for F
where
    F: FnMut(&EngineEvent) -> bool + Send,
{
    fn on_event(&mut self, event: &EngineEvent) -> bool {
        self(event)
    }
}

/// Handler registry plus a queue of unconsumed events
pub struct EngineEventBus {
    handlers: HashMap<EngineEventKind, Vec<Box<dyn EngineEventHandler>>>,
    queued: VecDeque<EngineEvent>,
    overflowed: bool,
}

impl EngineEventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            queued: VecDeque::new(),
            overflowed: false,
        }
    }

    /// Register a handler for one event kind
    pub fn register_handler(&mut self, kind: EngineEventKind, handler: Box<dyn EngineEventHandler>) {
        self.handlers.entry(kind).or_default().push(handler);
    }

    /// Deliver an event to its handlers, queueing it if none consumed it
    pub fn emit(&mut self, event: EngineEvent) {
        if let Some(handlers) = self.handlers.get_mut(&event.kind()) {
            for handler in handlers.iter_mut() {
                if handler.on_event(&event) {
                    return;
                }
            }
        }

        if self.queued.len() >= MAX_QUEUED_EVENTS {
            if !self.overflowed {
                log::warn!("Engine event queue full, dropping oldest events");
                self.overflowed = true;
            }
            self.queued.pop_front();
        }
        self.queued.push_back(event);
    }

    /// Take every queued event, oldest first
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        self.overflowed = false;
        self.queued.drain(..).collect()
    }

    /// Number of queued events
    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }
}

impl Default for EngineEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn close(id: u32) -> EngineEvent {
        EngineEvent::WindowCloseRequested { window: WindowId(id) }
    }

    #[test]
    fn test_unhandled_events_are_queued() {
        let mut bus = EngineEventBus::new();
        bus.emit(close(1));
        bus.emit(EngineEvent::KeyMapChanged);

        assert_eq!(bus.queued_len(), 2);
        assert_eq!(bus.take_events(), vec![close(1), EngineEvent::KeyMapChanged]);
        assert_eq!(bus.queued_len(), 0);
    }

    #[test]
    fn test_event_consumption() {
        let mut bus = EngineEventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        bus.register_handler(
            EngineEventKind::WindowCloseRequested,
            Box::new(move |_: &EngineEvent| {
                first.lock().unwrap().push("first");
                true
            }),
        );
        let second = Arc::clone(&seen);
        bus.register_handler(
            EngineEventKind::WindowCloseRequested,
            Box::new(move |_: &EngineEvent| {
                second.lock().unwrap().push("second");
                false
            }),
        );

        bus.emit(close(1));
        assert_eq!(*seen.lock().unwrap(), vec!["first"]);
        assert_eq!(bus.queued_len(), 0);
    }

    #[test]
    fn test_non_consuming_handler_forwards_to_queue() {
        let mut bus = EngineEventBus::new();
        bus.register_handler(EngineEventKind::KeyMapChanged, Box::new(|_: &EngineEvent| false));
        bus.emit(EngineEvent::KeyMapChanged);
        assert_eq!(bus.queued_len(), 1);
    }

    #[test]
    fn test_queue_is_capped() {
        let mut bus = EngineEventBus::new();
        for i in 0..(MAX_QUEUED_EVENTS as u32 + 10) {
            bus.emit(close(i));
        }
        let events = bus.take_events();
        assert_eq!(events.len(), MAX_QUEUED_EVENTS);
        assert_eq!(events[0], close(10));
    }
}
