//! Native windowing backends
//!
//! [`NativeBackend`] is the seam between the windowing thread and whatever
//! native library owns windows, contexts and the OS event queue. A backend
//! value is created and used on one thread only (the windowing thread), so
//! implementations may hold `!Send` native state. The only piece that crosses
//! threads is the [`LoopWaker`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cursor::CursorImage;
use crate::event::{Event, NativeWindowState};
use crate::input::{KeyMap, StandardCursorShape};
use crate::monitor::{MonitorChange, MonitorProps};
use crate::types::{GlContextSpec, IntRect, Vec2i, WindowCreateParameters, WindowId};

pub mod headless;

#[cfg(feature = "glfw-backend")]
pub mod glfw;

/// Windowing-thread table of live native windows, keyed by logical id
pub type WindowTable<W> = BTreeMap<WindowId, W>;

/// Interrupts a blocked native wait from another thread
pub trait LoopWaker: Send + Sync {
    /// Wake the windowing thread if it is waiting for native events
    fn wake(&self);
}

/// Waker for backends without a usable cross-thread wake primitive
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWaker;

impl LoopWaker for NoopWaker {
    fn wake(&self) {}
}

/// Native window library driven by the windowing thread
///
/// Every method runs on the windowing thread. Window, monitor and cursor
/// handles never leave it; the game thread only sees logical ids.
pub trait NativeBackend {
    /// Native window handle (window plus its context)
    type Window;
    /// Native cursor handle
    type Cursor;
    /// Native monitor handle
    type Monitor: PartialEq;

    /// Backend name used in descriptions and logs
    fn name(&self) -> &'static str;

    /// Waker handed to command senders
    fn waker(&self) -> Arc<dyn LoopWaker>;

    /// Whether [`LoopWaker::wake`] reliably interrupts [`NativeBackend::wait_events`].
    ///
    /// When false the loop never waits indefinitely.
    fn wake_is_reliable(&self) -> bool;

    /// Block until native events arrive, the waker fires, or `timeout` elapses
    fn wait_events(&mut self, timeout: Option<Duration>);

    /// Process pending native events without blocking
    fn poll_events(&mut self);

    /// Translate every native event received so far into `out`, in arrival order
    fn drain_events(&mut self, windows: &mut WindowTable<Self::Window>, out: &mut Vec<Event>);

    /// Monitors connected at startup
    fn enumerate_monitors(&mut self) -> Vec<(Self::Monitor, MonitorProps)>;

    /// Monitor hotplug notifications since the last call
    fn poll_monitor_changes(&mut self) -> Vec<MonitorChange<Self::Monitor>>;

    /// Snapshot of the keyboard layout
    fn key_map(&mut self) -> KeyMap;

    /// Create a window and, if `gl_spec` is given, its context.
    ///
    /// Errors carry the native error description.
    fn create_window(
        &mut self,
        id: WindowId,
        gl_spec: Option<&GlContextSpec>,
        params: &WindowCreateParameters,
        fullscreen_on: Option<&Self::Monitor>,
        share: Option<&Self::Window>,
        owner: Option<&Self::Window>,
    ) -> Result<(Self::Window, NativeWindowState), String>;

    /// Release a window. `had_owner` windows have their owner cleared first.
    fn destroy_window(&mut self, window: Self::Window, had_owner: bool);

    /// Change the title
    fn set_title(&mut self, window: &mut Self::Window, title: &str);

    /// Show or hide
    fn set_visible(&mut self, window: &mut Self::Window, visible: bool);

    /// Resize the logical window
    fn set_size(&mut self, window: &mut Self::Window, size: Vec2i);

    /// Go fullscreen on `monitor`, or the monitor the window is on
    fn set_fullscreen(&mut self, window: &mut Self::Window, monitor: Option<&Self::Monitor>);

    /// Leave fullscreen
    fn set_windowed(&mut self, window: &mut Self::Window, size: Vec2i, position: Vec2i);

    /// Flash the window to request attention
    fn request_attention(&mut self, window: &mut Self::Window);

    /// Present the back buffer
    fn swap_buffers(&mut self, window: &mut Self::Window);

    /// Set the swap interval of the window's context
    fn set_vsync(&mut self, window: &mut Self::Window, enabled: bool);

    /// Create one of the standard cursors
    fn create_standard_cursor(&mut self, shape: StandardCursorShape) -> Result<Self::Cursor, String>;

    /// Create a custom cursor from a bitmap
    fn create_cursor(&mut self, image: &CursorImage, hotspot: Vec2i) -> Result<Self::Cursor, String>;

    /// Release a cursor
    fn destroy_cursor(&mut self, cursor: Self::Cursor) {
        drop(cursor);
    }

    /// Replace the window icon, or restore the platform default for `None`
    fn set_icon(&mut self, window: &mut Self::Window, image: Option<&CursorImage>) -> Result<(), String>;

    /// Show `cursor` over the window, or the default cursor for `None`
    fn set_cursor(&mut self, window: &mut Self::Window, cursor: Option<&Self::Cursor>);

    /// Read the clipboard
    fn clipboard_get(&mut self, window: &mut Self::Window) -> Option<String>;

    /// Write the clipboard
    fn clipboard_set(&mut self, window: &mut Self::Window, text: &str);

    /// Begin IME text input
    fn text_input_start(&mut self, window: &mut Self::Window);

    /// End IME text input
    fn text_input_stop(&mut self, window: &mut Self::Window);

    /// Place the IME candidate window. `rect` is in logical window coordinates.
    fn text_input_set_rect(&mut self, window: &mut Self::Window, rect: IntRect, cursor: i32);

    /// Tear down the native library after every window is gone
    fn shutdown(&mut self) {}
}
