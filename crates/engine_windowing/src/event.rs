//! Events sent from the windowing thread back to the game thread
//!
//! Every payload is copied out of the native callback that produced it.

use crate::command::{ClipboardSlot, WindowCreateSlot};
use crate::input::{Key, KeyAction, KeyMap, Modifiers, MouseButton};
use crate::monitor::MonitorProps;
use crate::types::{MonitorId, Vec2, Vec2i, WindowId};

/// Native window state captured right after creation
#[derive(Debug, Clone, PartialEq)]
pub struct NativeWindowState {
    /// Framebuffer size in pixels
    pub framebuffer_size: Vec2i,
    /// Logical window size
    pub window_size: Vec2i,
    /// Window position
    pub position: Vec2i,
    /// Content (DPI) scale
    pub content_scale: Vec2,
    /// Whether the window is shown
    pub visible: bool,
    /// Whether the window has input focus
    pub focused: bool,
    /// X11 window id, on X11 backends only
    pub x11_id: Option<u32>,
}

/// Successful window creation as reported by the windowing thread
#[derive(Debug, Clone, PartialEq)]
pub struct WindowCreated {
    /// Newly allocated logical id
    pub id: WindowId,
    /// Owner the window was created with
    pub owner: Option<WindowId>,
    /// Title the window was created with
    pub title: String,
    /// Initial native state
    pub state: NativeWindowState,
}

/// Outcome of a window creation command
pub type WindowCreateResult = Result<WindowCreated, String>;

/// One notification from the windowing thread
#[derive(Debug)]
pub enum Event {
    /// Cursor moved, in logical window coordinates
    MouseMove {
        /// Window under the cursor
        window: WindowId,
        /// Logical position
        position: Vec2,
    },
    /// Mouse button pressed or released
    MouseButton {
        /// Window receiving the click
        window: WindowId,
        /// Button
        button: MouseButton,
        /// Transition
        action: KeyAction,
        /// Held modifiers
        mods: Modifiers,
    },
    /// Scroll wheel or touchpad scroll
    MouseWheel {
        /// Window receiving the scroll
        window: WindowId,
        /// Scroll offset
        delta: Vec2,
    },
    /// Cursor entered or left the window
    MouseEnterLeave {
        /// Affected window
        window: WindowId,
        /// True on enter
        entered: bool,
    },
    /// Keyboard key transition
    Key {
        /// Focused window
        window: WindowId,
        /// Layout-independent key
        key: Key,
        /// Platform scan code
        scan_code: i32,
        /// Transition
        action: KeyAction,
        /// Held modifiers
        mods: Modifiers,
    },
    /// Committed text input
    Text {
        /// Focused window
        window: WindowId,
        /// UTF-8 text
        text: String,
    },
    /// IME composition update
    TextEditing {
        /// Focused window
        window: WindowId,
        /// Composition string
        text: String,
        /// Selection start, in characters
        start: i32,
        /// Selection length, in characters
        length: i32,
    },
    /// Framebuffer and/or logical size changed
    WindowResized {
        /// Resized window
        window: WindowId,
        /// New framebuffer size in pixels
        framebuffer_size: Vec2i,
        /// New logical size
        window_size: Vec2i,
    },
    /// Window moved
    WindowMoved {
        /// Moved window
        window: WindowId,
        /// New position
        position: Vec2i,
    },
    /// Focus gained or lost
    WindowFocus {
        /// Affected window
        window: WindowId,
        /// Whether the window is now focused
        focused: bool,
    },
    /// Minimized or restored
    WindowMinimized {
        /// Affected window
        window: WindowId,
        /// Whether the window is now minimized
        minimized: bool,
    },
    /// Content (DPI) scale changed
    WindowContentScale {
        /// Affected window
        window: WindowId,
        /// New scale
        scale: Vec2,
    },
    /// User asked to close the window
    WindowClose {
        /// Window to close
        window: WindowId,
    },
    /// A `CreateWindow` command finished, successfully or not
    WindowCreateCompleted {
        /// Creation outcome
        result: WindowCreateResult,
        /// Slot to fulfil on the game thread
        slot: WindowCreateSlot,
    },
    /// Native resources of a destroyed window were released
    WindowDestroyed {
        /// Released window
        window: WindowId,
    },
    /// A `GetClipboard` command finished
    ClipboardText {
        /// Clipboard contents, if readable
        text: Option<String>,
        /// Slot to fulfil on the game thread
        slot: ClipboardSlot,
    },
    /// A monitor is present (startup enumeration or hotplug)
    MonitorSetup {
        /// Allocated monitor id
        id: MonitorId,
        /// Monitor description
        props: MonitorProps,
    },
    /// A monitor was disconnected
    MonitorDestroyed {
        /// Removed monitor
        id: MonitorId,
    },
    /// Keyboard layout snapshot
    KeyMapChanged(KeyMap),
}

impl Event {
    /// Short variant name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Event::MouseMove { .. } => "MouseMove",
            Event::MouseButton { .. } => "MouseButton",
            Event::MouseWheel { .. } => "MouseWheel",
            Event::MouseEnterLeave { .. } => "MouseEnterLeave",
            Event::Key { .. } => "Key",
            Event::Text { .. } => "Text",
            Event::TextEditing { .. } => "TextEditing",
            Event::WindowResized { .. } => "WindowResized",
            Event::WindowMoved { .. } => "WindowMoved",
            Event::WindowFocus { .. } => "WindowFocus",
            Event::WindowMinimized { .. } => "WindowMinimized",
            Event::WindowContentScale { .. } => "WindowContentScale",
            Event::WindowClose { .. } => "WindowClose",
            Event::WindowCreateCompleted { .. } => "WindowCreateCompleted",
            Event::WindowDestroyed { .. } => "WindowDestroyed",
            Event::ClipboardText { .. } => "ClipboardText",
            Event::MonitorSetup { .. } => "MonitorSetup",
            Event::MonitorDestroyed { .. } => "MonitorDestroyed",
            Event::KeyMapChanged(_) => "KeyMapChanged",
        }
    }

    /// Window this event refers to, if any
    pub fn window(&self) -> Option<WindowId> {
        match self {
            Event::MouseMove { window, .. }
            | Event::MouseButton { window, .. }
            | Event::MouseWheel { window, .. }
            | Event::MouseEnterLeave { window, .. }
            | Event::Key { window, .. }
            | Event::Text { window, .. }
            | Event::TextEditing { window, .. }
            | Event::WindowResized { window, .. }
            | Event::WindowMoved { window, .. }
            | Event::WindowFocus { window, .. }
            | Event::WindowMinimized { window, .. }
            | Event::WindowContentScale { window, .. }
            | Event::WindowClose { window }
            | Event::WindowDestroyed { window } => Some(*window),
            Event::WindowCreateCompleted { result, .. } => result.as_ref().ok().map(|c| c.id),
            Event::ClipboardText { .. }
            | Event::MonitorSetup { .. }
            | Event::MonitorDestroyed { .. }
            | Event::KeyMapChanged(_) => None,
        }
    }
}
