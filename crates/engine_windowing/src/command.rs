//! Commands sent from the game thread to the windowing thread
//!
//! Commands carry copied data and logical handles only. The windowing thread
//! resolves handles against its own registries before touching anything native.

use std::fmt;

use crate::cursor::CursorImage;
use crate::slot::ResultSlot;
use crate::types::{
    CursorId, GlContextSpec, IntRect, MonitorId, Vec2i, WindowCreateParameters, WindowId,
};

/// Result slot filled when a window creation round trip completes
pub type WindowCreateSlot = ResultSlot<Result<WindowId, String>>;

/// Result slot filled when a clipboard read completes
pub type ClipboardSlot = ResultSlot<Option<String>>;

/// Action executed on the windowing thread
pub type WindowThreadAction = Box<dyn FnOnce() + Send + 'static>;

/// One operation for the windowing thread
pub enum Command {
    /// Create a native window (and context). Replies with `Event::WindowCreateCompleted`.
    CreateWindow {
        /// Context to create with the window, if any
        gl_spec: Option<GlContextSpec>,
        /// Window parameters
        params: WindowCreateParameters,
        /// Window whose context is shared with the new one
        share: Option<WindowId>,
        /// Owner (parent) window
        owner: Option<WindowId>,
        /// Reply slot
        slot: WindowCreateSlot,
    },
    /// Release a native window
    DestroyWindow {
        /// Window to destroy
        window: WindowId,
        /// Whether the window was created with an owner
        had_owner: bool,
    },
    /// Change the title
    SetTitle {
        /// Target window
        window: WindowId,
        /// New title
        title: String,
    },
    /// Show or hide
    SetVisible {
        /// Target window
        window: WindowId,
        /// Visibility
        visible: bool,
    },
    /// Resize the logical window
    SetSize {
        /// Target window
        window: WindowId,
        /// New logical size
        size: Vec2i,
    },
    /// Go fullscreen on a specific monitor
    SetMonitor {
        /// Target window
        window: WindowId,
        /// Monitor to occupy
        monitor: MonitorId,
    },
    /// Go fullscreen on the monitor the window is on
    SetFullscreen {
        /// Target window
        window: WindowId,
    },
    /// Leave fullscreen, restoring size and position
    SetWindowed {
        /// Target window
        window: WindowId,
        /// Restored logical size
        size: Vec2i,
        /// Restored position
        position: Vec2i,
    },
    /// Flash the taskbar entry or equivalent
    RequestAttention {
        /// Target window
        window: WindowId,
    },
    /// Present the back buffer
    SwapBuffers {
        /// Target window
        window: WindowId,
    },
    /// Toggle vertical sync on a window's context
    SetVSync {
        /// Target window
        window: WindowId,
        /// Whether to sync to vblank
        enabled: bool,
    },
    /// Create a native cursor under an already allocated id
    CreateCursor {
        /// Id allocated game-side
        cursor: CursorId,
        /// Copied bitmap
        image: CursorImage,
        /// Hotspot in bitmap pixels
        hotspot: Vec2i,
    },
    /// Release a custom cursor
    DestroyCursor {
        /// Cursor to destroy
        cursor: CursorId,
    },
    /// Replace the window icon (`None` restores the default)
    SetIcon {
        /// Target window
        window: WindowId,
        /// Copied bitmap
        image: Option<CursorImage>,
    },
    /// Assign a cursor to a window (`None` restores the default)
    SetCursor {
        /// Target window
        window: WindowId,
        /// Cursor to show
        cursor: Option<CursorId>,
    },
    /// Read the clipboard. Replies with `Event::ClipboardText`.
    GetClipboard {
        /// Window used for clipboard access
        window: WindowId,
        /// Reply slot
        slot: ClipboardSlot,
    },
    /// Write the clipboard
    SetClipboard {
        /// Window used for clipboard access
        window: WindowId,
        /// Text to store
        text: String,
    },
    /// Begin IME text input
    TextInputStart {
        /// Target window
        window: WindowId,
    },
    /// End IME text input
    TextInputStop {
        /// Target window
        window: WindowId,
    },
    /// Position the IME candidate window
    TextInputSetRect {
        /// Target window
        window: WindowId,
        /// Text area in logical coordinates
        rect: IntRect,
        /// Cursor offset in logical coordinates
        cursor: i32,
    },
    /// Run an arbitrary action on the windowing thread
    RunAction(WindowThreadAction),
    /// Stop the windowing loop
    Terminate,
}

impl Command {
    /// Short variant name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Command::CreateWindow { .. } => "CreateWindow",
            Command::DestroyWindow { .. } => "DestroyWindow",
            Command::SetTitle { .. } => "SetTitle",
            Command::SetVisible { .. } => "SetVisible",
            Command::SetSize { .. } => "SetSize",
            Command::SetMonitor { .. } => "SetMonitor",
            Command::SetFullscreen { .. } => "SetFullscreen",
            Command::SetWindowed { .. } => "SetWindowed",
            Command::RequestAttention { .. } => "RequestAttention",
            Command::SwapBuffers { .. } => "SwapBuffers",
            Command::SetVSync { .. } => "SetVSync",
            Command::CreateCursor { .. } => "CreateCursor",
            Command::DestroyCursor { .. } => "DestroyCursor",
            Command::SetIcon { .. } => "SetIcon",
            Command::SetCursor { .. } => "SetCursor",
            Command::GetClipboard { .. } => "GetClipboard",
            Command::SetClipboard { .. } => "SetClipboard",
            Command::TextInputStart { .. } => "TextInputStart",
            Command::TextInputStop { .. } => "TextInputStop",
            Command::TextInputSetRect { .. } => "TextInputSetRect",
            Command::RunAction(_) => "RunAction",
            Command::Terminate => "Terminate",
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::CreateWindow { params, share, owner, .. } => f
                .debug_struct("CreateWindow")
                .field("params", params)
                .field("share", share)
                .field("owner", owner)
                .finish_non_exhaustive(),
            Command::SetTitle { window, title } => f
                .debug_struct("SetTitle")
                .field("window", window)
                .field("title", title)
                .finish(),
            Command::SetVisible { window, visible } => f
                .debug_struct("SetVisible")
                .field("window", window)
                .field("visible", visible)
                .finish(),
            other => f.write_str(other.kind()),
        }
    }
}
