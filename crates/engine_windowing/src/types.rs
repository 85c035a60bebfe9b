//! Shared value types: logical handles, rectangles and window creation parameters
//!
//! Everything in here is plain data. None of it refers to a native resource,
//! so all of it may freely cross the game/windowing thread boundary.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use nalgebra::Vector2;

/// Integer 2D vector, used for sizes and positions
pub type Vec2i = Vector2<i32>;

/// Float 2D vector, used for scales, ratios and mouse positions
pub type Vec2 = Vector2<f32>;

macro_rules! logical_handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// Raw integer value of the handle
            pub fn value(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

logical_handle!(
    /// Logical window handle. Allocated by the windowing thread on creation.
    WindowId,
    "window"
);

logical_handle!(
    /// Logical monitor handle. Allocated by the windowing thread on connect.
    MonitorId,
    "monitor"
);

logical_handle!(
    /// Logical cursor handle. Standard shapes own a fixed range, custom
    /// cursors are allocated game-side before their create command is sent.
    CursorId,
    "cursor"
);

/// Integer rectangle in pixel coordinates (right/bottom exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntRect {
    /// Left edge
    pub left: i32,
    /// Top edge
    pub top: i32,
    /// Right edge
    pub right: i32,
    /// Bottom edge
    pub bottom: i32,
}

impl IntRect {
    /// Create a rectangle from its edges
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Create a rectangle from a position and a size
    pub fn from_dimensions(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Width of the rectangle
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Height of the rectangle
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Whether the point lies inside the rectangle
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

bitflags! {
    /// Decoration styles requested for a new window
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowStyles: u32 {
        /// Borderless window without a title bar
        const NO_TITLE_BAR = 1 << 0;
        /// Title bar without minimize/maximize/close buttons
        const NO_TITLE_OPTIONS = 1 << 1;
    }
}

/// Where a new window is placed when it first appears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowStartupLocation {
    /// Let the platform decide
    #[default]
    Manual,
    /// Center over the owner window, if one was given
    CenterOwner,
}

/// Main window presentation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindowMode {
    /// Regular decorated window
    #[default]
    Windowed,
    /// Fullscreen on the monitor the window currently occupies
    Fullscreen,
}

/// OpenGL context flavour requested for a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlContextProfile {
    /// Core profile, forward compatible
    Core,
    /// Compatibility profile
    Compatibility,
    /// OpenGL ES
    Es,
}

/// OpenGL context requested together with a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlContextSpec {
    /// Major context version
    pub major: u32,
    /// Minor context version
    pub minor: u32,
    /// Context profile
    pub profile: GlContextProfile,
}

impl GlContextSpec {
    /// OpenGL 3.3 core
    pub const GL33_CORE: Self = Self { major: 3, minor: 3, profile: GlContextProfile::Core };
    /// OpenGL 3.1 compatibility
    pub const GL31_COMPAT: Self = Self { major: 3, minor: 1, profile: GlContextProfile::Compatibility };
    /// OpenGL ES 2.0
    pub const GLES2: Self = Self { major: 2, minor: 0, profile: GlContextProfile::Es };
}

/// Parameters for a window creation request
#[derive(Debug, Clone, PartialEq)]
pub struct WindowCreateParameters {
    /// Initial title
    pub title: String,
    /// Logical width
    pub width: i32,
    /// Logical height
    pub height: i32,
    /// Show the window as soon as it exists
    pub visible: bool,
    /// Start fullscreen on `monitor` (or the primary monitor)
    pub fullscreen: bool,
    /// Monitor to go fullscreen on
    pub monitor: Option<MonitorId>,
    /// Decoration styles
    pub styles: WindowStyles,
    /// Initial placement
    pub startup_location: WindowStartupLocation,
}

impl Default for WindowCreateParameters {
    fn default() -> Self {
        Self {
            title: String::new(),
            width: 1280,
            height: 720,
            visible: true,
            fullscreen: false,
            monitor: None,
            styles: WindowStyles::empty(),
            startup_location: WindowStartupLocation::Manual,
        }
    }
}

impl WindowCreateParameters {
    /// Parameters for a visible window of the given size
    pub fn new(title: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }

    /// Set initial visibility
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set decoration styles
    pub fn with_styles(mut self, styles: WindowStyles) -> Self {
        self.styles = styles;
        self
    }

    /// Set the startup location
    pub fn with_startup_location(mut self, location: WindowStartupLocation) -> Self {
        self.startup_location = location;
        self
    }

    /// Start fullscreen, optionally on a specific monitor
    pub fn with_fullscreen(mut self, monitor: Option<MonitorId>) -> Self {
        self.fullscreen = true;
        self.monitor = monitor;
        self
    }

    /// Size as a vector
    pub fn size(&self) -> Vec2i {
        Vec2i::new(self.width, self.height)
    }
}

/// Position that centers a window of `size` over an owner window.
pub fn center_over(owner_position: Vec2i, owner_size: Vec2i, size: Vec2i) -> Vec2i {
    owner_position + (owner_size - size) / 2
}

/// Framebuffer-to-logical pixel ratio, or `None` when either size is degenerate.
pub fn pixel_ratio(framebuffer_size: Vec2i, window_size: Vec2i) -> Option<Vec2> {
    if framebuffer_size.x <= 0 || framebuffer_size.y <= 0 || window_size.x <= 0 || window_size.y <= 0 {
        return None;
    }

    Some(Vec2::new(
        framebuffer_size.x as f32 / window_size.x as f32,
        framebuffer_size.y as f32 / window_size.y as f32,
    ))
}
