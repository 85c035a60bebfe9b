//! # Engine Windowing
//!
//! Native windowing for the engine, kept off the game thread.
//!
//! The windowing loop owns every native handle and runs on the thread the
//! platform requires (usually the process main thread). The game thread talks
//! to it through two channels:
//!
//! - **Commands** flow game → windowing over an unbounded channel that any
//!   thread may send on. Sending wakes the native loop.
//! - **Events** flow windowing → game over a bounded channel. A full channel
//!   blocks the windowing loop until the game thread catches up.
//!
//! Operations that need an answer (window creation, clipboard reads) send a
//! command carrying a write-once result slot. The windowing thread answers
//! with an event, and the slot is only filled while that event is dispatched
//! on the game thread, so everything the game sees stays in arrival order.
//!
//! ## Backends
//!
//! - [`backend::headless`]: a display-less backend driven from tests and tools
//! - `backend::glfw`: GLFW, behind the `glfw-backend` feature
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use engine_windowing::prelude::*;
//!
//! let (backend, _os) = HeadlessBackend::new(HeadlessConfig::default());
//! let mut windowing = Windowing::init_inline(WindowingConfig::default(), backend).unwrap();
//! let window = windowing
//!     .window_create(None, WindowCreateParameters::new("Game", 1280, 720), None, None)
//!     .unwrap();
//! windowing.poll_events();
//! windowing.window_destroy(window).unwrap();
//! windowing.shutdown().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

pub mod backend;
pub mod channel;
pub mod command;
pub mod config;
pub mod cursor;
pub mod driver;
pub mod error;
pub mod event;
pub mod events;
pub mod input;
pub mod logging;
pub mod monitor;
pub mod slot;
pub mod types;
pub mod window;
pub mod window_thread;
pub mod windowing;

pub use config::{Config, ConfigError, ThreadingMode, WindowingConfig, ZeroSizePolicy};
pub use error::{WindowingError, WindowingResult};
pub use windowing::Windowing;

/// Common imports for engine code
pub mod prelude {
    pub use crate::backend::headless::{
        HeadlessBackend, HeadlessConfig, HeadlessController, HeadlessInput,
    };
    pub use crate::backend::{LoopWaker, NativeBackend};
    pub use crate::config::{Config, ThreadingMode, WindowingConfig, ZeroSizePolicy};
    pub use crate::cursor::CursorHandle;
    pub use crate::driver::{Driver, InlineDriver, ThreadedDriver};
    pub use crate::error::{WindowingError, WindowingResult};
    pub use crate::events::{EngineEvent, EngineEventHandler, EngineEventKind};
    pub use crate::input::{Key, KeyAction, Modifiers, MouseButton, StandardCursorShape};
    pub use crate::monitor::{MonitorProps, MonitorReg};
    pub use crate::slot::Pending;
    pub use crate::types::{
        GlContextProfile, GlContextSpec, IntRect, MonitorId, Vec2, Vec2i, WindowCreateParameters,
        WindowId, WindowMode, WindowStartupLocation, WindowStyles,
    };
    pub use crate::window::WindowReg;
    pub use crate::window_thread::{LoopState, WindowThread};
    pub use crate::windowing::Windowing;

    #[cfg(feature = "glfw-backend")]
    pub use crate::backend::glfw::GlfwBackend;
}
