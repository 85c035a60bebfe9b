//! Windowing error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::types::{MonitorId, WindowId};

/// Errors surfaced by the windowing layer
///
/// Programming mistakes (disposed handles, disposing a standard cursor) are
/// reported synchronously on the calling thread. Failures of the native
/// environment come back as values, never as panics.
#[derive(Error, Debug)]
pub enum WindowingError {
    /// Operation on a window or cursor after it was disposed
    #[error("{what} has been disposed")]
    Disposed {
        /// Kind of resource
        what: &'static str,
    },

    /// Operation that is never valid, e.g. disposing a standard cursor
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Native library initialization failed
    #[error("Windowing initialization failed: {0}")]
    InitFailed(String),

    /// Native window or context creation failed
    #[error("Window creation failed: {0}")]
    WindowCreation(String),

    /// Window id that was never registered
    #[error("Unknown window: {0}")]
    UnknownWindow(WindowId),

    /// Monitor id that is not connected
    #[error("Unknown monitor: {0}")]
    UnknownMonitor(MonitorId),

    /// The windowing loop has stopped and will not answer
    #[error("Windowing loop has terminated")]
    LoopTerminated,

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for windowing operations
pub type WindowingResult<T> = Result<T, WindowingError>;
