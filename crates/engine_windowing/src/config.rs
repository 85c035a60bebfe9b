//! # Windowing Configuration
//!
//! Settings for the thread separation layer and the main window. Loadable
//! from `.toml` or `.ron` files through the [`Config`] trait.
//!
//! ```toml
//! threading = "Separate"
//! event_queue_capacity = 1024
//! log_level = "debug"
//!
//! [main_window]
//! title = "Game"
//! width = 1280
//! height = 720
//! ```

pub use serde::{Deserialize, Serialize};

use crate::types::WindowMode;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Values that parse but make no sense
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where native windowing work runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ThreadingMode {
    /// Dedicated windowing thread, commands and events cross channels
    #[default]
    Separate,
    /// Everything on the calling thread; commands execute immediately
    Inline,
}

impl ThreadingMode {
    /// Lowercase name used in descriptions
    pub fn name(self) -> &'static str {
        match self {
            ThreadingMode::Separate => "separate thread",
            ThreadingMode::Inline => "inline",
        }
    }
}

/// What to do with a resize that reports a zero-sized framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ZeroSizePolicy {
    /// Store the sizes, keep the old pixel ratio, notify with a minimized hint
    #[default]
    NotifyWithoutRatio,
    /// Store the sizes and do not notify
    Suppress,
}

/// Main window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainWindowConfig {
    /// Initial title
    pub title: String,
    /// Logical width
    pub width: i32,
    /// Logical height
    pub height: i32,
}

impl Default for MainWindowConfig {
    fn default() -> Self {
        Self {
            title: "Game".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// # Windowing Configuration
///
/// Thread separation, queue sizing and main window defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowingConfig {
    /// Threaded or inline operation
    pub threading: ThreadingMode,
    /// Capacity of the bounded event channel
    pub event_queue_capacity: usize,
    /// Upper bound on the native wait, in milliseconds. `None` waits indefinitely
    /// when the backend can be woken reliably.
    pub wait_timeout_ms: Option<u64>,
    /// Default log filter
    pub log_level: String,
    /// Vertical sync on the main window
    pub vsync: bool,
    /// Main window mode
    pub window_mode: WindowMode,
    /// Zero-sized resize handling
    pub zero_size_policy: ZeroSizePolicy,
    /// Main window
    pub main_window: MainWindowConfig,
}

impl Default for WindowingConfig {
    fn default() -> Self {
        Self {
            threading: ThreadingMode::Separate,
            event_queue_capacity: 1024,
            wait_timeout_ms: None,
            log_level: "info".to_string(),
            vsync: true,
            window_mode: WindowMode::Windowed,
            zero_size_policy: ZeroSizePolicy::NotifyWithoutRatio,
            main_window: MainWindowConfig::default(),
        }
    }
}

impl Config for WindowingConfig {}

impl WindowingConfig {
    /// Set threading mode
    pub fn with_threading(mut self, threading: ThreadingMode) -> Self {
        self.threading = threading;
        self
    }

    /// Set event channel capacity
    pub fn with_event_queue_capacity(mut self, capacity: usize) -> Self {
        self.event_queue_capacity = capacity;
        self
    }

    /// Bound the native wait
    pub fn with_wait_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.wait_timeout_ms = Some(timeout_ms);
        self
    }

    /// Set the zero-size resize policy
    pub fn with_zero_size_policy(mut self, policy: ZeroSizePolicy) -> Self {
        self.zero_size_policy = policy;
        self
    }

    /// Set main window title and size
    pub fn with_main_window(mut self, title: impl Into<String>, width: i32, height: i32) -> Self {
        self.main_window = MainWindowConfig {
            title: title.into(),
            width,
            height,
        };
        self
    }

    /// Native wait bound as a duration
    pub fn wait_timeout(&self) -> Option<std::time::Duration> {
        self.wait_timeout_ms.map(std::time::Duration::from_millis)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "Event queue capacity must be at least 1".to_string(),
            ));
        }

        if self.main_window.width <= 0 || self.main_window.height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "Main window size must be positive, got {}x{}",
                self.main_window.width, self.main_window.height
            )));
        }

        if self.main_window.title.is_empty() {
            return Err(ConfigError::Invalid("Main window title cannot be empty".to_string()));
        }

        Ok(())
    }
}
