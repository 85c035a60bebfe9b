//! Monitor descriptions and the game-thread monitor registry entries

use crate::types::{MonitorId, Vec2, Vec2i};

/// One display mode a monitor supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoMode {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Refresh rate in Hz
    pub refresh_rate: u32,
}

/// Monitor description copied out of the native library
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorProps {
    /// Human readable name
    pub name: String,
    /// Current mode size
    pub size: Vec2i,
    /// Current refresh rate
    pub refresh_rate: u32,
    /// Top-left corner in virtual screen coordinates
    pub position: Vec2i,
    /// Content (DPI) scale
    pub content_scale: Vec2,
    /// Every supported mode
    pub video_modes: Vec<VideoMode>,
}

impl MonitorProps {
    /// Single-mode monitor at the given position
    pub fn new(name: impl Into<String>, size: Vec2i, refresh_rate: u32, position: Vec2i) -> Self {
        let mode = VideoMode {
            width: size.x.max(0) as u32,
            height: size.y.max(0) as u32,
            refresh_rate,
        };
        Self {
            name: name.into(),
            size,
            refresh_rate,
            position,
            content_scale: Vec2::new(1.0, 1.0),
            video_modes: vec![mode],
        }
    }
}

/// Monitor hotplug notification from a backend
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorChange<M> {
    /// A monitor appeared
    Connected(M, MonitorProps),
    /// A monitor went away
    Disconnected(M),
}

/// Game-thread mirror of a connected monitor
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorReg {
    id: MonitorId,
    props: MonitorProps,
}

impl MonitorReg {
    pub(crate) fn new(id: MonitorId, props: MonitorProps) -> Self {
        Self { id, props }
    }

    /// Logical id
    pub fn id(&self) -> MonitorId {
        self.id
    }

    /// Name reported by the platform
    pub fn name(&self) -> &str {
        &self.props.name
    }

    /// Current mode size
    pub fn size(&self) -> Vec2i {
        self.props.size
    }

    /// Current refresh rate
    pub fn refresh_rate(&self) -> u32 {
        self.props.refresh_rate
    }

    /// Position in virtual screen coordinates
    pub fn position(&self) -> Vec2i {
        self.props.position
    }

    /// Supported modes
    pub fn video_modes(&self) -> &[VideoMode] {
        &self.props.video_modes
    }

    /// Full description
    pub fn props(&self) -> &MonitorProps {
        &self.props
    }
}
