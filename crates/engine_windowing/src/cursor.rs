//! Cursor handles
//!
//! Standard cursors are created once by the windowing thread at startup and
//! can never be disposed. Custom cursors get their logical id game-side,
//! before the create command is even sent, so a handle is usable
//! immediately. The native cursor is released by a `DestroyCursor` command,
//! sent at most once, either on explicit dispose or when the last handle
//! drops on whatever thread that happens.

use image::RgbaImage;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use crate::channel::CommandSender;
use crate::command::Command;
use crate::error::{WindowingError, WindowingResult};
use crate::input::StandardCursorShape;
use crate::types::{CursorId, Vec2i};

/// RGBA8 bitmap copied out of the caller's image, for cursors and window icons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Row-major RGBA8 pixels
    pub rgba: Vec<u8>,
}

impl CursorImage {
    /// Copy an image's pixels
    pub fn from_image(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            rgba: image.as_raw().clone(),
        }
    }

    /// Byte length `rgba` must have, `None` if it does not fit in `usize`
    pub fn expected_len(&self) -> Option<usize> {
        usize::try_from(self.width)
            .ok()?
            .checked_mul(usize::try_from(self.height).ok()?)?
            .checked_mul(4)
    }

    /// Check the pixel buffer against the dimensions
    pub fn validate(&self) -> Result<(), String> {
        match self.expected_len() {
            Some(len) if len == self.rgba.len() => Ok(()),
            _ => Err(format!(
                "Bitmap of {} bytes does not match {}x{}",
                self.rgba.len(),
                self.width,
                self.height
            )),
        }
    }

    /// Pixels packed one per `u32`, bytes in R, G, B, A memory order
    pub fn packed_pixels(&self) -> Vec<u32> {
        self.rgba
            .chunks_exact(4)
            .map(|px| u32::from_le_bytes([px[0], px[1], px[2], px[3]]))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorKind {
    Standard(StandardCursorShape),
    Custom,
}

struct CursorInner {
    id: CursorId,
    kind: CursorKind,
    disposed: AtomicBool,
    commands: CommandSender,
}

impl CursorInner {
    fn release(&self) -> bool {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return false;
        }
        if let Err(err) = self.commands.send(Command::DestroyCursor { cursor: self.id }) {
            log::debug!("Cursor {} released after windowing loop stopped: {err}", self.id);
        }
        true
    }
}

impl Drop for CursorInner {
    fn drop(&mut self) {
        if self.kind == CursorKind::Custom {
            self.release();
        }
    }
}

/// Shared handle to a standard or custom cursor
#[derive(Clone)]
pub struct CursorHandle {
    inner: Arc<CursorInner>,
}

impl CursorHandle {
    pub(crate) fn standard(shape: StandardCursorShape, commands: CommandSender) -> Self {
        Self::with_kind(shape.cursor_id(), CursorKind::Standard(shape), commands)
    }

    pub(crate) fn custom(id: CursorId, commands: CommandSender) -> Self {
        Self::with_kind(id, CursorKind::Custom, commands)
    }

    fn with_kind(id: CursorId, kind: CursorKind, commands: CommandSender) -> Self {
        Self {
            inner: Arc::new(CursorInner {
                id,
                kind,
                disposed: AtomicBool::new(false),
                commands,
            }),
        }
    }

    /// Logical id
    pub fn id(&self) -> CursorId {
        self.inner.id
    }

    /// Standard shape, if this is a standard cursor
    pub fn standard_shape(&self) -> Option<StandardCursorShape> {
        match self.inner.kind {
            CursorKind::Standard(shape) => Some(shape),
            CursorKind::Custom => None,
        }
    }

    /// Whether this is one of the pre-created standard cursors
    pub fn is_standard(&self) -> bool {
        self.standard_shape().is_some()
    }

    /// Whether the cursor was disposed
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Release the native cursor.
    ///
    /// Fails for standard cursors. Disposing a custom cursor twice is a no-op.
    pub fn dispose(&self) -> WindowingResult<()> {
        if let CursorKind::Standard(shape) = self.inner.kind {
            return Err(WindowingError::InvalidOperation(format!(
                "Standard cursor {shape:?} cannot be disposed"
            )));
        }

        self.inner.release();
        Ok(())
    }

    pub(crate) fn ensure_alive(&self) -> WindowingResult<()> {
        if self.is_disposed() {
            return Err(WindowingError::Disposed { what: "cursor" });
        }
        Ok(())
    }
}

impl std::fmt::Debug for CursorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorHandle")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Game-side cursor id allocator and standard cursor table
pub(crate) struct CursorRegistry {
    next_id: AtomicU32,
    standard: Vec<CursorHandle>,
    commands: CommandSender,
}

impl CursorRegistry {
    pub(crate) fn new(commands: CommandSender) -> Self {
        let standard = StandardCursorShape::ALL
            .iter()
            .map(|&shape| CursorHandle::standard(shape, commands.clone()))
            .collect();
        Self {
            next_id: AtomicU32::new(StandardCursorShape::first_custom_id().value()),
            standard,
            commands,
        }
    }

    pub(crate) fn standard(&self, shape: StandardCursorShape) -> CursorHandle {
        self.standard[shape as usize].clone()
    }

    /// Allocate an id and queue creation of the native cursor
    pub(crate) fn create(&self, image: CursorImage, hotspot: Vec2i) -> WindowingResult<CursorHandle> {
        let id = CursorId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = CursorHandle::custom(id, self.commands.clone());
        self.commands.send(Command::CreateCursor { cursor: id, image, hotspot })?;
        Ok(handle)
    }
}
