//! Game-thread mirror of a native window
//!
//! A [`WindowReg`] is created when a creation handshake completes and is only
//! mutated by event dispatch on the game thread. `visible` is the one field
//! written ahead of the windowing thread: it records intent, not confirmed
//! native state.

use crate::config::ZeroSizePolicy;
use crate::cursor::CursorHandle;
use crate::event::WindowCreated;
use crate::types::{pixel_ratio, Vec2, Vec2i, WindowId};

/// Game-side state of one window
#[derive(Debug)]
pub struct WindowReg {
    id: WindowId,
    owner: Option<WindowId>,
    title: String,
    framebuffer_size: Vec2i,
    window_size: Vec2i,
    pixel_ratio: Vec2,
    position: Vec2i,
    content_scale: Vec2,
    focused: bool,
    minimized: bool,
    visible: bool,
    mouse_inside: bool,
    mouse_position: Vec2,
    text_input_active: bool,
    x11_id: Option<u32>,
    pub(crate) cursor: Option<CursorHandle>,
    pub(crate) disposed: bool,
    pub(crate) prev_window_size: Vec2i,
    pub(crate) prev_window_position: Vec2i,
    /// Switched to fullscreen through the main window mode
    pub(crate) fullscreen: bool,
}

impl WindowReg {
    pub(crate) fn from_created(created: &WindowCreated) -> Self {
        let state = &created.state;
        Self {
            id: created.id,
            owner: created.owner,
            title: created.title.clone(),
            framebuffer_size: state.framebuffer_size,
            window_size: state.window_size,
            pixel_ratio: pixel_ratio(state.framebuffer_size, state.window_size)
                .unwrap_or_else(|| Vec2::new(1.0, 1.0)),
            position: state.position,
            content_scale: state.content_scale,
            focused: state.focused,
            minimized: false,
            visible: state.visible,
            mouse_inside: false,
            mouse_position: Vec2::zeros(),
            text_input_active: false,
            x11_id: state.x11_id,
            cursor: None,
            disposed: false,
            prev_window_size: state.window_size,
            prev_window_position: state.position,
            fullscreen: false,
        }
    }

    /// Logical id
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Owner window, if created with one
    pub fn owner(&self) -> Option<WindowId> {
        self.owner
    }

    /// Last title set from the game side
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Framebuffer size in pixels
    pub fn framebuffer_size(&self) -> Vec2i {
        self.framebuffer_size
    }

    /// Logical window size
    pub fn window_size(&self) -> Vec2i {
        self.window_size
    }

    /// Framebuffer pixels per logical pixel
    pub fn pixel_ratio(&self) -> Vec2 {
        self.pixel_ratio
    }

    /// Window position
    pub fn position(&self) -> Vec2i {
        self.position
    }

    /// Content (DPI) scale
    pub fn content_scale(&self) -> Vec2 {
        self.content_scale
    }

    /// Has input focus
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Minimized
    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    /// Requested visibility. May be ahead of the native window.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Cursor is over the window
    pub fn is_mouse_inside(&self) -> bool {
        self.mouse_inside
    }

    /// Last mouse position, in framebuffer pixels
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// IME text input is active
    pub fn is_text_input_active(&self) -> bool {
        self.text_input_active
    }

    /// Cursor assigned with `cursor_set`
    pub fn cursor(&self) -> Option<&CursorHandle> {
        self.cursor.as_ref()
    }

    /// Destroy was requested
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub(crate) fn x11_id(&self) -> Option<u32> {
        self.x11_id
    }

    pub(crate) fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub(crate) fn set_visible_intent(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn set_text_input_active(&mut self, active: bool) {
        self.text_input_active = active;
    }

    /// Store new sizes. Returns `Some(minimized_hint)` when the engine should
    /// hear about the resize.
    pub(crate) fn apply_resize(
        &mut self,
        framebuffer_size: Vec2i,
        window_size: Vec2i,
        policy: ZeroSizePolicy,
    ) -> Option<bool> {
        self.framebuffer_size = framebuffer_size;
        self.window_size = window_size;

        match pixel_ratio(framebuffer_size, window_size) {
            Some(ratio) => {
                self.pixel_ratio = ratio;
                Some(false)
            }
            None => match policy {
                ZeroSizePolicy::NotifyWithoutRatio => Some(true),
                ZeroSizePolicy::Suppress => None,
            },
        }
    }

    pub(crate) fn apply_move(&mut self, position: Vec2i) {
        self.position = position;
    }

    pub(crate) fn apply_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub(crate) fn apply_minimized(&mut self, minimized: bool) {
        self.minimized = minimized;
    }

    pub(crate) fn apply_content_scale(&mut self, scale: Vec2) {
        self.content_scale = scale;
    }

    pub(crate) fn apply_mouse_inside(&mut self, inside: bool) {
        self.mouse_inside = inside;
    }

    /// Store a logical mouse position, returning it in framebuffer pixels
    pub(crate) fn apply_mouse_move(&mut self, logical: Vec2) -> Vec2 {
        self.mouse_position = logical.component_mul(&self.pixel_ratio);
        self.mouse_position
    }

    /// Convert framebuffer pixels to logical window coordinates
    pub(crate) fn to_logical(&self, pixels: Vec2) -> Vec2 {
        pixels.component_div(&self.pixel_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NativeWindowState;
    use approx::assert_relative_eq;

    fn reg(framebuffer: Vec2i, window: Vec2i) -> WindowReg {
        WindowReg::from_created(&WindowCreated {
            id: WindowId(1),
            owner: None,
            title: "Test".to_string(),
            state: NativeWindowState {
                framebuffer_size: framebuffer,
                window_size: window,
                position: Vec2i::zeros(),
                content_scale: Vec2::new(1.0, 1.0),
                visible: true,
                focused: true,
                x11_id: None,
            },
        })
    }

    #[test]
    fn test_initial_pixel_ratio() {
        let reg = reg(Vec2i::new(1600, 1200), Vec2i::new(800, 600));
        assert_relative_eq!(reg.pixel_ratio().x, 2.0);
        assert_relative_eq!(reg.pixel_ratio().y, 2.0);
    }

    #[test]
    fn test_zero_framebuffer_keeps_ratio_and_notifies() {
        let mut reg = reg(Vec2i::new(1600, 1200), Vec2i::new(800, 600));
        let outcome = reg.apply_resize(Vec2i::zeros(), Vec2i::new(800, 600), ZeroSizePolicy::NotifyWithoutRatio);

        assert_eq!(outcome, Some(true));
        assert_eq!(reg.framebuffer_size(), Vec2i::zeros());
        assert_eq!(reg.window_size(), Vec2i::new(800, 600));
        assert_relative_eq!(reg.pixel_ratio().x, 2.0);
    }

    #[test]
    fn test_zero_framebuffer_suppressed() {
        let mut reg = reg(Vec2i::new(800, 600), Vec2i::new(800, 600));
        let outcome = reg.apply_resize(Vec2i::zeros(), Vec2i::new(800, 600), ZeroSizePolicy::Suppress);

        assert_eq!(outcome, None);
        assert_eq!(reg.framebuffer_size(), Vec2i::zeros());
        assert_relative_eq!(reg.pixel_ratio().y, 1.0);
    }

    #[test]
    fn test_mouse_position_in_framebuffer_pixels() {
        let mut reg = reg(Vec2i::new(1600, 1200), Vec2i::new(800, 600));
        let pixels = reg.apply_mouse_move(Vec2::new(10.0, 20.0));
        assert_relative_eq!(pixels.x, 20.0);
        assert_relative_eq!(pixels.y, 40.0);

        let logical = reg.to_logical(Vec2::new(100.0, 50.0));
        assert_relative_eq!(logical.x, 50.0);
        assert_relative_eq!(logical.y, 25.0);
    }
}
