//! GLFW backend
//!
//! `glfw::Glfw` is `!Send`. Other threads wake the loop through a
//! `ThreadSafeGlfw` handle, whose `post_empty_event` interrupts a blocked
//! `wait_events`.
//!
//! GLFW errors are logged and never panic. The last one is kept so a failed
//! window creation can report what GLFW said.
//!
//! GLFW has neither owned windows nor IME placement; those requests are
//! accepted and logged.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use glfw::{Action, Context, Glfw, GlfwReceiver, PWindow, ThreadSafeGlfw, WindowEvent};
use parking_lot::Mutex;

use super::{LoopWaker, NativeBackend, WindowTable};
use crate::cursor::CursorImage;
use crate::error::{WindowingError, WindowingResult};
use crate::event::{Event, NativeWindowState};
use crate::input::{Key, KeyAction, KeyMap, Modifiers, MouseButton, StandardCursorShape};
use crate::monitor::{MonitorChange, MonitorProps, VideoMode};
use crate::types::{
    center_over, GlContextProfile, GlContextSpec, IntRect, Vec2, Vec2i, WindowCreateParameters, WindowId,
    WindowStartupLocation, WindowStyles,
};

/// GLFW monitors have no stable handle across enumerations; name and
/// position identify one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlfwMonitor {
    name: String,
    position: (i32, i32),
}

impl GlfwMonitor {
    fn matches(&self, monitor: &glfw::Monitor) -> bool {
        monitor.get_pos() == self.position && monitor.get_name().unwrap_or_default() == self.name
    }
}

/// A GLFW window with its event receiver
pub struct GlfwWindow {
    id: WindowId,
    window: PWindow,
    events: GlfwReceiver<(f64, WindowEvent)>,
}

/// GLFW cursors are owned by the window they are set on, so a cursor is kept
/// as its source and instantiated per `set_cursor`.
#[derive(Debug, Clone)]
pub enum GlfwCursor {
    /// A standard shape
    Standard(glfw::StandardCursor),
    /// A custom bitmap
    Custom {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
        /// Packed RGBA pixels
        pixels: Vec<u32>,
        /// Hotspot
        hotspot: (u32, u32),
    },
}

impl GlfwCursor {
    fn instantiate(&self) -> glfw::Cursor {
        match self {
            Self::Standard(shape) => glfw::Cursor::standard(*shape),
            Self::Custom { width, height, pixels, hotspot } => glfw::Cursor::create_from_pixels(
                pixel_image(*width, *height, pixels.clone()),
                hotspot.0,
                hotspot.1,
            ),
        }
    }
}

fn pixel_image(width: u32, height: u32, pixels: Vec<u32>) -> glfw::PixelImage {
    glfw::PixelImage { width, height, pixels }
}

/// Wakes a blocked `glfwWaitEvents` from any thread
struct GlfwWaker(Mutex<ThreadSafeGlfw>);

impl LoopWaker for GlfwWaker {
    fn wake(&self) {
        self.0.lock().post_empty_event();
    }
}

/// Last error reported through the GLFW error callback
type LastError = Rc<RefCell<Option<String>>>;

fn record_errors(last_error: &LastError) -> impl FnMut(glfw::Error, String) + 'static {
    let last_error = Rc::clone(last_error);
    move |error, description| {
        log::error!("GLFW error {error}: {description}");
        *last_error.borrow_mut() = Some(description);
    }
}

/// [`NativeBackend`] over GLFW
pub struct GlfwBackend {
    glfw: Glfw,
    waker: Arc<GlfwWaker>,
    last_error: LastError,
    monitors: Vec<(GlfwMonitor, MonitorProps)>,
    ime_warned: bool,
}

impl GlfwBackend {
    /// Initialize GLFW on the calling thread
    pub fn new() -> WindowingResult<Self> {
        let last_error = LastError::default();
        let mut glfw = glfw::init(record_errors(&last_error))
            .map_err(|err| WindowingError::InitFailed(format!("GLFW initialization failed: {err:?}")))?;
        log::info!("GLFW {} initialized", glfw::get_version_string());

        let waker = Arc::new(GlfwWaker(Mutex::new(ThreadSafeGlfw::from(&mut glfw))));
        Ok(Self { glfw, waker, last_error, monitors: Vec::new(), ime_warned: false })
    }

    fn take_last_error(&self) -> Option<String> {
        self.last_error.borrow_mut().take()
    }

    fn snapshot_monitors(&mut self) -> Vec<(GlfwMonitor, MonitorProps)> {
        self.glfw.with_connected_monitors(|_, monitors| {
            monitors
                .iter()
                .map(|monitor| {
                    let name = monitor.get_name().unwrap_or_default();
                    let (x, y) = monitor.get_pos();
                    let (size, refresh_rate) = monitor.get_video_mode().map_or((Vec2i::zeros(), 0), |mode| {
                        (Vec2i::new(mode.width as i32, mode.height as i32), mode.refresh_rate)
                    });
                    let (sx, sy) = monitor.get_content_scale();

                    let mut props = MonitorProps::new(name.clone(), size, refresh_rate, Vec2i::new(x, y));
                    props.content_scale = Vec2::new(sx, sy);
                    props.video_modes = monitor
                        .get_video_modes()
                        .iter()
                        .map(|mode| VideoMode {
                            width: mode.width,
                            height: mode.height,
                            refresh_rate: mode.refresh_rate,
                        })
                        .collect();

                    (GlfwMonitor { name, position: (x, y) }, props)
                })
                .collect()
        })
    }

    fn apply_hints(&mut self, gl_spec: Option<&GlContextSpec>, params: &WindowCreateParameters) {
        use glfw::WindowHint;

        self.glfw.default_window_hints();
        match gl_spec {
            Some(spec) => {
                self.glfw.window_hint(WindowHint::ContextVersion(spec.major, spec.minor));
                match spec.profile {
                    GlContextProfile::Core => {
                        self.glfw.window_hint(WindowHint::ClientApi(glfw::ClientApiHint::OpenGl));
                        self.glfw.window_hint(WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
                        self.glfw.window_hint(WindowHint::OpenGlForwardCompat(true));
                    }
                    GlContextProfile::Compatibility => {
                        self.glfw.window_hint(WindowHint::ClientApi(glfw::ClientApiHint::OpenGl));
                        self.glfw.window_hint(WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Compat));
                    }
                    GlContextProfile::Es => {
                        self.glfw.window_hint(WindowHint::ClientApi(glfw::ClientApiHint::OpenGlEs));
                    }
                }
            }
            None => self.glfw.window_hint(WindowHint::ClientApi(glfw::ClientApiHint::NoApi)),
        }

        // Shown after placement
        self.glfw.window_hint(WindowHint::Visible(false));
        self.glfw.window_hint(WindowHint::Decorated(!params.styles.contains(WindowStyles::NO_TITLE_BAR)));
        self.glfw.window_hint(WindowHint::Resizable(!params.styles.contains(WindowStyles::NO_TITLE_OPTIONS)));
    }

    fn native_state(window: &PWindow) -> NativeWindowState {
        let (fw, fh) = window.get_framebuffer_size();
        let (ww, wh) = window.get_size();
        let (x, y) = window.get_pos();
        let (sx, sy) = window.get_content_scale();
        NativeWindowState {
            framebuffer_size: Vec2i::new(fw, fh),
            window_size: Vec2i::new(ww, wh),
            position: Vec2i::new(x, y),
            content_scale: Vec2::new(sx, sy),
            visible: window.is_visible(),
            focused: window.is_focused(),
            x11_id: None,
        }
    }

    fn resized(window: &GlfwWindow) -> Event {
        let (fw, fh) = window.window.get_framebuffer_size();
        let (ww, wh) = window.window.get_size();
        Event::WindowResized {
            window: window.id,
            framebuffer_size: Vec2i::new(fw, fh),
            window_size: Vec2i::new(ww, wh),
        }
    }

    fn translate(window: &GlfwWindow, event: WindowEvent) -> Option<Event> {
        let id = window.id;
        let event = match event {
            WindowEvent::CursorPos(x, y) => Event::MouseMove { window: id, position: Vec2::new(x as f32, y as f32) },
            WindowEvent::MouseButton(button, action, mods) => Event::MouseButton {
                window: id,
                button: convert_button(button)?,
                action: convert_action(action),
                mods: convert_mods(mods),
            },
            WindowEvent::Scroll(x, y) => Event::MouseWheel { window: id, delta: Vec2::new(x as f32, y as f32) },
            WindowEvent::CursorEnter(entered) => Event::MouseEnterLeave { window: id, entered },
            WindowEvent::Key(key, scan_code, action, mods) => Event::Key {
                window: id,
                key: convert_key(key),
                scan_code,
                action: convert_action(action),
                mods: convert_mods(mods),
            },
            WindowEvent::Char(c) => Event::Text { window: id, text: c.to_string() },
            WindowEvent::Size(..) | WindowEvent::FramebufferSize(..) => Self::resized(window),
            WindowEvent::Pos(x, y) => Event::WindowMoved { window: id, position: Vec2i::new(x, y) },
            WindowEvent::Focus(focused) => Event::WindowFocus { window: id, focused },
            WindowEvent::Iconify(minimized) => Event::WindowMinimized { window: id, minimized },
            WindowEvent::ContentScale(x, y) => Event::WindowContentScale { window: id, scale: Vec2::new(x, y) },
            WindowEvent::Close => Event::WindowClose { window: id },
            _ => return None,
        };
        Some(event)
    }
}

impl NativeBackend for GlfwBackend {
    type Window = GlfwWindow;
    type Cursor = GlfwCursor;
    type Monitor = GlfwMonitor;

    fn name(&self) -> &'static str {
        "GLFW"
    }

    fn waker(&self) -> Arc<dyn LoopWaker> {
        self.waker.clone()
    }

    fn wake_is_reliable(&self) -> bool {
        true
    }

    fn wait_events(&mut self, timeout: Option<Duration>) {
        match timeout {
            Some(timeout) => self.glfw.wait_events_timeout(timeout.as_secs_f64()),
            None => self.glfw.wait_events(),
        }
    }

    fn poll_events(&mut self) {
        self.glfw.poll_events();
    }

    fn drain_events(&mut self, windows: &mut WindowTable<GlfwWindow>, out: &mut Vec<Event>) {
        // Receivers are per window; timestamps restore the global order
        let mut timed = Vec::new();
        for window in windows.values() {
            for (time, event) in glfw::flush_messages(&window.events) {
                if let Some(event) = Self::translate(window, event) {
                    timed.push((time, event));
                }
            }
        }
        timed.sort_by(|a, b| a.0.total_cmp(&b.0));
        out.extend(timed.into_iter().map(|(_, event)| event));
    }

    fn enumerate_monitors(&mut self) -> Vec<(GlfwMonitor, MonitorProps)> {
        self.monitors = self.snapshot_monitors();
        self.monitors.clone()
    }

    fn poll_monitor_changes(&mut self) -> Vec<MonitorChange<GlfwMonitor>> {
        let current = self.snapshot_monitors();
        let mut changes = Vec::new();

        for (monitor, _) in &self.monitors {
            if !current.iter().any(|(m, _)| m == monitor) {
                changes.push(MonitorChange::Disconnected(monitor.clone()));
            }
        }
        for (monitor, props) in &current {
            if !self.monitors.iter().any(|(m, _)| m == monitor) {
                changes.push(MonitorChange::Connected(monitor.clone(), props.clone()));
            }
        }

        self.monitors = current;
        changes
    }

    fn key_map(&mut self) -> KeyMap {
        let mut map = KeyMap::new();
        for key in Key::PRINTABLE {
            let Some(native) = to_glfw_key(key) else { continue };
            map.insert(key, glfw::get_key_name(Some(native), None), glfw::get_key_scancode(Some(native)));
        }
        map
    }

    fn create_window(
        &mut self,
        id: WindowId,
        gl_spec: Option<&GlContextSpec>,
        params: &WindowCreateParameters,
        fullscreen_on: Option<&GlfwMonitor>,
        share: Option<&GlfwWindow>,
        owner: Option<&GlfwWindow>,
    ) -> Result<(GlfwWindow, NativeWindowState), String> {
        if params.width <= 0 || params.height <= 0 {
            return Err(format!("Invalid window size {}x{}", params.width, params.height));
        }
        self.apply_hints(gl_spec, params);
        self.take_last_error();

        let (width, height) = (params.width as u32, params.height as u32);
        let created = match share {
            Some(share) => share.window.create_shared(width, height, &params.title, glfw::WindowMode::Windowed),
            None => self.glfw.create_window(width, height, &params.title, glfw::WindowMode::Windowed),
        };
        let Some((mut window, events)) = created else {
            let what = match gl_spec {
                Some(spec) => format!("Failed to create window with {:?} {}.{} context", spec.profile, spec.major, spec.minor),
                None => "Failed to create window".to_string(),
            };
            return Err(match self.take_last_error() {
                Some(reason) => format!("{what}: {reason}"),
                None => what,
            });
        };

        window.set_all_polling(true);

        if let Some(owner) = owner {
            if params.startup_location == WindowStartupLocation::CenterOwner {
                let (ox, oy) = owner.window.get_pos();
                let (ow, oh) = owner.window.get_size();
                let position = center_over(
                    Vec2i::new(ox, oy),
                    Vec2i::new(ow, oh),
                    Vec2i::new(params.width, params.height),
                );
                window.set_pos(position.x, position.y);
            }
            log::debug!("GLFW has no owned windows; window {id} is placed but not parented to {}", owner.id);
        }

        if params.fullscreen {
            let target = fullscreen_on.cloned().or_else(|| self.monitors.first().map(|(m, _)| m.clone()));
            if let Some(target) = target {
                self.enter_fullscreen(&mut window, &target);
            }
        }

        if gl_spec.is_some() {
            window.make_current();
        }
        if params.visible {
            window.show();
        }

        let state = Self::native_state(&window);
        log::debug!("Created GLFW window {id} ({}x{})", state.window_size.x, state.window_size.y);
        Ok((GlfwWindow { id, window, events }, state))
    }

    fn destroy_window(&mut self, window: GlfwWindow, _had_owner: bool) {
        log::debug!("Destroying GLFW window {}", window.id);
        drop(window);
    }

    fn set_title(&mut self, window: &mut GlfwWindow, title: &str) {
        window.window.set_title(title);
    }

    fn set_visible(&mut self, window: &mut GlfwWindow, visible: bool) {
        if visible {
            window.window.show();
        } else {
            window.window.hide();
        }
    }

    fn set_size(&mut self, window: &mut GlfwWindow, size: Vec2i) {
        window.window.set_size(size.x, size.y);
    }

    fn set_fullscreen(&mut self, window: &mut GlfwWindow, monitor: Option<&GlfwMonitor>) {
        let target = monitor.cloned().or_else(|| {
            let (x, y) = window.window.get_pos();
            self.monitors
                .iter()
                .find(|(_, props)| {
                    x >= props.position.x
                        && y >= props.position.y
                        && x < props.position.x + props.size.x
                        && y < props.position.y + props.size.y
                })
                .or_else(|| self.monitors.first())
                .map(|(m, _)| m.clone())
        });

        match target {
            Some(target) => self.enter_fullscreen(&mut window.window, &target),
            None => log::warn!("No monitor to make window {} fullscreen on", window.id),
        }
    }

    fn set_windowed(&mut self, window: &mut GlfwWindow, size: Vec2i, position: Vec2i) {
        window.window.set_monitor(
            glfw::WindowMode::Windowed,
            position.x,
            position.y,
            size.x.max(1) as u32,
            size.y.max(1) as u32,
            None,
        );
    }

    fn request_attention(&mut self, window: &mut GlfwWindow) {
        window.window.request_attention();
    }

    fn swap_buffers(&mut self, window: &mut GlfwWindow) {
        window.window.swap_buffers();
    }

    fn set_vsync(&mut self, window: &mut GlfwWindow, enabled: bool) {
        window.window.make_current();
        self.glfw.set_swap_interval(if enabled {
            glfw::SwapInterval::Sync(1)
        } else {
            glfw::SwapInterval::None
        });
    }

    fn create_standard_cursor(&mut self, shape: StandardCursorShape) -> Result<GlfwCursor, String> {
        let shape = match shape {
            StandardCursorShape::Arrow => glfw::StandardCursor::Arrow,
            StandardCursorShape::IBeam => glfw::StandardCursor::IBeam,
            StandardCursorShape::Crosshair => glfw::StandardCursor::Crosshair,
            StandardCursorShape::Hand => glfw::StandardCursor::Hand,
            StandardCursorShape::HResize => glfw::StandardCursor::HResize,
            StandardCursorShape::VResize => glfw::StandardCursor::VResize,
        };
        Ok(GlfwCursor::Standard(shape))
    }

    fn set_icon(&mut self, window: &mut GlfwWindow, image: Option<&CursorImage>) -> Result<(), String> {
        let images = match image {
            Some(image) => {
                image.validate()?;
                vec![pixel_image(image.width, image.height, image.packed_pixels())]
            }
            None => Vec::new(),
        };
        window.window.set_icon_from_pixels(images);
        Ok(())
    }

    fn create_cursor(&mut self, image: &CursorImage, hotspot: Vec2i) -> Result<GlfwCursor, String> {
        image.validate()?;
        if hotspot.x < 0 || hotspot.y < 0 {
            return Err(format!("Invalid cursor hotspot ({}, {})", hotspot.x, hotspot.y));
        }
        Ok(GlfwCursor::Custom {
            width: image.width,
            height: image.height,
            pixels: image.packed_pixels(),
            hotspot: (hotspot.x as u32, hotspot.y as u32),
        })
    }

    fn set_cursor(&mut self, window: &mut GlfwWindow, cursor: Option<&GlfwCursor>) {
        // The previously set cursor is handed back and dropped here
        drop(window.window.set_cursor(cursor.map(GlfwCursor::instantiate)));
    }

    fn clipboard_get(&mut self, window: &mut GlfwWindow) -> Option<String> {
        window.window.get_clipboard_string()
    }

    fn clipboard_set(&mut self, window: &mut GlfwWindow, text: &str) {
        window.window.set_clipboard_string(text);
    }

    fn text_input_start(&mut self, window: &mut GlfwWindow) {
        self.warn_no_ime(window.id);
    }

    fn text_input_stop(&mut self, _window: &mut GlfwWindow) {}

    fn text_input_set_rect(&mut self, window: &mut GlfwWindow, _rect: IntRect, _cursor: i32) {
        self.warn_no_ime(window.id);
    }

    fn shutdown(&mut self) {
        log::info!("GLFW backend shut down");
    }
}

impl GlfwBackend {
    fn enter_fullscreen(&mut self, window: &mut PWindow, target: &GlfwMonitor) {
        let entered = self.glfw.with_connected_monitors(|_, monitors| {
            let Some(monitor) = monitors.iter().find(|m| target.matches(m)) else {
                return false;
            };
            let Some(mode) = monitor.get_video_mode() else {
                return false;
            };
            window.set_monitor(
                glfw::WindowMode::FullScreen(monitor),
                0,
                0,
                mode.width,
                mode.height,
                Some(mode.refresh_rate),
            );
            true
        });
        if !entered {
            log::warn!("Monitor {} is no longer connected", target.name);
        }
    }

    fn warn_no_ime(&mut self, window: WindowId) {
        if !self.ime_warned {
            log::warn!("GLFW has no IME support; text input requests for {window} are ignored");
            self.ime_warned = true;
        }
    }
}

fn convert_action(action: Action) -> KeyAction {
    match action {
        Action::Press => KeyAction::Press,
        Action::Release => KeyAction::Release,
        Action::Repeat => KeyAction::Repeat,
    }
}

fn convert_button(button: glfw::MouseButton) -> Option<MouseButton> {
    match button {
        glfw::MouseButton::Button1 => Some(MouseButton::Left),
        glfw::MouseButton::Button2 => Some(MouseButton::Right),
        glfw::MouseButton::Button3 => Some(MouseButton::Middle),
        glfw::MouseButton::Button4 => Some(MouseButton::Button4),
        glfw::MouseButton::Button5 => Some(MouseButton::Button5),
        _ => None,
    }
}

fn convert_mods(mods: glfw::Modifiers) -> Modifiers {
    let mut out = Modifiers::empty();
    out.set(Modifiers::SHIFT, mods.contains(glfw::Modifiers::Shift));
    out.set(Modifiers::CONTROL, mods.contains(glfw::Modifiers::Control));
    out.set(Modifiers::ALT, mods.contains(glfw::Modifiers::Alt));
    out.set(Modifiers::SUPER, mods.contains(glfw::Modifiers::Super));
    out.set(Modifiers::CAPS_LOCK, mods.contains(glfw::Modifiers::CapsLock));
    out.set(Modifiers::NUM_LOCK, mods.contains(glfw::Modifiers::NumLock));
    out
}

macro_rules! key_table {
    ($($ours:ident => $theirs:ident),* $(,)?) => {
        fn convert_key(key: glfw::Key) -> Key {
            match key {
                $(glfw::Key::$theirs => Key::$ours,)*
                _ => Key::Unknown,
            }
        }

        fn to_glfw_key(key: Key) -> Option<glfw::Key> {
            match key {
                $(Key::$ours => Some(glfw::Key::$theirs),)*
                Key::Unknown => None,
            }
        }
    };
}

key_table! {
    A => A, B => B, C => C, D => D, E => E, F => F, G => G, H => H, I => I,
    J => J, K => K, L => L, M => M, N => N, O => O, P => P, Q => Q, R => R,
    S => S, T => T, U => U, V => V, W => W, X => X, Y => Y, Z => Z,
    Num0 => Num0, Num1 => Num1, Num2 => Num2, Num3 => Num3, Num4 => Num4,
    Num5 => Num5, Num6 => Num6, Num7 => Num7, Num8 => Num8, Num9 => Num9,
    F1 => F1, F2 => F2, F3 => F3, F4 => F4, F5 => F5, F6 => F6,
    F7 => F7, F8 => F8, F9 => F9, F10 => F10, F11 => F11, F12 => F12,
    Space => Space, Enter => Enter, Escape => Escape, Tab => Tab, Backspace => Backspace,
    Insert => Insert, Delete => Delete, Home => Home, End => End,
    PageUp => PageUp, PageDown => PageDown,
    Up => Up, Down => Down, Left => Left, Right => Right,
    LShift => LeftShift, RShift => RightShift,
    LControl => LeftControl, RControl => RightControl,
    LAlt => LeftAlt, RAlt => RightAlt,
    LSystem => LeftSuper, RSystem => RightSuper,
    Minus => Minus, Equal => Equal, Comma => Comma, Period => Period, Slash => Slash,
    BackSlash => Backslash, SemiColon => Semicolon, Apostrophe => Apostrophe,
    LBracket => LeftBracket, RBracket => RightBracket, Tilde => GraveAccent,
}
