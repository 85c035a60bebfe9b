//! In-process native backend without a display
//!
//! Windows, monitors, cursors and the clipboard are plain data behind a
//! mutex. A [`HeadlessController`] plays the part of the OS: it injects input
//! and window-manager events, hotplugs monitors and can make the next window
//! creation fail. It is `Send + Sync` and can be used from any thread.

use parking_lot::{Condvar, Mutex};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{LoopWaker, NativeBackend, WindowTable};
use crate::cursor::CursorImage;
use crate::event::{Event, NativeWindowState};
use crate::input::{Key, KeyAction, KeyMap, Modifiers, MouseButton, StandardCursorShape};
use crate::monitor::{MonitorChange, MonitorProps};
use crate::types::{
    center_over, GlContextSpec, IntRect, Vec2, Vec2i, WindowCreateParameters,
    WindowStartupLocation, WindowStyles, WindowId,
};

/// Native monitor handle of the headless backend
pub type HeadlessMonitor = u32;

/// Simulated OS input, queued per window
#[derive(Debug, Clone, PartialEq)]
pub enum HeadlessInput {
    /// Cursor moved to a logical position
    MouseMove(Vec2),
    /// Mouse button transition
    MouseButton(MouseButton, KeyAction, Modifiers),
    /// Scroll offset
    Scroll(Vec2),
    /// Cursor entered (true) or left the window
    CursorEnter(bool),
    /// Key transition; the scan code comes from the key map
    Key(Key, KeyAction, Modifiers),
    /// Committed text
    Text(String),
    /// IME composition
    Composition {
        /// Composition string
        text: String,
        /// Selection start
        start: i32,
        /// Selection length
        length: i32,
    },
    /// Framebuffer and logical size change
    Resize {
        /// Framebuffer size in pixels
        framebuffer: Vec2i,
        /// Logical size
        window: Vec2i,
    },
    /// Window moved
    Move(Vec2i),
    /// Focus change
    Focus(bool),
    /// Iconify or restore
    Minimize(bool),
    /// Content scale change
    ContentScale(Vec2),
    /// Close button pressed
    Close,
}

/// Settings of the simulated display
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Framebuffer pixels per logical pixel
    pub pixel_ratio: f32,
    /// Monitors connected at startup
    pub monitors: Vec<MonitorProps>,
    /// Report X11 window ids
    pub x11: bool,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            pixel_ratio: 1.0,
            monitors: vec![MonitorProps::new(
                "Headless Display",
                Vec2i::new(1920, 1080),
                60,
                Vec2i::zeros(),
            )],
            x11: false,
        }
    }
}

/// Native state of one simulated window
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessWindowState {
    /// Current title
    pub title: String,
    /// Logical size
    pub size: Vec2i,
    /// Framebuffer size
    pub framebuffer_size: Vec2i,
    /// Position
    pub position: Vec2i,
    /// Shown
    pub visible: bool,
    /// Every visibility change applied, in order
    pub visibility_history: Vec<bool>,
    /// Monitor occupied in fullscreen
    pub fullscreen_monitor: Option<HeadlessMonitor>,
    /// Owner window
    pub owner: Option<WindowId>,
    /// Window whose context is shared
    pub shared_with: Option<WindowId>,
    /// Context the window was created with
    pub gl_spec: Option<GlContextSpec>,
    /// Decoration styles
    pub styles: WindowStyles,
    /// Size of the window icon, `None` for the default icon
    pub icon: Option<(u32, u32)>,
    /// Native cursor shown over the window
    pub cursor: Option<u64>,
    /// IME text input active
    pub text_input: bool,
    /// Last IME rect and cursor offset
    pub text_input_rect: Option<(IntRect, i32)>,
    /// Swap interval enabled
    pub vsync: Option<bool>,
    /// Number of buffer swaps
    pub swaps: u32,
    /// Number of attention requests
    pub attention_requests: u32,
}

impl HeadlessWindowState {
    /// Whether the window is fullscreen
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen_monitor.is_some()
    }
}

/// Record of a released window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestroyedWindow {
    /// Released window
    pub id: WindowId,
    /// Owner was cleared before release
    pub owner_cleared: bool,
}

#[derive(Default)]
struct HeadlessState {
    inputs: VecDeque<(WindowId, HeadlessInput)>,
    monitor_changes: VecDeque<MonitorChange<HeadlessMonitor>>,
    monitors: BTreeMap<HeadlessMonitor, MonitorProps>,
    next_monitor: HeadlessMonitor,
    clipboard: Option<String>,
    fail_next_create: Option<String>,
    woken: bool,
    windows: BTreeMap<WindowId, HeadlessWindowState>,
    destroyed: Vec<DestroyedWindow>,
    live_cursors: BTreeSet<u64>,
    next_cursor: u64,
    shut_down: bool,
}

impl HeadlessState {
    fn has_work(&self) -> bool {
        self.woken || !self.inputs.is_empty() || !self.monitor_changes.is_empty()
    }

    fn add_monitor(&mut self, props: MonitorProps) -> HeadlessMonitor {
        self.next_monitor += 1;
        let handle = self.next_monitor;
        self.monitors.insert(handle, props);
        handle
    }
}

struct Shared {
    state: Mutex<HeadlessState>,
    signal: Condvar,
}

impl Shared {
    fn notify(&self) {
        self.signal.notify_all();
    }
}

struct HeadlessWaker {
    shared: Arc<Shared>,
}

impl LoopWaker for HeadlessWaker {
    fn wake(&self) {
        self.shared.state.lock().woken = true;
        self.shared.notify();
    }
}

/// Native window handle of the headless backend
#[derive(Debug)]
pub struct HeadlessWindow {
    id: WindowId,
}

/// Native cursor handle of the headless backend
#[derive(Debug)]
pub struct HeadlessCursor {
    id: u64,
}

/// Display-less [`NativeBackend`]
pub struct HeadlessBackend {
    shared: Arc<Shared>,
    config: HeadlessConfig,
}

impl HeadlessBackend {
    /// Create a backend and the controller that drives it
    pub fn new(config: HeadlessConfig) -> (Self, HeadlessController) {
        let mut state = HeadlessState::default();
        for props in &config.monitors {
            state.add_monitor(props.clone());
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(state),
            signal: Condvar::new(),
        });
        let controller = HeadlessController { shared: Arc::clone(&shared) };
        (Self { shared, config }, controller)
    }

    fn scale(&self, size: Vec2i) -> Vec2i {
        Vec2i::new(
            (size.x as f32 * self.config.pixel_ratio).round() as i32,
            (size.y as f32 * self.config.pixel_ratio).round() as i32,
        )
    }

    fn with_window(&self, window: &HeadlessWindow, f: impl FnOnce(&mut HeadlessWindowState)) {
        match self.shared.state.lock().windows.get_mut(&window.id) {
            Some(native) => f(native),
            None => log::warn!("Headless window {} has no native state", window.id),
        }
    }

    fn scan_code(key: Key) -> i32 {
        key as i32 + 8
    }

    fn translate(&self, window: WindowId, input: HeadlessInput) -> Event {
        match input {
            HeadlessInput::MouseMove(position) => Event::MouseMove { window, position },
            HeadlessInput::MouseButton(button, action, mods) => {
                Event::MouseButton { window, button, action, mods }
            }
            HeadlessInput::Scroll(delta) => Event::MouseWheel { window, delta },
            HeadlessInput::CursorEnter(entered) => Event::MouseEnterLeave { window, entered },
            HeadlessInput::Key(key, action, mods) => Event::Key {
                window,
                key,
                scan_code: Self::scan_code(key),
                action,
                mods,
            },
            HeadlessInput::Text(text) => Event::Text { window, text },
            HeadlessInput::Composition { text, start, length } => {
                Event::TextEditing { window, text, start, length }
            }
            HeadlessInput::Resize { framebuffer, window: size } => Event::WindowResized {
                window,
                framebuffer_size: framebuffer,
                window_size: size,
            },
            HeadlessInput::Move(position) => Event::WindowMoved { window, position },
            HeadlessInput::Focus(focused) => Event::WindowFocus { window, focused },
            HeadlessInput::Minimize(minimized) => Event::WindowMinimized { window, minimized },
            HeadlessInput::ContentScale(scale) => Event::WindowContentScale { window, scale },
            HeadlessInput::Close => Event::WindowClose { window },
        }
    }

    fn queue_resize(state: &mut HeadlessState, id: WindowId, framebuffer: Vec2i, window: Vec2i) {
        state
            .inputs
            .push_back((id, HeadlessInput::Resize { framebuffer, window }));
    }
}

impl NativeBackend for HeadlessBackend {
    type Window = HeadlessWindow;
    type Cursor = HeadlessCursor;
    type Monitor = HeadlessMonitor;

    fn name(&self) -> &'static str {
        "Headless"
    }

    fn waker(&self) -> Arc<dyn LoopWaker> {
        Arc::new(HeadlessWaker { shared: Arc::clone(&self.shared) })
    }

    fn wake_is_reliable(&self) -> bool {
        true
    }

    fn wait_events(&mut self, timeout: Option<Duration>) {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut state = self.shared.state.lock();

        while !state.has_work() {
            match deadline {
                Some(deadline) => {
                    if self.shared.signal.wait_until(&mut state, deadline).timed_out() {
                        break;
                    }
                }
                None => self.shared.signal.wait(&mut state),
            }
        }

        state.woken = false;
    }

    fn poll_events(&mut self) {
        self.shared.state.lock().woken = false;
    }

    fn drain_events(&mut self, windows: &mut WindowTable<HeadlessWindow>, out: &mut Vec<Event>) {
        let inputs: Vec<_> = {
            let mut state = self.shared.state.lock();
            let drained: Vec<_> = state.inputs.drain(..).collect();
            for (id, input) in &drained {
                if let (HeadlessInput::Resize { framebuffer, window }, Some(native)) =
                    (input, state.windows.get_mut(id))
                {
                    native.framebuffer_size = *framebuffer;
                    native.size = *window;
                }
                if let (HeadlessInput::Move(position), Some(native)) = (input, state.windows.get_mut(id)) {
                    native.position = *position;
                }
            }
            drained
        };

        for (id, input) in inputs {
            if !windows.contains_key(&id) {
                log::trace!("Dropping headless input for unknown window {id}");
                continue;
            }
            out.push(self.translate(id, input));
        }
    }

    fn enumerate_monitors(&mut self) -> Vec<(HeadlessMonitor, MonitorProps)> {
        let state = self.shared.state.lock();
        state
            .monitors
            .iter()
            .map(|(handle, props)| (*handle, props.clone()))
            .collect()
    }

    fn poll_monitor_changes(&mut self) -> Vec<MonitorChange<HeadlessMonitor>> {
        self.shared.state.lock().monitor_changes.drain(..).collect()
    }

    fn key_map(&mut self) -> KeyMap {
        let mut map = KeyMap::new();
        for key in Key::PRINTABLE {
            let name = format!("{key:?}").trim_start_matches("Num").to_lowercase();
            map.insert(key, Some(name), Some(Self::scan_code(key)));
        }
        map
    }

    fn create_window(
        &mut self,
        id: WindowId,
        gl_spec: Option<&GlContextSpec>,
        params: &WindowCreateParameters,
        fullscreen_on: Option<&HeadlessMonitor>,
        share: Option<&HeadlessWindow>,
        owner: Option<&HeadlessWindow>,
    ) -> Result<(HeadlessWindow, NativeWindowState), String> {
        let mut state = self.shared.state.lock();
        if let Some(error) = state.fail_next_create.take() {
            return Err(error);
        }

        if params.width <= 0 || params.height <= 0 {
            return Err(format!("Invalid window size {}x{}", params.width, params.height));
        }

        let mut size = params.size();
        let mut position = Vec2i::new(32, 32) * id.value() as i32;
        let mut fullscreen_monitor = None;

        if params.fullscreen {
            let monitor = fullscreen_on
                .copied()
                .or_else(|| state.monitors.keys().next().copied())
                .ok_or_else(|| "No monitor available for fullscreen".to_string())?;
            if let Some(props) = state.monitors.get(&monitor) {
                size = props.size;
                position = props.position;
            }
            fullscreen_monitor = Some(monitor);
        } else if let (WindowStartupLocation::CenterOwner, Some(owner)) = (params.startup_location, owner) {
            if let Some(owner_state) = state.windows.get(&owner.id) {
                position = center_over(owner_state.position, owner_state.size, size);
            }
        }

        let framebuffer_size = self.scale(size);
        let native = HeadlessWindowState {
            title: params.title.clone(),
            size,
            framebuffer_size,
            position,
            visible: params.visible,
            visibility_history: Vec::new(),
            fullscreen_monitor,
            owner: owner.map(|w| w.id),
            shared_with: share.map(|w| w.id),
            gl_spec: gl_spec.copied(),
            styles: params.styles,
            icon: None,
            cursor: None,
            text_input: false,
            text_input_rect: None,
            vsync: None,
            swaps: 0,
            attention_requests: 0,
        };
        state.windows.insert(id, native);

        let window_state = NativeWindowState {
            framebuffer_size,
            window_size: size,
            position,
            content_scale: Vec2::new(self.config.pixel_ratio, self.config.pixel_ratio),
            visible: params.visible,
            focused: params.visible,
            x11_id: self.config.x11.then(|| 0x0400_0000 + id.value()),
        };

        Ok((HeadlessWindow { id }, window_state))
    }

    fn destroy_window(&mut self, window: HeadlessWindow, had_owner: bool) {
        let mut state = self.shared.state.lock();
        let mut owner_cleared = false;
        if let Some(native) = state.windows.get_mut(&window.id) {
            if had_owner {
                native.owner = None;
                owner_cleared = true;
            }
        }
        state.windows.remove(&window.id);
        state.inputs.retain(|(id, _)| *id != window.id);
        state.destroyed.push(DestroyedWindow { id: window.id, owner_cleared });
    }

    fn set_title(&mut self, window: &mut HeadlessWindow, title: &str) {
        self.with_window(window, |native| native.title = title.to_string());
    }

    fn set_visible(&mut self, window: &mut HeadlessWindow, visible: bool) {
        self.with_window(window, |native| {
            native.visible = visible;
            native.visibility_history.push(visible);
        });
    }

    fn set_size(&mut self, window: &mut HeadlessWindow, size: Vec2i) {
        let framebuffer = self.scale(size);
        let mut state = self.shared.state.lock();
        if state.windows.contains_key(&window.id) {
            Self::queue_resize(&mut state, window.id, framebuffer, size);
        }
    }

    fn set_fullscreen(&mut self, window: &mut HeadlessWindow, monitor: Option<&HeadlessMonitor>) {
        let mut state = self.shared.state.lock();
        let Some(handle) = monitor.copied().or_else(|| state.monitors.keys().next().copied()) else {
            log::warn!("No monitor to make window {} fullscreen on", window.id);
            return;
        };
        let Some(props) = state.monitors.get(&handle).cloned() else {
            log::warn!("Headless monitor {handle} is not connected");
            return;
        };

        let framebuffer = self.scale(props.size);
        if let Some(native) = state.windows.get_mut(&window.id) {
            native.fullscreen_monitor = Some(handle);
            native.position = props.position;
            Self::queue_resize(&mut state, window.id, framebuffer, props.size);
        }
    }

    fn set_windowed(&mut self, window: &mut HeadlessWindow, size: Vec2i, position: Vec2i) {
        let framebuffer = self.scale(size);
        let mut state = self.shared.state.lock();
        if let Some(native) = state.windows.get_mut(&window.id) {
            native.fullscreen_monitor = None;
            Self::queue_resize(&mut state, window.id, framebuffer, size);
            state.inputs.push_back((window.id, HeadlessInput::Move(position)));
        }
    }

    fn request_attention(&mut self, window: &mut HeadlessWindow) {
        self.with_window(window, |native| native.attention_requests += 1);
    }

    fn swap_buffers(&mut self, window: &mut HeadlessWindow) {
        self.with_window(window, |native| native.swaps += 1);
    }

    fn set_vsync(&mut self, window: &mut HeadlessWindow, enabled: bool) {
        self.with_window(window, |native| native.vsync = Some(enabled));
    }

    fn set_icon(&mut self, window: &mut HeadlessWindow, image: Option<&CursorImage>) -> Result<(), String> {
        if let Some(image) = image {
            image.validate()?;
        }
        self.with_window(window, |native| native.icon = image.map(|image| (image.width, image.height)));
        Ok(())
    }

    fn create_standard_cursor(&mut self, shape: StandardCursorShape) -> Result<HeadlessCursor, String> {
        let mut state = self.shared.state.lock();
        state.next_cursor += 1;
        let id = state.next_cursor;
        state.live_cursors.insert(id);
        log::trace!("Created headless standard cursor {shape:?} as {id}");
        Ok(HeadlessCursor { id })
    }

    fn create_cursor(&mut self, image: &CursorImage, hotspot: Vec2i) -> Result<HeadlessCursor, String> {
        if image.width == 0 || image.height == 0 {
            return Err("Cursor image is empty".to_string());
        }
        image.validate()?;
        if hotspot.x < 0 || hotspot.y < 0 || hotspot.x as u32 >= image.width || hotspot.y as u32 >= image.height {
            return Err(format!("Cursor hotspot ({}, {}) outside image", hotspot.x, hotspot.y));
        }

        let mut state = self.shared.state.lock();
        state.next_cursor += 1;
        let id = state.next_cursor;
        state.live_cursors.insert(id);
        Ok(HeadlessCursor { id })
    }

    fn destroy_cursor(&mut self, cursor: HeadlessCursor) {
        let mut state = self.shared.state.lock();
        state.live_cursors.remove(&cursor.id);
        for native in state.windows.values_mut() {
            if native.cursor == Some(cursor.id) {
                native.cursor = None;
            }
        }
    }

    fn set_cursor(&mut self, window: &mut HeadlessWindow, cursor: Option<&HeadlessCursor>) {
        let cursor = cursor.map(|c| c.id);
        self.with_window(window, |native| native.cursor = cursor);
    }

    fn clipboard_get(&mut self, _window: &mut HeadlessWindow) -> Option<String> {
        self.shared.state.lock().clipboard.clone()
    }

    fn clipboard_set(&mut self, _window: &mut HeadlessWindow, text: &str) {
        self.shared.state.lock().clipboard = Some(text.to_string());
    }

    fn text_input_start(&mut self, window: &mut HeadlessWindow) {
        self.with_window(window, |native| native.text_input = true);
    }

    fn text_input_stop(&mut self, window: &mut HeadlessWindow) {
        self.with_window(window, |native| native.text_input = false);
    }

    fn text_input_set_rect(&mut self, window: &mut HeadlessWindow, rect: IntRect, cursor: i32) {
        self.with_window(window, |native| native.text_input_rect = Some((rect, cursor)));
    }

    fn shutdown(&mut self) {
        log::debug!("Headless backend shut down");
        self.shared.state.lock().shut_down = true;
    }
}

/// Thread-safe handle that plays the OS for a [`HeadlessBackend`]
#[derive(Clone)]
pub struct HeadlessController {
    shared: Arc<Shared>,
}

impl HeadlessController {
    /// Queue a native input for a window and wake the loop
    pub fn push_input(&self, window: WindowId, input: HeadlessInput) {
        self.shared.state.lock().inputs.push_back((window, input));
        self.shared.notify();
    }

    /// Connect a monitor, returning its native handle
    pub fn connect_monitor(&self, props: MonitorProps) -> HeadlessMonitor {
        let handle = {
            let mut state = self.shared.state.lock();
            let handle = state.add_monitor(props.clone());
            state.monitor_changes.push_back(MonitorChange::Connected(handle, props));
            handle
        };
        self.shared.notify();
        handle
    }

    /// Disconnect a monitor
    pub fn disconnect_monitor(&self, handle: HeadlessMonitor) {
        {
            let mut state = self.shared.state.lock();
            if state.monitors.remove(&handle).is_none() {
                return;
            }
            state.monitor_changes.push_back(MonitorChange::Disconnected(handle));
        }
        self.shared.notify();
    }

    /// Make the next window creation fail with `error`
    pub fn fail_next_create(&self, error: impl Into<String>) {
        self.shared.state.lock().fail_next_create = Some(error.into());
    }

    /// Set clipboard contents as another application would
    pub fn set_clipboard(&self, text: impl Into<String>) {
        self.shared.state.lock().clipboard = Some(text.into());
    }

    /// Current clipboard contents
    pub fn clipboard(&self) -> Option<String> {
        self.shared.state.lock().clipboard.clone()
    }

    /// Native state of a live window
    pub fn window(&self, id: WindowId) -> Option<HeadlessWindowState> {
        self.shared.state.lock().windows.get(&id).cloned()
    }

    /// Ids of live windows
    pub fn window_ids(&self) -> Vec<WindowId> {
        self.shared.state.lock().windows.keys().copied().collect()
    }

    /// Windows released so far, in release order
    pub fn destroyed_windows(&self) -> Vec<DestroyedWindow> {
        self.shared.state.lock().destroyed.clone()
    }

    /// Number of live native cursors, standard ones included
    pub fn live_cursor_count(&self) -> usize {
        self.shared.state.lock().live_cursors.len()
    }

    /// Whether the backend was shut down
    pub fn is_shut_down(&self) -> bool {
        self.shared.state.lock().shut_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> (HeadlessBackend, HeadlessController) {
        HeadlessBackend::new(HeadlessConfig::default())
    }

    #[test]
    fn test_create_window_scales_framebuffer() {
        let (mut backend, controller) = HeadlessBackend::new(HeadlessConfig {
            pixel_ratio: 2.0,
            ..HeadlessConfig::default()
        });
        let params = WindowCreateParameters::new("Scaled", 800, 600);
        let (window, state) = backend
            .create_window(WindowId(1), None, &params, None, None, None)
            .unwrap();

        assert_eq!(state.window_size, Vec2i::new(800, 600));
        assert_eq!(state.framebuffer_size, Vec2i::new(1600, 1200));
        assert_eq!(state.x11_id, None);
        assert_eq!(controller.window(window.id).unwrap().title, "Scaled");
    }

    #[test]
    fn test_forced_creation_failure_is_one_shot() {
        let (mut backend, controller) = backend();
        controller.fail_next_create("GLX: no matching fbconfig");
        let params = WindowCreateParameters::default();

        let err = backend
            .create_window(WindowId(1), None, &params, None, None, None)
            .unwrap_err();
        assert!(err.contains("fbconfig"));
        assert!(backend
            .create_window(WindowId(1), None, &params, None, None, None)
            .is_ok());
    }

    #[test]
    fn test_center_owner_placement() {
        let (mut backend, controller) = backend();
        let owner_params = WindowCreateParameters::new("Owner", 1000, 800);
        let (owner, owner_state) = backend
            .create_window(WindowId(1), None, &owner_params, None, None, None)
            .unwrap();

        let child_params = WindowCreateParameters::new("Child", 400, 200)
            .with_startup_location(WindowStartupLocation::CenterOwner);
        let (child, child_state) = backend
            .create_window(WindowId(2), None, &child_params, None, None, Some(&owner))
            .unwrap();

        assert_eq!(child_state.position, owner_state.position + Vec2i::new(300, 300));
        assert_eq!(controller.window(child.id).unwrap().owner, Some(WindowId(1)));

        backend.destroy_window(child, true);
        assert_eq!(
            controller.destroyed_windows(),
            vec![DestroyedWindow { id: WindowId(2), owner_cleared: true }]
        );
    }

    #[test]
    fn test_drain_skips_unknown_windows_and_keeps_order() {
        let (mut backend, controller) = backend();
        let params = WindowCreateParameters::default();
        let (window, _) = backend
            .create_window(WindowId(1), None, &params, None, None, None)
            .unwrap();
        let mut table = WindowTable::new();
        table.insert(WindowId(1), window);

        controller.push_input(WindowId(1), HeadlessInput::Focus(true));
        controller.push_input(WindowId(9), HeadlessInput::Close);
        controller.push_input(WindowId(1), HeadlessInput::Text("a".to_string()));

        let mut out = Vec::new();
        backend.drain_events(&mut table, &mut out);
        let kinds: Vec<_> = out.iter().map(Event::kind).collect();
        assert_eq!(kinds, vec!["WindowFocus", "Text"]);
    }

    #[test]
    fn test_wait_returns_after_wake() {
        let (mut backend, _controller) = backend();
        let waker = backend.waker();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            waker.wake();
        });

        let start = Instant::now();
        backend.wait_events(Some(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_times_out_without_work() {
        let (mut backend, _controller) = backend();
        let start = Instant::now();
        backend.wait_events(Some(Duration::from_millis(10)));
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_cursor_validation() {
        let (mut backend, controller) = backend();
        let image = CursorImage { width: 2, height: 2, rgba: vec![0; 16] };

        assert!(backend.create_cursor(&image, Vec2i::new(2, 0)).is_err());
        let short = CursorImage { width: 2, height: 2, rgba: vec![0; 4] };
        assert!(backend.create_cursor(&short, Vec2i::zeros()).is_err());
        let wrapping = CursorImage { width: 65_536, height: 65_536, rgba: Vec::new() };
        assert!(backend.create_cursor(&wrapping, Vec2i::zeros()).is_err());

        let cursor = backend.create_cursor(&image, Vec2i::new(1, 1)).unwrap();
        assert_eq!(controller.live_cursor_count(), 1);
        backend.destroy_cursor(cursor);
        assert_eq!(controller.live_cursor_count(), 0);
    }
}
