//! # Game-thread windowing API
//!
//! [`Windowing`] is what the rest of the engine talks to. It never touches a
//! native handle: every operation validates against the game-side registries,
//! updates them where the result is known up front, and queues a command for
//! the windowing thread. Replies come back as events and are applied in
//! arrival order by the event pump.
//!
//! ## Threaded operation
//!
//! ```no_run
//! use engine_windowing::prelude::*;
//!
//! let (backend, _os) = HeadlessBackend::new(HeadlessConfig::default());
//! let (mut window_thread, mut windowing) =
//!     Windowing::init_threaded(WindowingConfig::default(), backend).unwrap();
//!
//! let game = std::thread::spawn(move || {
//!     let window = windowing
//!         .window_create(None, WindowCreateParameters::new("Game", 800, 600), None, None)
//!         .unwrap();
//!     windowing.window_set_title(window, "Still the game").unwrap();
//!     windowing.shutdown().unwrap();
//! });
//!
//! window_thread.enter_window_loop();
//! game.join().unwrap();
//! ```

use image::RgbaImage;
use std::collections::BTreeMap;

use crate::backend::NativeBackend;
use crate::channel::{command_channel, event_channel, CommandSender, EventReceiver, TryRead};
use crate::command::{ClipboardSlot, Command, WindowCreateSlot};
use crate::config::{ThreadingMode, WindowingConfig};
use crate::cursor::{CursorHandle, CursorImage, CursorRegistry};
use crate::driver::{Driver, InlineDriver, ThreadedDriver};
use crate::error::{WindowingError, WindowingResult};
use crate::events::{EngineEvent, EngineEventBus, EngineEventHandler, EngineEventKind};
use crate::input::{Key, KeyMap, StandardCursorShape};
use crate::monitor::MonitorReg;
use crate::slot::Pending;
use crate::types::{
    GlContextSpec, IntRect, MonitorId, Vec2, Vec2i, WindowCreateParameters, WindowId, WindowMode,
};
use crate::window::WindowReg;
use crate::window_thread::WindowThread;

mod event_pump;

#[cfg(test)]
mod tests;

/// Game-thread windowing front end over a threaded or inline driver
pub struct Windowing<D: Driver> {
    config: WindowingConfig,
    driver: D,
    commands: CommandSender,
    events: EventReceiver,
    windows: BTreeMap<WindowId, WindowReg>,
    main_window: Option<WindowId>,
    monitors: BTreeMap<MonitorId, MonitorReg>,
    key_map: KeyMap,
    cursors: CursorRegistry,
    bus: EngineEventBus,
    backend_name: &'static str,
    terminated: bool,
    shut_down: bool,
}

impl Windowing<ThreadedDriver> {
    /// Set up thread-separated windowing.
    ///
    /// Returns the windowing loop, to be run with
    /// [`WindowThread::enter_window_loop`] on the thread that created
    /// `backend`, and the game-side front end, which can be moved to the game
    /// thread.
    pub fn init_threaded<B: NativeBackend>(
        config: WindowingConfig,
        backend: B,
    ) -> WindowingResult<(WindowThread<B>, Self)> {
        config.validate()?;
        let name = backend.name();
        let (commands, command_rx) = command_channel(backend.waker());
        let (event_tx, events) = event_channel(Some(config.event_queue_capacity));
        let thread = WindowThread::new(backend, command_rx, event_tx, config.wait_timeout());

        let windowing = Self::assemble(config, ThreadedDriver, commands, events, name);
        log::info!("Windowing initialized: {}", windowing.get_description());
        Ok((thread, windowing))
    }
}

impl<B: NativeBackend> Windowing<InlineDriver<B>> {
    /// Set up windowing without thread separation.
    ///
    /// The event channel is unbounded here: producer and consumer share a
    /// thread, so a full channel could never drain.
    pub fn init_inline(config: WindowingConfig, backend: B) -> WindowingResult<Self> {
        config.validate()?;
        let name = backend.name();
        let (commands, command_rx) = command_channel(backend.waker());
        let (event_tx, events) = event_channel(None);
        let thread = WindowThread::new(backend, command_rx, event_tx, config.wait_timeout());

        let mut windowing = Self::assemble(config, InlineDriver::new(thread), commands, events, name);
        windowing.process_events(false);
        log::info!("Windowing initialized: {}", windowing.get_description());
        Ok(windowing)
    }
}

impl<D: Driver> Windowing<D> {
    fn assemble(
        config: WindowingConfig,
        driver: D,
        commands: CommandSender,
        events: EventReceiver,
        backend_name: &'static str,
    ) -> Self {
        Self {
            config,
            driver,
            cursors: CursorRegistry::new(commands.clone()),
            commands,
            events,
            windows: BTreeMap::new(),
            main_window: None,
            monitors: BTreeMap::new(),
            key_map: KeyMap::new(),
            bus: EngineEventBus::new(),
            backend_name,
            terminated: false,
            shut_down: false,
        }
    }

    fn send(&mut self, command: Command) -> WindowingResult<()> {
        if self.terminated {
            return Err(WindowingError::LoopTerminated);
        }
        self.commands.send(command)?;
        self.driver.commands_sent();
        Ok(())
    }

    fn live_window(&mut self, id: WindowId) -> WindowingResult<&mut WindowReg> {
        let reg = self
            .windows
            .get_mut(&id)
            .ok_or(WindowingError::UnknownWindow(id))?;
        if reg.disposed {
            return Err(WindowingError::Disposed { what: "window" });
        }
        Ok(reg)
    }

    fn main_window_id(&self) -> WindowingResult<WindowId> {
        self.main_window
            .ok_or_else(|| WindowingError::InvalidOperation("No main window".to_string()))
    }

    // ---- lifecycle ----

    /// Stop the windowing loop and drain the event channel until it closes.
    ///
    /// Every command queued before this call is processed and every event
    /// emitted before the loop stopped is dispatched. Calling it twice is a
    /// no-op.
    pub fn shutdown(&mut self) -> WindowingResult<()> {
        if self.shut_down {
            return Ok(());
        }

        log::info!("Shutting down windowing");
        self.terminate_window_loop()?;
        self.driver.terminate();

        while let Some(event) = self.events.recv() {
            self.dispatch(event);
        }

        self.main_window = None;
        self.shut_down = true;
        log::info!("Windowing shut down");
        Ok(())
    }

    /// Ask the windowing loop to stop without waiting for it
    pub fn terminate_window_loop(&mut self) -> WindowingResult<()> {
        if self.terminated {
            return Ok(());
        }
        let result = self.send(Command::Terminate);
        self.terminated = true;
        match result {
            Err(WindowingError::LoopTerminated) => {
                log::debug!("Windowing loop already gone");
                Ok(())
            }
            other => other,
        }
    }

    /// Push out native releases of cursors dropped since the last call
    pub fn flush_dispose(&mut self) {
        if !self.terminated {
            self.driver.commands_sent();
        }
    }

    /// Dispatch queued events. `single` stops after one event.
    ///
    /// Returns the number of events dispatched.
    pub fn process_events(&mut self, single: bool) -> usize {
        let mut count = 0;
        loop {
            match self.events.try_read() {
                TryRead::Event(event) => {
                    self.dispatch(event);
                    count += 1;
                    if single {
                        break;
                    }
                }
                TryRead::Empty | TryRead::Closed => break,
            }
        }
        count
    }

    /// Run the native loop if inline, then dispatch everything queued
    pub fn poll_events(&mut self) -> usize {
        self.driver.poll();
        self.process_events(false)
    }

    /// Block until at least one event is queued.
    ///
    /// This stalls the game thread; it exists for round trips like window
    /// creation. Fails once the loop has stopped and the queue is drained.
    pub fn wait_events(&mut self) -> WindowingResult<()> {
        self.driver.wait(&mut self.events)
    }

    /// Block until `pending` has its result, dispatching events one at a time
    /// in arrival order meanwhile
    pub fn wait_for<T>(&mut self, pending: &Pending<T>) -> WindowingResult<T> {
        loop {
            if let Some(value) = pending.try_take() {
                return Ok(value);
            }
            if pending.is_taken() {
                return Err(WindowingError::InvalidOperation(
                    "Result was already taken".to_string(),
                ));
            }
            self.wait_events()?;
            self.process_events(true);
        }
    }

    // ---- windows ----

    /// Create a window and block until the windowing thread has created it.
    ///
    /// Native failures come back as [`WindowingError::WindowCreation`] so the
    /// caller can retry, e.g. with another context profile. The first window
    /// created becomes the main window.
    pub fn window_create(
        &mut self,
        gl_spec: Option<GlContextSpec>,
        params: WindowCreateParameters,
        share: Option<WindowId>,
        owner: Option<WindowId>,
    ) -> WindowingResult<WindowId> {
        for id in share.iter().chain(owner.iter()) {
            self.live_window(*id)?;
        }
        if let Some(monitor) = params.monitor {
            if !self.monitors.contains_key(&monitor) {
                return Err(WindowingError::UnknownMonitor(monitor));
            }
        }

        let slot = WindowCreateSlot::new();
        let pending = slot.pending();
        log::debug!("Requesting window \"{}\" {}x{}", params.title, params.width, params.height);
        self.send(Command::CreateWindow { gl_spec, params, share, owner, slot })?;

        self.wait_for(&pending)?.map_err(WindowingError::WindowCreation)
    }

    /// Destroy a window. Its native resources are released asynchronously.
    pub fn window_destroy(&mut self, window: WindowId) -> WindowingResult<()> {
        let reg = self.live_window(window)?;
        reg.disposed = true;
        reg.cursor = None;
        let had_owner = reg.owner().is_some();

        if self.main_window == Some(window) {
            self.main_window = None;
        }
        self.send(Command::DestroyWindow { window, had_owner })
    }

    /// Change the title
    pub fn window_set_title(&mut self, window: WindowId, title: &str) -> WindowingResult<()> {
        self.live_window(window)?.set_title(title);
        self.send(Command::SetTitle { window, title: title.to_string() })
    }

    /// Make the window fullscreen on a monitor
    pub fn window_set_monitor(&mut self, window: WindowId, monitor: MonitorId) -> WindowingResult<()> {
        self.live_window(window)?;
        if !self.monitors.contains_key(&monitor) {
            return Err(WindowingError::UnknownMonitor(monitor));
        }
        self.send(Command::SetMonitor { window, monitor })
    }

    /// Resize the logical window
    pub fn window_set_size(&mut self, window: WindowId, size: Vec2i) -> WindowingResult<()> {
        if size.x <= 0 || size.y <= 0 {
            return Err(WindowingError::InvalidOperation(format!(
                "Window size must be positive, got {}x{}",
                size.x, size.y
            )));
        }
        self.live_window(window)?;
        self.send(Command::SetSize { window, size })
    }

    /// Show or hide. The game-side flag changes immediately as intent.
    pub fn window_set_visible(&mut self, window: WindowId, visible: bool) -> WindowingResult<()> {
        self.live_window(window)?.set_visible_intent(visible);
        self.send(Command::SetVisible { window, visible })
    }

    /// Flash the window to get the user's attention
    pub fn window_request_attention(&mut self, window: WindowId) -> WindowingResult<()> {
        self.live_window(window)?;
        self.send(Command::RequestAttention { window })
    }

    /// Set the window icon from an RGBA image, or restore the default with `None`
    pub fn window_set_icon(&mut self, window: WindowId, image: Option<&RgbaImage>) -> WindowingResult<()> {
        self.live_window(window)?;
        let image = match image {
            Some(image) if image.width() == 0 || image.height() == 0 => {
                return Err(WindowingError::InvalidOperation("Window icon image is empty".to_string()));
            }
            Some(image) => Some(CursorImage::from_image(image)),
            None => None,
        };
        self.send(Command::SetIcon { window, image })
    }

    /// Present the window's back buffer
    pub fn window_swap_buffers(&mut self, window: WindowId) -> WindowingResult<()> {
        self.live_window(window)?;
        self.send(Command::SwapBuffers { window })
    }

    /// X11 window id, `None` where the platform has none
    pub fn window_get_x11_id(&mut self, window: WindowId) -> WindowingResult<Option<u32>> {
        Ok(self.live_window(window)?.x11_id())
    }

    /// Switch the main window between windowed and fullscreen.
    ///
    /// Going fullscreen remembers the windowed size and position, which are
    /// restored when switching back.
    pub fn update_main_window_mode(&mut self, mode: WindowMode) -> WindowingResult<()> {
        let window = self.main_window_id()?;
        let reg = self.live_window(window)?;

        let command = match mode {
            WindowMode::Fullscreen => {
                // Repeated requests keep the geometry saved on the first one
                if !reg.fullscreen {
                    reg.prev_window_size = reg.window_size();
                    reg.prev_window_position = reg.position();
                    reg.fullscreen = true;
                }
                Command::SetFullscreen { window }
            }
            WindowMode::Windowed => {
                reg.fullscreen = false;
                Command::SetWindowed {
                    window,
                    size: reg.prev_window_size,
                    position: reg.prev_window_position,
                }
            }
        };

        self.config.window_mode = mode;
        self.send(command)
    }

    /// Turn vertical sync on the main window on or off
    pub fn update_vsync(&mut self, enabled: bool) -> WindowingResult<()> {
        self.config.vsync = enabled;
        match self.main_window {
            Some(window) => self.send(Command::SetVSync { window, enabled }),
            None => Ok(()),
        }
    }

    // ---- cursors ----

    /// One of the pre-created standard cursors
    pub fn cursor_get_standard(&self, shape: StandardCursorShape) -> CursorHandle {
        self.cursors.standard(shape)
    }

    /// Create a custom cursor from an RGBA image. Usable immediately.
    pub fn cursor_create(&mut self, image: &RgbaImage, hotspot: Vec2i) -> WindowingResult<CursorHandle> {
        if self.terminated {
            return Err(WindowingError::LoopTerminated);
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(WindowingError::InvalidOperation("Cursor image is empty".to_string()));
        }
        if hotspot.x < 0
            || hotspot.y < 0
            || hotspot.x as u32 >= image.width()
            || hotspot.y as u32 >= image.height()
        {
            return Err(WindowingError::InvalidOperation(format!(
                "Hotspot ({}, {}) is outside the {}x{} cursor image",
                hotspot.x,
                hotspot.y,
                image.width(),
                image.height()
            )));
        }

        let handle = self.cursors.create(CursorImage::from_image(image), hotspot)?;
        self.driver.commands_sent();
        Ok(handle)
    }

    /// Show a cursor over a window, or the default cursor for `None`
    pub fn cursor_set(&mut self, window: WindowId, cursor: Option<&CursorHandle>) -> WindowingResult<()> {
        if let Some(cursor) = cursor {
            cursor.ensure_alive()?;
        }
        self.live_window(window)?.cursor = cursor.cloned();
        self.send(Command::SetCursor { window, cursor: cursor.map(CursorHandle::id) })
    }

    // ---- clipboard ----

    /// Start reading the clipboard. The result arrives through the event queue.
    pub fn clipboard_get_text(&mut self, window: WindowId) -> WindowingResult<Pending<Option<String>>> {
        self.live_window(window)?;
        let slot = ClipboardSlot::new();
        let pending = slot.pending();
        self.send(Command::GetClipboard { window, slot })?;
        Ok(pending)
    }

    /// Read the clipboard, blocking until the windowing thread answers
    pub fn clipboard_get_text_blocking(&mut self, window: WindowId) -> WindowingResult<Option<String>> {
        let pending = self.clipboard_get_text(window)?;
        self.wait_for(&pending)
    }

    /// Write the clipboard
    pub fn clipboard_set_text(&mut self, window: WindowId, text: &str) -> WindowingResult<()> {
        self.live_window(window)?;
        self.send(Command::SetClipboard { window, text: text.to_string() })
    }

    // ---- text input ----

    /// Begin IME text input
    pub fn text_input_start(&mut self, window: WindowId) -> WindowingResult<()> {
        self.live_window(window)?.set_text_input_active(true);
        self.send(Command::TextInputStart { window })
    }

    /// End IME text input
    pub fn text_input_stop(&mut self, window: WindowId) -> WindowingResult<()> {
        self.live_window(window)?.set_text_input_active(false);
        self.send(Command::TextInputStop { window })
    }

    /// Place the IME candidate window. `rect` and `cursor` are in framebuffer pixels.
    pub fn text_input_set_rect(&mut self, window: WindowId, rect: IntRect, cursor: i32) -> WindowingResult<()> {
        let reg = self.live_window(window)?;
        let top_left = reg.to_logical(Vec2::new(rect.left as f32, rect.top as f32));
        let bottom_right = reg.to_logical(Vec2::new(rect.right as f32, rect.bottom as f32));
        let cursor = reg.to_logical(Vec2::new(cursor as f32, 0.0)).x;

        let logical = IntRect::new(
            top_left.x.round() as i32,
            top_left.y.round() as i32,
            bottom_right.x.round() as i32,
            bottom_right.y.round() as i32,
        );
        self.send(Command::TextInputSetRect { window, rect: logical, cursor: cursor.round() as i32 })
    }

    // ---- keyboard ----

    /// Display name of a key under the current layout
    pub fn key_get_name(&self, key: Key) -> Option<String> {
        if let Some(name) = key.special_name() {
            return Some(name.to_string());
        }
        self.key_map.name(key).map(str::to_uppercase)
    }

    /// Platform scan code of a key
    pub fn key_get_scan_code(&self, key: Key) -> Option<i32> {
        self.key_map.scan_code(key)
    }

    // ---- misc ----

    /// Run `action` on the windowing thread
    pub fn run_on_window_thread(&mut self, action: impl FnOnce() + Send + 'static) -> WindowingResult<()> {
        self.send(Command::RunAction(Box::new(action)))
    }

    /// Backend and threading mode, e.g. `"GLFW (separate thread)"`
    pub fn get_description(&self) -> String {
        format!("{} ({})", self.backend_name, self.driver.mode().name())
    }

    /// Threading mode in use
    pub fn threading_mode(&self) -> ThreadingMode {
        self.driver.mode()
    }

    /// Configuration in effect
    pub fn config(&self) -> &WindowingConfig {
        &self.config
    }

    /// Game-side state of a window
    pub fn window(&self, id: WindowId) -> Option<&WindowReg> {
        self.windows.get(&id)
    }

    /// Every known window, disposed ones included until release is confirmed
    pub fn windows(&self) -> impl Iterator<Item = &WindowReg> {
        self.windows.values()
    }

    /// The main window
    pub fn main_window(&self) -> Option<&WindowReg> {
        self.main_window.and_then(|id| self.windows.get(&id))
    }

    /// A connected monitor
    pub fn monitor(&self, id: MonitorId) -> Option<&MonitorReg> {
        self.monitors.get(&id)
    }

    /// Every connected monitor
    pub fn monitors(&self) -> impl Iterator<Item = &MonitorReg> {
        self.monitors.values()
    }

    /// Latest keyboard layout snapshot
    pub fn key_map(&self) -> &KeyMap {
        &self.key_map
    }

    /// Register an engine event handler
    pub fn register_handler(&mut self, kind: EngineEventKind, handler: Box<dyn EngineEventHandler>) {
        self.bus.register_handler(kind, handler);
    }

    /// Take engine events no handler consumed
    pub fn take_engine_events(&mut self) -> Vec<EngineEvent> {
        self.bus.take_events()
    }

    /// Whether the loop was told to terminate
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

impl<D: Driver> Drop for Windowing<D> {
    fn drop(&mut self) {
        if self.terminated {
            return;
        }
        log::debug!("Windowing dropped without shutdown, terminating loop");
        if self.terminate_window_loop().is_ok() {
            self.driver.terminate();
        }
    }
}
