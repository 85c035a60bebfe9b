//! The windowing thread
//!
//! [`WindowThread`] owns the native backend and the only tables that map
//! logical ids to native handles. Each iteration:
//!
//! 1. waits for native events (bounded when the backend cannot be woken),
//! 2. translates every pending native event and pushes it to the event
//!    channel, blocking while the channel is full,
//! 3. executes every queued command.
//!
//! A `Terminate` command stops the loop. Shutdown then answers or executes
//! whatever commands are still queued, releases all native resources and
//! closes the event channel so the game thread's final drain ends.

use std::collections::{BTreeMap, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use crate::backend::{NativeBackend, WindowTable};
use crate::channel::{CommandReceiver, EventSender};
use crate::command::Command;
use crate::event::{Event, WindowCreateResult, WindowCreated};
use crate::input::StandardCursorShape;
use crate::monitor::{MonitorChange, MonitorProps};
use crate::types::{CursorId, GlContextSpec, MonitorId, WindowCreateParameters, WindowId};

/// Wait bound used when the backend has no reliable cross-thread wake
const UNRELIABLE_WAKE_TIMEOUT: Duration = Duration::from_millis(5);

/// Lifecycle of the windowing loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Constructed, startup not run yet
    Idle,
    /// Processing native events and commands
    Running,
    /// Terminate received
    Stopped,
}

/// Windowing-thread half of the windowing layer
pub struct WindowThread<B: NativeBackend> {
    backend: B,
    commands: CommandReceiver,
    events: Option<EventSender>,
    windows: WindowTable<B::Window>,
    owners: BTreeMap<WindowId, WindowId>,
    monitors: BTreeMap<MonitorId, B::Monitor>,
    cursors: HashMap<CursorId, B::Cursor>,
    next_window_id: u32,
    next_monitor_id: u32,
    wait_timeout: Option<Duration>,
    state: LoopState,
    pending: Vec<Event>,
}

impl<B: NativeBackend> WindowThread<B> {
    pub(crate) fn new(
        backend: B,
        commands: CommandReceiver,
        events: EventSender,
        wait_timeout: Option<Duration>,
    ) -> Self {
        let wait_timeout = if backend.wake_is_reliable() {
            wait_timeout
        } else {
            Some(wait_timeout.map_or(UNRELIABLE_WAKE_TIMEOUT, |t| t.min(UNRELIABLE_WAKE_TIMEOUT)))
        };

        Self {
            backend,
            commands,
            events: Some(events),
            windows: WindowTable::new(),
            owners: BTreeMap::new(),
            monitors: BTreeMap::new(),
            cursors: HashMap::new(),
            next_window_id: 1,
            next_monitor_id: 1,
            wait_timeout,
            state: LoopState::Idle,
            pending: Vec::new(),
        }
    }

    /// Run the loop until a `Terminate` command arrives, then shut down.
    ///
    /// Call this on the thread that owns the native library (usually the
    /// process main thread).
    pub fn enter_window_loop(&mut self) {
        self.startup();
        while self.state == LoopState::Running {
            self.iterate(true);
        }
        self.finish();
    }

    /// Current loop state
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Native backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Publish monitors, standard cursors and the key map
    pub(crate) fn startup(&mut self) {
        if self.state != LoopState::Idle {
            return;
        }
        self.state = LoopState::Running;
        log::info!("{} windowing loop starting", self.backend.name());

        for (native, props) in self.backend.enumerate_monitors() {
            self.register_monitor(native, props);
        }

        for shape in StandardCursorShape::ALL {
            match self.backend.create_standard_cursor(shape) {
                Ok(cursor) => {
                    self.cursors.insert(shape.cursor_id(), cursor);
                }
                Err(err) => log::error!("Failed to create standard cursor {shape:?}: {err}"),
            }
        }

        let key_map = self.backend.key_map();
        self.emit(Event::KeyMapChanged(key_map));
    }

    /// One loop iteration. `block` waits for native events first.
    pub(crate) fn iterate(&mut self, block: bool) {
        if block {
            self.backend.wait_events(self.wait_timeout);
        } else {
            self.backend.poll_events();
        }

        for change in self.backend.poll_monitor_changes() {
            match change {
                MonitorChange::Connected(native, props) => self.register_monitor(native, props),
                MonitorChange::Disconnected(native) => self.unregister_monitor(&native),
            }
        }

        self.backend.drain_events(&mut self.windows, &mut self.pending);
        let pending = std::mem::take(&mut self.pending);
        for event in pending {
            self.emit(event);
        }

        self.run_commands();
    }

    /// Execute queued commands until the queue is empty or the loop stops
    pub(crate) fn run_commands(&mut self) {
        while self.state == LoopState::Running {
            let Some(command) = self.commands.try_recv() else {
                break;
            };
            self.execute(command);
        }
    }

    /// Release everything and close the event channel. Runs once.
    pub(crate) fn finish(&mut self) {
        if self.events.is_none() {
            return;
        }
        self.state = LoopState::Stopped;

        while let Some(command) = self.commands.try_recv() {
            match command {
                Command::CreateWindow { slot, .. } => self.emit(Event::WindowCreateCompleted {
                    result: Err("Windowing loop has terminated".to_string()),
                    slot,
                }),
                Command::Terminate => {}
                other => self.execute(other),
            }
        }

        let children: Vec<WindowId> = self.owners.keys().copied().collect();
        for id in children {
            self.destroy_window(id, true);
        }
        let remaining: Vec<WindowId> = self.windows.keys().copied().collect();
        for id in remaining {
            self.destroy_window(id, false);
        }

        for (_, cursor) in self.cursors.drain() {
            self.backend.destroy_cursor(cursor);
        }

        self.backend.shutdown();
        self.events = None;
        log::info!("{} windowing loop stopped", self.backend.name());
    }

    fn emit(&mut self, event: Event) {
        let Some(events) = &self.events else {
            log::debug!("Dropping {} event after shutdown", event.kind());
            return;
        };

        if let Err(event) = events.send(event) {
            log::debug!("Event channel closed, dropping {} event", event.kind());
        }
    }

    fn register_monitor(&mut self, native: B::Monitor, props: MonitorProps) {
        let id = MonitorId(self.next_monitor_id);
        self.next_monitor_id += 1;
        log::debug!("Monitor {id} connected: {}", props.name);
        self.monitors.insert(id, native);
        self.emit(Event::MonitorSetup { id, props });
    }

    fn unregister_monitor(&mut self, native: &B::Monitor) {
        let Some(id) = self.monitors.iter().find(|(_, m)| *m == native).map(|(id, _)| *id) else {
            log::warn!("Disconnect for a monitor that was never registered");
            return;
        };
        self.monitors.remove(&id);
        log::debug!("Monitor {id} disconnected");
        self.emit(Event::MonitorDestroyed { id });
    }

    fn with_window(&mut self, id: WindowId, op: &str, f: impl FnOnce(&mut B, &mut B::Window)) {
        match self.windows.get_mut(&id) {
            Some(window) => f(&mut self.backend, window),
            None => log::warn!("{op} on unknown window {id}"),
        }
    }

    fn destroy_window(&mut self, id: WindowId, had_owner: bool) {
        self.owners.remove(&id);
        match self.windows.remove(&id) {
            Some(native) => self.backend.destroy_window(native, had_owner),
            None => log::warn!("Destroy of unknown window {id}"),
        }
        self.emit(Event::WindowDestroyed { window: id });
    }

    fn create_window(
        &mut self,
        gl_spec: Option<GlContextSpec>,
        params: WindowCreateParameters,
        share: Option<WindowId>,
        owner: Option<WindowId>,
    ) -> WindowCreateResult {
        let share_native = match share {
            Some(id) => Some(
                self.windows
                    .get(&id)
                    .ok_or_else(|| format!("Share window {id} does not exist"))?,
            ),
            None => None,
        };
        let owner_native = match owner {
            Some(id) => Some(
                self.windows
                    .get(&id)
                    .ok_or_else(|| format!("Owner window {id} does not exist"))?,
            ),
            None => None,
        };
        let monitor = match params.monitor {
            Some(id) => Some(
                self.monitors
                    .get(&id)
                    .ok_or_else(|| format!("Monitor {id} is not connected"))?,
            ),
            None => None,
        };

        // Ids are allocated here, not game-side, and only consumed once the
        // native window exists. A failed creation leaves no gap.
        let id = WindowId(self.next_window_id);
        let (native, state) = self.backend.create_window(
            id,
            gl_spec.as_ref(),
            &params,
            monitor,
            share_native,
            owner_native,
        )?;

        self.next_window_id += 1;
        self.windows.insert(id, native);
        if let Some(owner) = owner {
            self.owners.insert(id, owner);
        }
        log::info!("Created window {id} \"{}\"", params.title);

        Ok(WindowCreated {
            id,
            owner,
            title: params.title,
            state,
        })
    }

    fn execute(&mut self, command: Command) {
        log::trace!("Executing {command:?}");

        match command {
            Command::CreateWindow { gl_spec, params, share, owner, slot } => {
                let result = self.create_window(gl_spec, params, share, owner);
                if let Err(err) = &result {
                    log::error!("Window creation failed: {err}");
                }
                self.emit(Event::WindowCreateCompleted { result, slot });
            }
            Command::DestroyWindow { window, had_owner } => self.destroy_window(window, had_owner),
            Command::SetTitle { window, title } => {
                self.with_window(window, "SetTitle", |b, w| b.set_title(w, &title));
            }
            Command::SetVisible { window, visible } => {
                self.with_window(window, "SetVisible", |b, w| b.set_visible(w, visible));
            }
            Command::SetSize { window, size } => {
                self.with_window(window, "SetSize", |b, w| b.set_size(w, size));
            }
            Command::SetMonitor { window, monitor } => {
                let (Some(native_monitor), Some(native_window)) =
                    (self.monitors.get(&monitor), self.windows.get_mut(&window))
                else {
                    log::warn!("SetMonitor with unknown window {window} or monitor {monitor}");
                    return;
                };
                self.backend.set_fullscreen(native_window, Some(native_monitor));
            }
            Command::SetFullscreen { window } => {
                self.with_window(window, "SetFullscreen", |b, w| b.set_fullscreen(w, None));
            }
            Command::SetWindowed { window, size, position } => {
                self.with_window(window, "SetWindowed", |b, w| b.set_windowed(w, size, position));
            }
            Command::RequestAttention { window } => {
                self.with_window(window, "RequestAttention", |b, w| b.request_attention(w));
            }
            Command::SwapBuffers { window } => {
                self.with_window(window, "SwapBuffers", |b, w| b.swap_buffers(w));
            }
            Command::SetVSync { window, enabled } => {
                self.with_window(window, "SetVSync", |b, w| b.set_vsync(w, enabled));
            }
            Command::SetIcon { window, image } => {
                self.with_window(window, "SetIcon", |b, w| {
                    if let Err(err) = b.set_icon(w, image.as_ref()) {
                        log::warn!("Failed to set icon of window {window}: {err}");
                    }
                });
            }
            Command::CreateCursor { cursor, image, hotspot } => {
                match self.backend.create_cursor(&image, hotspot) {
                    Ok(native) => {
                        self.cursors.insert(cursor, native);
                    }
                    Err(err) => log::error!("Failed to create cursor {cursor}: {err}"),
                }
            }
            Command::DestroyCursor { cursor } => match self.cursors.remove(&cursor) {
                Some(native) => self.backend.destroy_cursor(native),
                None => log::debug!("Destroy of cursor {cursor} that has no native cursor"),
            },
            Command::SetCursor { window, cursor } => {
                let native_cursor = cursor.and_then(|id| self.cursors.get(&id));
                if let (Some(id), None) = (cursor, native_cursor) {
                    log::warn!("Cursor {id} has no native cursor, using the default");
                }
                match self.windows.get_mut(&window) {
                    Some(native_window) => self.backend.set_cursor(native_window, native_cursor),
                    None => log::warn!("SetCursor on unknown window {window}"),
                }
            }
            Command::GetClipboard { window, slot } => {
                let text = match self.windows.get_mut(&window) {
                    Some(native) => self.backend.clipboard_get(native),
                    None => {
                        log::warn!("GetClipboard on unknown window {window}");
                        None
                    }
                };
                self.emit(Event::ClipboardText { text, slot });
            }
            Command::SetClipboard { window, text } => {
                self.with_window(window, "SetClipboard", |b, w| b.clipboard_set(w, &text));
            }
            Command::TextInputStart { window } => {
                self.with_window(window, "TextInputStart", |b, w| b.text_input_start(w));
            }
            Command::TextInputStop { window } => {
                self.with_window(window, "TextInputStop", |b, w| b.text_input_stop(w));
            }
            Command::TextInputSetRect { window, rect, cursor } => {
                self.with_window(window, "TextInputSetRect", |b, w| {
                    b.text_input_set_rect(w, rect, cursor)
                });
            }
            Command::RunAction(action) => {
                if let Err(panic) = catch_unwind(AssertUnwindSafe(action)) {
                    log::error!("Window thread action panicked: {}", panic_message(panic.as_ref()));
                }
            }
            Command::Terminate => {
                log::debug!("Terminate received");
                self.state = LoopState::Stopped;
            }
        }
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::{HeadlessBackend, HeadlessConfig, HeadlessController, HeadlessInput};
    use crate::channel::{command_channel, event_channel, CommandSender, EventReceiver, TryRead};
    use crate::slot::ResultSlot;
    use std::sync::{Arc, Mutex};

    struct Harness {
        thread: WindowThread<HeadlessBackend>,
        controller: HeadlessController,
        commands: CommandSender,
        events: EventReceiver,
    }

    fn harness() -> Harness {
        let (backend, controller) = HeadlessBackend::new(HeadlessConfig::default());
        let (commands, command_rx) = command_channel(backend.waker());
        let (event_tx, events) = event_channel(None);
        let thread = WindowThread::new(backend, command_rx, event_tx, Some(Duration::from_millis(1)));
        Harness { thread, controller, commands, events }
    }

    fn drain(events: &mut EventReceiver) -> Vec<Event> {
        let mut out = Vec::new();
        while let TryRead::Event(event) = events.try_read() {
            out.push(event);
        }
        out
    }

    fn create(h: &mut Harness, params: WindowCreateParameters, owner: Option<WindowId>) -> WindowCreateResult {
        let slot = ResultSlot::new();
        h.commands
            .send(Command::CreateWindow { gl_spec: None, params, share: None, owner, slot: slot.clone() })
            .unwrap();
        h.thread.run_commands();
        drain(&mut h.events)
            .into_iter()
            .find_map(|event| match event {
                Event::WindowCreateCompleted { result, .. } => Some(result),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_startup_publishes_monitors_then_key_map() {
        let mut h = harness();
        h.thread.startup();
        let kinds: Vec<_> = drain(&mut h.events).iter().map(Event::kind).collect();
        assert_eq!(kinds, vec!["MonitorSetup", "KeyMapChanged"]);
        assert_eq!(h.controller.live_cursor_count(), StandardCursorShape::ALL.len());
    }

    #[test]
    fn test_window_ids_allocated_only_on_success() {
        let mut h = harness();
        h.thread.startup();
        h.controller.fail_next_create("no context");

        let failed = create(&mut h, WindowCreateParameters::default(), None);
        assert_eq!(failed.unwrap_err(), "no context");

        let created = create(&mut h, WindowCreateParameters::default(), None).unwrap();
        assert_eq!(created.id, WindowId(1));
    }

    #[test]
    fn test_unknown_owner_fails_creation() {
        let mut h = harness();
        h.thread.startup();
        let result = create(&mut h, WindowCreateParameters::default(), Some(WindowId(42)));
        assert!(result.unwrap_err().contains("Owner window"));
    }

    #[test]
    fn test_native_events_precede_commands_in_iteration() {
        let mut h = harness();
        h.thread.startup();
        let id = create(&mut h, WindowCreateParameters::default(), None).unwrap().id;

        h.controller.push_input(id, HeadlessInput::Focus(false));
        h.controller.push_input(id, HeadlessInput::Close);
        let slot = ResultSlot::new();
        h.commands.send(Command::GetClipboard { window: id, slot }).unwrap();
        h.thread.iterate(true);

        let kinds: Vec<_> = drain(&mut h.events).iter().map(Event::kind).collect();
        assert_eq!(kinds, vec!["WindowFocus", "WindowClose", "ClipboardText"]);
    }

    #[test]
    fn test_terminate_then_finish_answers_queued_creation() {
        let mut h = harness();
        h.thread.startup();
        let id = create(&mut h, WindowCreateParameters::default(), None).unwrap().id;

        h.commands.send(Command::Terminate).unwrap();
        let slot = ResultSlot::new();
        h.commands
            .send(Command::CreateWindow {
                gl_spec: None,
                params: WindowCreateParameters::default(),
                share: None,
                owner: None,
                slot,
            })
            .unwrap();
        h.thread.run_commands();
        assert_eq!(h.thread.state(), LoopState::Stopped);

        h.thread.finish();
        let events = drain(&mut h.events);
        assert!(events.iter().any(|e| matches!(e, Event::WindowCreateCompleted { result: Err(_), .. })));
        assert!(events.iter().any(|e| matches!(e, Event::WindowDestroyed { window } if *window == id)));
        assert!(matches!(h.events.try_read(), TryRead::Closed));
        assert!(h.controller.is_shut_down());
        assert_eq!(h.controller.live_cursor_count(), 0);
    }

    #[test]
    fn test_panicking_action_is_contained() {
        let mut h = harness();
        h.thread.startup();
        let ran = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&ran);

        h.commands.send(Command::RunAction(Box::new(|| panic!("boom")))).unwrap();
        h.commands
            .send(Command::RunAction(Box::new(move || *flag.lock().unwrap() = true)))
            .unwrap();
        h.thread.run_commands();

        assert!(*ran.lock().unwrap());
        assert_eq!(h.thread.state(), LoopState::Running);
    }

    #[test]
    fn test_children_destroyed_before_owners_on_shutdown() {
        let mut h = harness();
        h.thread.startup();
        let owner = create(&mut h, WindowCreateParameters::default(), None).unwrap().id;
        let child = create(&mut h, WindowCreateParameters::default(), Some(owner)).unwrap().id;

        h.thread.finish();
        let destroyed = h.controller.destroyed_windows();
        assert_eq!(destroyed[0].id, child);
        assert!(destroyed[0].owner_cleared);
        assert_eq!(destroyed[1].id, owner);
    }
}
