//! Per-variant dispatch of windowing-thread events on the game thread
//!
//! Each event is dispatched in isolation: an error or a panic while handling
//! one is logged with the event kind and the pump moves on to the next.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use super::Windowing;
use crate::driver::Driver;
use crate::error::{WindowingError, WindowingResult};
use crate::event::Event;
use crate::events::EngineEvent;
use crate::monitor::MonitorReg;
use crate::types::WindowId;
use crate::window::WindowReg;
use crate::window_thread::panic_message;

impl<D: Driver> Windowing<D> {
    pub(super) fn dispatch(&mut self, event: Event) {
        let kind = event.kind();
        log::trace!("Dispatching {kind} event");

        match catch_unwind(AssertUnwindSafe(|| self.dispatch_event(event))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => log::error!("Error handling {kind} event: {err}"),
            Err(panic) => log::error!("Panic handling {kind} event: {}", panic_message(panic.as_ref())),
        }
    }

    fn unknown_window(kind: &str, window: WindowId) -> WindowingResult<()> {
        log::debug!("Ignoring {kind} event for unknown window {window}");
        Ok(())
    }

    /// Windows already disposed game-side receive no further input or state events
    fn live_reg(windows: &mut BTreeMap<WindowId, WindowReg>, window: WindowId) -> Option<&mut WindowReg> {
        windows.get_mut(&window).filter(|reg| !reg.is_disposed())
    }

    fn dispatch_event(&mut self, event: Event) -> WindowingResult<()> {
        let kind = event.kind();

        match event {
            Event::MouseMove { window, position } => {
                let Some(reg) = Self::live_reg(&mut self.windows, window) else {
                    return Self::unknown_window(kind, window);
                };
                let position = reg.apply_mouse_move(position);
                self.bus.emit(EngineEvent::MouseMoved { window, position });
            }
            Event::MouseButton { window, button, action, mods } => {
                let Some(reg) = Self::live_reg(&mut self.windows, window) else {
                    return Self::unknown_window(kind, window);
                };
                let position = reg.mouse_position();
                self.bus.emit(EngineEvent::MouseButton { window, button, action, mods, position });
            }
            Event::MouseWheel { window, delta } => {
                if Self::live_reg(&mut self.windows, window).is_none() {
                    return Self::unknown_window(kind, window);
                }
                self.bus.emit(EngineEvent::MouseWheel { window, delta });
            }
            Event::MouseEnterLeave { window, entered } => {
                let Some(reg) = Self::live_reg(&mut self.windows, window) else {
                    return Self::unknown_window(kind, window);
                };
                reg.apply_mouse_inside(entered);
                self.bus.emit(EngineEvent::MouseEnterLeave { window, entered });
            }
            Event::Key { window, key, scan_code, action, mods } => {
                if Self::live_reg(&mut self.windows, window).is_none() {
                    return Self::unknown_window(kind, window);
                }
                self.bus.emit(EngineEvent::Key { window, key, scan_code, action, mods });
            }
            Event::Text { window, text } => {
                if Self::live_reg(&mut self.windows, window).is_none() {
                    return Self::unknown_window(kind, window);
                }
                self.bus.emit(EngineEvent::TextEntered { window, text });
            }
            Event::TextEditing { window, text, start, length } => {
                if Self::live_reg(&mut self.windows, window).is_none() {
                    return Self::unknown_window(kind, window);
                }
                self.bus.emit(EngineEvent::TextEditing { window, text, start, length });
            }
            Event::WindowResized { window, framebuffer_size, window_size } => {
                let Some(reg) = Self::live_reg(&mut self.windows, window) else {
                    return Self::unknown_window(kind, window);
                };
                match reg.apply_resize(framebuffer_size, window_size, self.config.zero_size_policy) {
                    Some(minimized_hint) => self.bus.emit(EngineEvent::WindowResized {
                        window,
                        framebuffer_size,
                        window_size,
                        minimized_hint,
                    }),
                    None => log::debug!("Suppressed zero-sized resize of window {window}"),
                }
            }
            Event::WindowMoved { window, position } => {
                let Some(reg) = Self::live_reg(&mut self.windows, window) else {
                    return Self::unknown_window(kind, window);
                };
                reg.apply_move(position);
                self.bus.emit(EngineEvent::WindowMoved { window, position });
            }
            Event::WindowFocus { window, focused } => {
                let Some(reg) = Self::live_reg(&mut self.windows, window) else {
                    return Self::unknown_window(kind, window);
                };
                reg.apply_focus(focused);
                self.bus.emit(EngineEvent::WindowFocus { window, focused });
            }
            Event::WindowMinimized { window, minimized } => {
                let Some(reg) = Self::live_reg(&mut self.windows, window) else {
                    return Self::unknown_window(kind, window);
                };
                reg.apply_minimized(minimized);
                self.bus.emit(EngineEvent::WindowMinimized { window, minimized });
            }
            Event::WindowContentScale { window, scale } => {
                let Some(reg) = Self::live_reg(&mut self.windows, window) else {
                    return Self::unknown_window(kind, window);
                };
                reg.apply_content_scale(scale);
                self.bus.emit(EngineEvent::WindowContentScale { window, scale });
            }
            Event::WindowClose { window } => {
                if Self::live_reg(&mut self.windows, window).is_none() {
                    return Self::unknown_window(kind, window);
                }
                self.bus.emit(EngineEvent::WindowCloseRequested { window });
            }
            Event::WindowCreateCompleted { result, slot } => {
                let reply = match result {
                    Ok(created) => {
                        let id = created.id;
                        self.windows.insert(id, WindowReg::from_created(&created));
                        if self.main_window.is_none() {
                            self.main_window = Some(id);
                        }
                        self.bus.emit(EngineEvent::WindowCreated { window: id });
                        Ok(id)
                    }
                    Err(err) => Err(err),
                };

                if !slot.fulfill(reply) {
                    return Err(WindowingError::InvalidOperation(
                        "Window creation result delivered twice".to_string(),
                    ));
                }
            }
            Event::WindowDestroyed { window } => {
                if self.windows.remove(&window).is_none() {
                    return Self::unknown_window(kind, window);
                }
                self.bus.emit(EngineEvent::WindowDestroyed { window });
            }
            Event::ClipboardText { text, slot } => {
                if !slot.fulfill(text) {
                    return Err(WindowingError::InvalidOperation(
                        "Clipboard result delivered twice".to_string(),
                    ));
                }
            }
            Event::MonitorSetup { id, props } => {
                log::info!("Monitor {id}: {} {}x{}@{}", props.name, props.size.x, props.size.y, props.refresh_rate);
                self.monitors.insert(id, MonitorReg::new(id, props));
                self.bus.emit(EngineEvent::MonitorConnected { monitor: id });
            }
            Event::MonitorDestroyed { id } => {
                if self.monitors.remove(&id).is_none() {
                    return Err(WindowingError::UnknownMonitor(id));
                }
                self.bus.emit(EngineEvent::MonitorDisconnected { monitor: id });
            }
            Event::KeyMapChanged(key_map) => {
                log::debug!("Key map updated with {} key names", key_map.len());
                self.key_map = key_map;
                self.bus.emit(EngineEvent::KeyMapChanged);
            }
        }

        Ok(())
    }
}
