use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use approx::assert_relative_eq;
use image::{Rgba, RgbaImage};

use super::*;
use crate::backend::headless::{HeadlessBackend, HeadlessConfig, HeadlessController, HeadlessInput};
use crate::config::ZeroSizePolicy;
use crate::input::{KeyAction, Modifiers};
use crate::monitor::MonitorProps;
use crate::types::WindowStartupLocation;

struct Running {
    windowing: Windowing<ThreadedDriver>,
    os: HeadlessController,
    loop_thread: Option<JoinHandle<()>>,
}

impl Running {
    fn start(config: WindowingConfig, headless: HeadlessConfig) -> Self {
        let (backend, os) = HeadlessBackend::new(headless);
        let (mut window_thread, windowing) = Windowing::init_threaded(config, backend).unwrap();
        let loop_thread = thread::spawn(move || window_thread.enter_window_loop());
        Self { windowing, os, loop_thread: Some(loop_thread) }
    }

    fn with_defaults() -> Self {
        Self::start(WindowingConfig::default(), HeadlessConfig::default())
    }

    fn create(&mut self, width: i32, height: i32) -> WindowId {
        self.windowing
            .window_create(None, WindowCreateParameters::new("Test", width, height), None, None)
            .unwrap()
    }

    /// Two clipboard round trips: everything queued before this call has been
    /// executed, and native events those commands caused have been dispatched.
    fn settle(&mut self, window: WindowId) {
        for _ in 0..2 {
            self.windowing.clipboard_get_text_blocking(window).unwrap();
        }
    }

    fn stop(mut self) {
        self.windowing.shutdown().unwrap();
        if let Some(handle) = self.loop_thread.take() {
            handle.join().unwrap();
        }
    }
}

fn image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
}

#[test]
fn test_create_800x600_window() {
    let mut run = Running::with_defaults();
    let id = run.create(800, 600);

    let reg = run.windowing.window(id).unwrap();
    assert_eq!(reg.window_size(), Vec2i::new(800, 600));
    assert!(reg.is_visible());
    assert!(!reg.is_disposed());
    assert_eq!(run.windowing.main_window().map(WindowReg::id), Some(id));

    let native = run.os.window(id).unwrap();
    assert_eq!(native.size, Vec2i::new(800, 600));
    assert!(native.visible);

    let created: Vec<_> = run
        .windowing
        .take_engine_events()
        .into_iter()
        .filter(|e| matches!(e, EngineEvent::WindowCreated { .. }))
        .collect();
    assert_eq!(created, vec![EngineEvent::WindowCreated { window: id }]);
    run.stop();
}

#[test]
fn test_create_failure_returns_error_without_reg() {
    let mut run = Running::with_defaults();
    run.os.fail_next_create("Requested GL 3.3 core profile is unavailable");

    let result = run.windowing.window_create(
        Some(GlContextSpec::GL33_CORE),
        WindowCreateParameters::new("Fails", 800, 600),
        None,
        None,
    );
    match result {
        Err(WindowingError::WindowCreation(message)) => assert!(message.contains("3.3")),
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(run.windowing.windows().count(), 0);

    let retry = run
        .windowing
        .window_create(Some(GlContextSpec::GL31_COMPAT), WindowCreateParameters::new("Retry", 800, 600), None, None)
        .unwrap();
    assert_eq!(retry, WindowId(1));
    assert_eq!(run.os.window(retry).unwrap().gl_spec, Some(GlContextSpec::GL31_COMPAT));
    run.stop();
}

#[test]
fn test_commands_execute_in_send_order() {
    let mut run = Running::with_defaults();
    let id = run.create(640, 480);
    let order = Arc::new(Mutex::new(Vec::new()));

    for i in 0..50 {
        let order = Arc::clone(&order);
        run.windowing
            .run_on_window_thread(move || order.lock().unwrap().push(i))
            .unwrap();
    }
    run.windowing.window_set_title(id, "first").unwrap();
    run.windowing.window_set_title(id, "second").unwrap();
    run.settle(id);

    assert_eq!(*order.lock().unwrap(), (0..50).collect::<Vec<_>>());
    assert_eq!(run.os.window(id).unwrap().title, "second");
    assert_eq!(run.windowing.window(id).unwrap().title(), "second");
    run.stop();
}

#[test]
fn test_native_events_arrive_in_recorded_order() {
    let mut run = Running::with_defaults();
    let id = run.create(640, 480);
    run.windowing.take_engine_events();

    for x in 0..100 {
        run.os.push_input(id, HeadlessInput::MouseMove(Vec2::new(x as f32, 0.0)));
    }
    run.settle(id);

    let xs: Vec<f32> = run
        .windowing
        .take_engine_events()
        .into_iter()
        .filter_map(|e| match e {
            EngineEvent::MouseMoved { position, .. } => Some(position.x),
            _ => None,
        })
        .collect();
    assert_eq!(xs.len(), 100);
    for (i, x) in xs.iter().enumerate() {
        assert_relative_eq!(*x, i as f32);
    }
    run.stop();
}

#[test]
fn test_small_event_queue_applies_backpressure_without_loss() {
    let mut run = Running::start(
        WindowingConfig::default().with_event_queue_capacity(2),
        HeadlessConfig::default(),
    );
    let id = run.create(640, 480);
    run.windowing.take_engine_events();

    for i in 0..40 {
        run.os.push_input(id, HeadlessInput::Text(i.to_string()));
    }
    run.settle(id);

    let texts: Vec<String> = run
        .windowing
        .take_engine_events()
        .into_iter()
        .filter_map(|e| match e {
            EngineEvent::TextEntered { text, .. } => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(texts, (0..40).map(|i| i.to_string()).collect::<Vec<_>>());
    run.stop();
}

#[test]
fn test_visibility_last_command_wins() {
    let mut run = Running::with_defaults();
    let id = run.create(640, 480);

    run.windowing.window_set_visible(id, false).unwrap();
    assert!(!run.windowing.window(id).unwrap().is_visible());
    run.windowing.window_set_visible(id, true).unwrap();
    assert!(run.windowing.window(id).unwrap().is_visible());
    run.settle(id);

    let native = run.os.window(id).unwrap();
    assert!(native.visible);
    assert_eq!(native.visibility_history, vec![false, true]);
    run.stop();
}

#[test]
fn test_shutdown_completes_in_bounded_time() {
    let mut run = Running::with_defaults();
    let id = run.create(640, 480);
    run.windowing.window_set_title(id, "closing").unwrap();
    for _ in 0..10 {
        run.windowing.window_swap_buffers(id).unwrap();
    }
    let executed = Arc::new(AtomicUsize::new(0));
    for _ in 0..20 {
        let executed = Arc::clone(&executed);
        run.windowing
            .run_on_window_thread(move || {
                executed.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
    }

    let os = run.os.clone();
    let loop_thread = run.loop_thread.take();
    let mut windowing = run.windowing;
    let (done_tx, done_rx) = crossbeam_channel::bounded(1);
    let game = thread::spawn(move || {
        windowing.shutdown().unwrap();
        let remaining = windowing.windows().count();
        done_tx.send(remaining).unwrap();
        windowing
    });

    let remaining = done_rx
        .recv_timeout(Duration::from_secs(10))
        .expect("shutdown did not finish");
    assert_eq!(remaining, 0);

    let mut windowing = game.join().unwrap();
    if let Some(handle) = loop_thread {
        handle.join().unwrap();
    }
    assert!(os.is_shut_down());
    assert_eq!(executed.load(Ordering::SeqCst), 20);
    assert!(os.window_ids().is_empty());
    assert_eq!(os.destroyed_windows().len(), 1);

    assert!(matches!(
        windowing.window_set_title(id, "late"),
        Err(WindowingError::UnknownWindow(_))
    ));
    assert!(windowing.shutdown().is_ok());
}

#[test]
fn test_zero_size_resize_notifies_with_minimized_hint() {
    let mut run = Running::with_defaults();
    let id = run.create(800, 600);
    run.windowing.take_engine_events();

    run.os.push_input(
        id,
        HeadlessInput::Resize { framebuffer: Vec2i::zeros(), window: Vec2i::new(800, 600) },
    );
    run.settle(id);

    let reg = run.windowing.window(id).unwrap();
    assert_eq!(reg.framebuffer_size(), Vec2i::zeros());
    assert_eq!(reg.window_size(), Vec2i::new(800, 600));
    assert_relative_eq!(reg.pixel_ratio().x, 1.0);

    let resized: Vec<_> = run
        .windowing
        .take_engine_events()
        .into_iter()
        .filter(|e| matches!(e, EngineEvent::WindowResized { .. }))
        .collect();
    assert_eq!(
        resized,
        vec![EngineEvent::WindowResized {
            window: id,
            framebuffer_size: Vec2i::zeros(),
            window_size: Vec2i::new(800, 600),
            minimized_hint: true,
        }]
    );
    run.stop();
}

#[test]
fn test_zero_size_resize_suppressed_by_policy() {
    let mut run = Running::start(
        WindowingConfig::default().with_zero_size_policy(ZeroSizePolicy::Suppress),
        HeadlessConfig::default(),
    );
    let id = run.create(800, 600);
    run.windowing.take_engine_events();

    run.os.push_input(
        id,
        HeadlessInput::Resize { framebuffer: Vec2i::zeros(), window: Vec2i::new(800, 600) },
    );
    run.settle(id);

    assert_eq!(run.windowing.window(id).unwrap().framebuffer_size(), Vec2i::zeros());
    assert!(!run
        .windowing
        .take_engine_events()
        .iter()
        .any(|e| matches!(e, EngineEvent::WindowResized { .. })));
    run.stop();
}

#[test]
fn test_resize_recomputes_pixel_ratio() {
    let mut run = Running::with_defaults();
    let id = run.create(800, 600);

    run.os.push_input(
        id,
        HeadlessInput::Resize { framebuffer: Vec2i::new(2048, 1536), window: Vec2i::new(1024, 768) },
    );
    run.settle(id);

    let reg = run.windowing.window(id).unwrap();
    assert_relative_eq!(reg.pixel_ratio().x, 2.0);
    assert_relative_eq!(reg.pixel_ratio().y, 2.0);
    run.stop();
}

#[test]
fn test_cursor_lifecycle() {
    let mut run = Running::with_defaults();
    let id = run.create(640, 480);
    let standard = StandardCursorShape::ALL.len();

    let arrow = run.windowing.cursor_get_standard(StandardCursorShape::Arrow);
    assert!(matches!(arrow.dispose(), Err(WindowingError::InvalidOperation(_))));

    let custom = run.windowing.cursor_create(&image(16, 16), Vec2i::new(8, 8)).unwrap();
    run.windowing.cursor_set(id, Some(&custom)).unwrap();
    run.settle(id);
    assert_eq!(run.os.live_cursor_count(), standard + 1);
    assert!(run.os.window(id).unwrap().cursor.is_some());

    custom.dispose().unwrap();
    custom.dispose().unwrap();
    assert!(matches!(
        run.windowing.cursor_set(id, Some(&custom)),
        Err(WindowingError::Disposed { what: "cursor" })
    ));
    run.windowing.flush_dispose();
    run.settle(id);
    assert_eq!(run.os.live_cursor_count(), standard);
    assert!(run.os.window(id).unwrap().cursor.is_none());

    assert!(matches!(
        run.windowing.cursor_create(&image(4, 4), Vec2i::new(4, 0)),
        Err(WindowingError::InvalidOperation(_))
    ));
    run.stop();
}

#[test]
fn test_dropped_cursor_released_from_other_thread() {
    let mut run = Running::with_defaults();
    let id = run.create(640, 480);
    let standard = StandardCursorShape::ALL.len();

    let cursor = run.windowing.cursor_create(&image(8, 8), Vec2i::zeros()).unwrap();
    run.settle(id);
    assert_eq!(run.os.live_cursor_count(), standard + 1);

    thread::spawn(move || drop(cursor)).join().unwrap();
    run.windowing.flush_dispose();
    run.settle(id);
    assert_eq!(run.os.live_cursor_count(), standard);
    run.stop();
}

#[test]
fn test_clipboard_round_trip() {
    let mut run = Running::with_defaults();
    let id = run.create(640, 480);

    run.os.set_clipboard("from another app");
    let pending = run.windowing.clipboard_get_text(id).unwrap();
    let text = run.windowing.wait_for(&pending).unwrap();
    assert_eq!(text.as_deref(), Some("from another app"));
    assert!(pending.is_taken());

    run.windowing.clipboard_set_text(id, "from the game").unwrap();
    run.settle(id);
    assert_eq!(run.os.clipboard().as_deref(), Some("from the game"));
    run.stop();
}

#[test]
fn test_destroying_child_clears_owner_first() {
    let mut run = Running::with_defaults();
    let owner = run.create(1000, 800);
    let child = run
        .windowing
        .window_create(
            None,
            WindowCreateParameters::new("Child", 400, 200)
                .with_startup_location(WindowStartupLocation::CenterOwner),
            None,
            Some(owner),
        )
        .unwrap();

    let owner_pos = run.windowing.window(owner).unwrap().position();
    assert_eq!(run.windowing.window(child).unwrap().position(), owner_pos + Vec2i::new(300, 300));
    assert_eq!(run.windowing.window(child).unwrap().owner(), Some(owner));

    run.windowing.window_destroy(child).unwrap();
    assert!(matches!(
        run.windowing.window_set_title(child, "gone"),
        Err(WindowingError::Disposed { what: "window" })
    ));
    run.settle(owner);

    let destroyed = run.os.destroyed_windows();
    assert_eq!(destroyed.len(), 1);
    assert_eq!(destroyed[0].id, child);
    assert!(destroyed[0].owner_cleared);
    assert!(run.windowing.window(child).is_none());
    assert!(matches!(
        run.windowing.window_set_title(child, "gone"),
        Err(WindowingError::UnknownWindow(_))
    ));
    run.stop();
}

#[test]
fn test_main_window_mode_round_trip() {
    let mut run = Running::with_defaults();
    let id = run.create(800, 600);
    let windowed_position = run.windowing.window(id).unwrap().position();

    run.windowing.update_main_window_mode(WindowMode::Fullscreen).unwrap();
    run.settle(id);
    assert!(run.os.window(id).unwrap().is_fullscreen());
    assert_eq!(run.windowing.window(id).unwrap().window_size(), Vec2i::new(1920, 1080));
    assert_eq!(run.windowing.config().window_mode, WindowMode::Fullscreen);

    run.windowing.update_main_window_mode(WindowMode::Windowed).unwrap();
    run.settle(id);
    assert!(!run.os.window(id).unwrap().is_fullscreen());
    let reg = run.windowing.window(id).unwrap();
    assert_eq!(reg.window_size(), Vec2i::new(800, 600));
    assert_eq!(reg.position(), windowed_position);
    run.stop();
}

#[test]
fn test_repeated_fullscreen_keeps_windowed_geometry() {
    let mut run = Running::with_defaults();
    let id = run.create(800, 600);
    let windowed_position = run.windowing.window(id).unwrap().position();

    run.windowing.update_main_window_mode(WindowMode::Fullscreen).unwrap();
    run.settle(id);
    run.windowing.update_main_window_mode(WindowMode::Fullscreen).unwrap();
    run.settle(id);
    assert_eq!(run.windowing.window(id).unwrap().window_size(), Vec2i::new(1920, 1080));

    run.windowing.update_main_window_mode(WindowMode::Windowed).unwrap();
    run.settle(id);
    let reg = run.windowing.window(id).unwrap();
    assert_eq!(reg.window_size(), Vec2i::new(800, 600));
    assert_eq!(reg.position(), windowed_position);
    assert_eq!(run.os.window(id).unwrap().size, Vec2i::new(800, 600));
    run.stop();
}

#[test]
fn test_window_icon_set_and_reset() {
    let mut run = Running::with_defaults();
    let id = run.create(640, 480);

    run.windowing.window_set_icon(id, Some(&image(32, 32))).unwrap();
    run.settle(id);
    assert_eq!(run.os.window(id).unwrap().icon, Some((32, 32)));

    run.windowing.window_set_icon(id, None).unwrap();
    run.settle(id);
    assert_eq!(run.os.window(id).unwrap().icon, None);

    assert!(matches!(
        run.windowing.window_set_icon(id, Some(&RgbaImage::new(0, 0))),
        Err(WindowingError::InvalidOperation(_))
    ));

    run.windowing.window_destroy(id).unwrap();
    assert!(matches!(
        run.windowing.window_set_icon(id, Some(&image(16, 16))),
        Err(WindowingError::Disposed { .. })
    ));
    run.stop();
}

#[test]
fn test_set_monitor_and_hotplug() {
    let mut run = Running::with_defaults();
    let id = run.create(800, 600);
    assert_eq!(run.windowing.monitors().count(), 1);

    let native = run.os.connect_monitor(MonitorProps::new(
        "Side Display",
        Vec2i::new(2560, 1440),
        144,
        Vec2i::new(1920, 0),
    ));
    run.settle(id);
    let side = run
        .windowing
        .monitors()
        .find(|m| m.name() == "Side Display")
        .map(MonitorReg::id)
        .unwrap();
    assert_eq!(run.windowing.monitor(side).unwrap().refresh_rate(), 144);

    run.windowing.window_set_monitor(id, side).unwrap();
    run.settle(id);
    assert_eq!(run.windowing.window(id).unwrap().window_size(), Vec2i::new(2560, 1440));

    run.os.disconnect_monitor(native);
    run.settle(id);
    assert!(run.windowing.monitor(side).is_none());
    assert!(matches!(
        run.windowing.window_set_monitor(id, side),
        Err(WindowingError::UnknownMonitor(_))
    ));
    run.stop();
}

#[test]
fn test_text_input_rect_is_converted_to_logical() {
    let mut run = Running::start(
        WindowingConfig::default(),
        HeadlessConfig { pixel_ratio: 2.0, ..HeadlessConfig::default() },
    );
    let id = run.create(800, 600);

    run.windowing.text_input_start(id).unwrap();
    run.windowing
        .text_input_set_rect(id, IntRect::from_dimensions(100, 200, 300, 40), 20)
        .unwrap();
    run.settle(id);

    let native = run.os.window(id).unwrap();
    assert!(native.text_input);
    assert_eq!(native.text_input_rect, Some((IntRect::from_dimensions(50, 100, 150, 20), 10)));

    run.windowing.text_input_stop(id).unwrap();
    run.settle(id);
    assert!(!run.os.window(id).unwrap().text_input);
    assert!(!run.windowing.window(id).unwrap().is_text_input_active());
    run.stop();
}

#[test]
fn test_mouse_position_scaled_to_framebuffer() {
    let mut run = Running::start(
        WindowingConfig::default(),
        HeadlessConfig { pixel_ratio: 2.0, ..HeadlessConfig::default() },
    );
    let id = run.create(800, 600);

    run.os.push_input(id, HeadlessInput::MouseMove(Vec2::new(10.0, 15.0)));
    run.settle(id);
    let position = run.windowing.window(id).unwrap().mouse_position();
    assert_relative_eq!(position.x, 20.0);
    assert_relative_eq!(position.y, 30.0);
    run.stop();
}

#[test]
fn test_key_names() {
    let mut run = Running::with_defaults();
    let id = run.create(640, 480);

    assert_eq!(run.windowing.key_get_name(Key::A).as_deref(), Some("A"));
    assert_eq!(run.windowing.key_get_name(Key::Num1).as_deref(), Some("1"));
    assert_eq!(run.windowing.key_get_name(Key::F5).as_deref(), Some("F5"));
    assert_eq!(run.windowing.key_get_name(Key::Unknown), None);
    assert!(run.windowing.key_get_scan_code(Key::Q).is_some());

    run.windowing.window_destroy(id).unwrap();
    run.stop();
}

#[test]
fn test_handler_panic_does_not_stall_pump() {
    let mut run = Running::with_defaults();
    let id = run.create(640, 480);
    run.windowing.register_handler(
        EngineEventKind::WindowFocus,
        Box::new(|_: &EngineEvent| -> bool { panic!("handler bug") }),
    );
    run.windowing.take_engine_events();

    run.os.push_input(id, HeadlessInput::Focus(false));
    run.os.push_input(id, HeadlessInput::Text("still here".to_string()));
    run.settle(id);

    assert!(!run.windowing.window(id).unwrap().is_focused());
    assert!(run
        .windowing
        .take_engine_events()
        .iter()
        .any(|e| matches!(e, EngineEvent::TextEntered { text, .. } if text == "still here")));
    run.stop();
}

#[test]
fn test_close_request_reaches_handler() {
    let mut run = Running::with_defaults();
    let id = run.create(640, 480);
    let closed = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&closed);
    run.windowing.register_handler(
        EngineEventKind::WindowCloseRequested,
        Box::new(move |event: &EngineEvent| {
            if let EngineEvent::WindowCloseRequested { window } = event {
                seen.lock().unwrap().push(*window);
            }
            true
        }),
    );

    run.os.push_input(id, HeadlessInput::Close);
    run.settle(id);
    assert_eq!(*closed.lock().unwrap(), vec![id]);
    run.stop();
}

#[test]
fn test_misc_window_commands() {
    let mut run = Running::start(
        WindowingConfig::default(),
        HeadlessConfig { x11: true, ..HeadlessConfig::default() },
    );
    let id = run.create(640, 480);

    run.windowing.window_request_attention(id).unwrap();
    run.windowing.window_swap_buffers(id).unwrap();
    run.windowing.update_vsync(false).unwrap();
    run.windowing.window_set_size(id, Vec2i::new(1024, 768)).unwrap();
    run.settle(id);

    let native = run.os.window(id).unwrap();
    assert_eq!(native.attention_requests, 1);
    assert_eq!(native.swaps, 1);
    assert_eq!(native.vsync, Some(false));
    assert_eq!(run.windowing.window(id).unwrap().window_size(), Vec2i::new(1024, 768));
    assert!(run.windowing.window_get_x11_id(id).unwrap().is_some());
    assert!(run.windowing.window_set_size(id, Vec2i::new(0, 10)).is_err());
    run.stop();
}

#[test]
fn test_description_names_backend_and_mode() {
    let run = Running::with_defaults();
    assert_eq!(run.windowing.get_description(), "Headless (separate thread)");
    assert_eq!(run.windowing.threading_mode(), ThreadingMode::Separate);
    run.stop();
}

#[test]
fn test_invalid_config_is_rejected() {
    let (backend, _os) = HeadlessBackend::new(HeadlessConfig::default());
    let result = Windowing::init_threaded(WindowingConfig::default().with_event_queue_capacity(0), backend);
    assert!(matches!(result, Err(WindowingError::Config(_))));
}

#[test]
fn test_inline_mode_runs_on_calling_thread() {
    let (backend, os) = HeadlessBackend::new(HeadlessConfig::default());
    let mut windowing =
        Windowing::init_inline(WindowingConfig::default().with_threading(ThreadingMode::Inline), backend)
            .unwrap();
    assert_eq!(windowing.get_description(), "Headless (inline)");
    assert_eq!(windowing.monitors().count(), 1);

    let id = windowing
        .window_create(None, WindowCreateParameters::new("Inline", 800, 600), None, None)
        .unwrap();
    assert_eq!(windowing.window(id).unwrap().window_size(), Vec2i::new(800, 600));

    windowing.window_set_title(id, "Renamed").unwrap();
    assert_eq!(os.window(id).unwrap().title, "Renamed");

    os.set_clipboard("inline clipboard");
    assert_eq!(
        windowing.clipboard_get_text_blocking(id).unwrap().as_deref(),
        Some("inline clipboard")
    );

    os.push_input(id, HeadlessInput::Focus(false));
    windowing.poll_events();
    assert!(!windowing.window(id).unwrap().is_focused());

    windowing.shutdown().unwrap();
    assert!(os.is_shut_down());
    assert!(windowing.window(id).is_none());
    assert!(matches!(
        windowing.run_on_window_thread(|| {}),
        Err(WindowingError::LoopTerminated)
    ));
}

#[test]
fn test_queued_events_for_destroyed_window_are_dropped() {
    let (backend, os) = HeadlessBackend::new(HeadlessConfig::default());
    let mut windowing =
        Windowing::init_inline(WindowingConfig::default().with_threading(ThreadingMode::Inline), backend)
            .unwrap();
    let id = windowing
        .window_create(None, WindowCreateParameters::new("Doomed", 640, 480), None, None)
        .unwrap();
    windowing.poll_events();
    windowing.take_engine_events();

    os.push_input(id, HeadlessInput::MouseMove(Vec2::new(10.0, 10.0)));
    os.push_input(id, HeadlessInput::Scroll(Vec2::new(0.0, 1.0)));
    os.push_input(id, HeadlessInput::CursorEnter(false));
    os.push_input(id, HeadlessInput::Key(Key::A, KeyAction::Press, Modifiers::empty()));
    os.push_input(id, HeadlessInput::Text("a".to_string()));
    os.push_input(id, HeadlessInput::Composition { text: "k".to_string(), start: 0, length: 1 });
    os.push_input(
        id,
        HeadlessInput::Resize { framebuffer: Vec2i::new(320, 240), window: Vec2i::new(320, 240) },
    );
    os.push_input(id, HeadlessInput::Move(Vec2i::new(5, 5)));
    os.push_input(id, HeadlessInput::Focus(false));
    os.push_input(id, HeadlessInput::Minimize(true));
    os.push_input(id, HeadlessInput::ContentScale(Vec2::new(2.0, 2.0)));
    os.push_input(id, HeadlessInput::Close);

    // Queue the native events without dispatching them
    windowing.wait_events().unwrap();
    windowing.window_destroy(id).unwrap();
    windowing.process_events(false);

    assert_eq!(windowing.take_engine_events(), vec![EngineEvent::WindowDestroyed { window: id }]);
    assert!(windowing.window(id).is_none());
    windowing.shutdown().unwrap();
}

#[test]
fn test_dropping_windowing_stops_loop() {
    let run = Running::with_defaults();
    let os = run.os.clone();
    let Running { windowing, loop_thread, .. } = run;
    drop(windowing);
    if let Some(handle) = loop_thread {
        handle.join().unwrap();
    }
    assert!(os.is_shut_down());
}
