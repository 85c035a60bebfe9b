//! Windowing demo application
//!
//! Runs a small game loop against the windowing layer: one main window, a
//! custom cursor, a clipboard round trip and a clean shutdown. Without the
//! `glfw` feature the headless backend stands in for the OS and the demo
//! feeds it a few input events itself.
//!
//! Usage: `windowing_demo [config.toml|config.ron]`

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use engine_windowing::logging;
use engine_windowing::prelude::*;
use image::{Rgba, RgbaImage};

const MAX_FRAMES: u32 = 600;
const FRAME_TIME: Duration = Duration::from_millis(16);

/// Headless stand-in for a user poking at the window
struct ScriptedUser {
    os: HeadlessController,
}

impl ScriptedUser {
    fn act(&self, window: WindowId, frame: u32) {
        match frame {
            10 => self.os.push_input(window, HeadlessInput::MouseMove(Vec2::new(400.0, 300.0))),
            20 => self.os.push_input(
                window,
                HeadlessInput::Resize { framebuffer: Vec2i::new(1024, 768), window: Vec2i::new(1024, 768) },
            ),
            30 => self.os.push_input(window, HeadlessInput::Key(Key::Space, KeyAction::Press, Modifiers::empty())),
            40 => self.os.push_input(window, HeadlessInput::Close),
            _ => {}
        }
    }
}

fn crosshair_image() -> RgbaImage {
    RgbaImage::from_fn(16, 16, |x, y| {
        if x == 8 || y == 8 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn run_game<D: Driver>(
    windowing: &mut Windowing<D>,
    user: Option<&ScriptedUser>,
) -> WindowingResult<()> {
    let main = windowing.config().main_window.clone();
    let params = WindowCreateParameters::new(main.title, main.width, main.height);

    // Fall back to compatibility contexts if core is unavailable
    let window = match windowing.window_create(Some(GlContextSpec::GL33_CORE), params.clone(), None, None) {
        Ok(window) => window,
        Err(WindowingError::WindowCreation(reason)) => {
            log::warn!("GL 3.3 core window failed ({reason}), retrying with 3.1 compatibility");
            windowing.window_create(Some(GlContextSpec::GL31_COMPAT), params, None, None)?
        }
        Err(err) => return Err(err),
    };

    let vsync = windowing.config().vsync;
    windowing.update_vsync(vsync)?;
    if windowing.config().window_mode == WindowMode::Fullscreen {
        windowing.update_main_window_mode(WindowMode::Fullscreen)?;
    }

    let close_requested = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&close_requested);
    windowing.register_handler(
        EngineEventKind::WindowCloseRequested,
        Box::new(move |_: &EngineEvent| {
            flag.store(true, Ordering::Release);
            true
        }),
    );
    windowing.register_handler(
        EngineEventKind::Key,
        Box::new(|event: &EngineEvent| {
            if let EngineEvent::Key { key, action: KeyAction::Press, .. } = event {
                log::info!("Key pressed: {key:?}");
            }
            true
        }),
    );

    windowing.window_set_icon(window, Some(&crosshair_image()))?;
    let cursor = windowing.cursor_create(&crosshair_image(), Vec2i::new(8, 8))?;
    windowing.cursor_set(window, Some(&cursor))?;

    windowing.clipboard_set_text(window, "Hello from the game thread")?;
    let clipboard = windowing.clipboard_get_text_blocking(window)?;
    log::info!("Clipboard now holds {clipboard:?}");

    for frame in 0..MAX_FRAMES {
        if let Some(user) = user {
            user.act(window, frame);
        }

        windowing.poll_events();
        for event in windowing.take_engine_events() {
            log::debug!("Unhandled engine event: {event:?}");
        }
        if close_requested.load(Ordering::Acquire) {
            log::info!("Close requested after {frame} frames");
            break;
        }

        windowing.window_swap_buffers(window)?;
        thread::sleep(FRAME_TIME);
    }

    if let Some(reg) = windowing.window(window) {
        log::info!(
            "Final window size {}x{} (pixel ratio {})",
            reg.window_size().x,
            reg.window_size().y,
            reg.pixel_ratio().x
        );
    }

    windowing.cursor_set(window, None)?;
    cursor.dispose()?;
    windowing.window_destroy(window)?;
    windowing.shutdown()
}

#[cfg(not(feature = "glfw"))]
fn create_backend() -> WindowingResult<(HeadlessBackend, Option<ScriptedUser>)> {
    let (backend, os) = HeadlessBackend::new(HeadlessConfig::default());
    Ok((backend, Some(ScriptedUser { os })))
}

#[cfg(feature = "glfw")]
fn create_backend() -> WindowingResult<(GlfwBackend, Option<ScriptedUser>)> {
    Ok((GlfwBackend::new()?, None))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => WindowingConfig::load_from_file(&path)?,
        None => WindowingConfig::default(),
    };
    logging::init_with_level(&config.log_level);
    log::info!("Starting windowing demo");

    let (backend, user) = create_backend()?;

    match config.threading {
        ThreadingMode::Separate => {
            let (mut window_thread, mut windowing) = Windowing::init_threaded(config, backend)?;
            log::info!("Running {}", windowing.get_description());

            let game = thread::Builder::new()
                .name("game".to_string())
                .spawn(move || run_game(&mut windowing, user.as_ref()))?;

            // The native loop stays on the main thread
            window_thread.enter_window_loop();

            game.join().map_err(|_| "Game thread panicked")??;
        }
        ThreadingMode::Inline => {
            let mut windowing = Windowing::init_inline(config, backend)?;
            log::info!("Running {}", windowing.get_description());
            run_game(&mut windowing, user.as_ref())?;
        }
    }

    log::info!("Windowing demo finished");
    Ok(())
}
