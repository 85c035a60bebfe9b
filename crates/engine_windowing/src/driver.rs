//! Send/dispatch plumbing for threaded and inline operation
//!
//! The command and event types and every handler are shared between the two
//! modes. Only what happens after a command is queued, and how the game
//! thread waits for events, differ.

use crate::backend::NativeBackend;
use crate::channel::EventReceiver;
use crate::config::ThreadingMode;
use crate::error::WindowingResult;
use crate::window_thread::{LoopState, WindowThread};

/// Game-thread side of a threading mode
pub trait Driver {
    /// Mode this driver implements
    fn mode(&self) -> ThreadingMode;

    /// Called after the game thread queued one or more commands
    fn commands_sent(&mut self);

    /// Give the native loop a chance to run without blocking
    fn poll(&mut self);

    /// Block until at least one event can be read
    fn wait(&mut self, events: &mut EventReceiver) -> WindowingResult<()>;

    /// Called once the game thread sent `Terminate`
    fn terminate(&mut self);
}

/// The windowing loop runs on its own thread; nothing to do here but wait
#[derive(Debug, Default)]
pub struct ThreadedDriver;

impl Driver for ThreadedDriver {
    fn mode(&self) -> ThreadingMode {
        ThreadingMode::Separate
    }

    fn commands_sent(&mut self) {}

    fn poll(&mut self) {}

    fn wait(&mut self, events: &mut EventReceiver) -> WindowingResult<()> {
        events.wait()
    }

    fn terminate(&mut self) {}
}

/// No thread separation: commands run as soon as they are sent and the
/// native loop is iterated on the calling thread.
pub struct InlineDriver<B: NativeBackend> {
    thread: WindowThread<B>,
}

impl<B: NativeBackend> InlineDriver<B> {
    pub(crate) fn new(mut thread: WindowThread<B>) -> Self {
        thread.startup();
        Self { thread }
    }

    /// The loop this driver runs
    pub fn window_thread(&self) -> &WindowThread<B> {
        &self.thread
    }

    fn finish_if_stopped(&mut self) {
        if self.thread.state() == LoopState::Stopped {
            self.thread.finish();
        }
    }
}

impl<B: NativeBackend> Driver for InlineDriver<B> {
    fn mode(&self) -> ThreadingMode {
        ThreadingMode::Inline
    }

    fn commands_sent(&mut self) {
        self.thread.run_commands();
        self.finish_if_stopped();
    }

    fn poll(&mut self) {
        if self.thread.state() == LoopState::Running {
            self.thread.iterate(false);
        }
        self.finish_if_stopped();
    }

    fn wait(&mut self, events: &mut EventReceiver) -> WindowingResult<()> {
        loop {
            if events.has_pending() {
                return Ok(());
            }
            if self.thread.state() != LoopState::Running {
                self.thread.finish();
                return events.wait();
            }
            self.thread.iterate(true);
        }
    }

    fn terminate(&mut self) {
        self.thread.finish();
    }
}

impl<B: NativeBackend> std::fmt::Debug for InlineDriver<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineDriver")
            .field("backend", &self.thread.backend().name())
            .field("state", &self.thread.state())
            .finish()
    }
}
