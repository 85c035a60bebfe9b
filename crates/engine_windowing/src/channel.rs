//! The two one-directional queues between the game and windowing threads
//!
//! - Command channel: unbounded, multi-producer. Sending never blocks and
//!   wakes the windowing thread out of its native wait.
//! - Event channel: bounded, single producer. The windowing thread blocks
//!   when it is full, so a wedged game thread shows up as a hung window.

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::sync::Arc;

use crate::backend::LoopWaker;
use crate::command::Command;
use crate::error::{WindowingError, WindowingResult};
use crate::event::Event;

/// Create the command channel, waking through `waker` after every send
pub fn command_channel(waker: Arc<dyn LoopWaker>) -> (CommandSender, CommandReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (CommandSender { tx, waker }, CommandReceiver { rx })
}

/// Create the event channel. `None` makes it unbounded.
pub fn event_channel(capacity: Option<usize>) -> (EventSender, EventReceiver) {
    let (tx, rx) = match capacity {
        Some(capacity) => crossbeam_channel::bounded(capacity),
        None => crossbeam_channel::unbounded(),
    };
    (EventSender { tx }, EventReceiver { rx, peeked: None })
}

/// Producer side of the command channel; cheap to clone, usable from any thread
#[derive(Clone)]
pub struct CommandSender {
    tx: Sender<Command>,
    waker: Arc<dyn LoopWaker>,
}

impl CommandSender {
    /// Enqueue a command and wake the windowing thread.
    pub fn send(&self, command: Command) -> WindowingResult<()> {
        log::trace!("Sending {} command", command.kind());
        self.tx.send(command).map_err(|_| WindowingError::LoopTerminated)?;
        self.waker.wake();
        Ok(())
    }
}

/// Consumer side of the command channel, owned by the windowing thread
pub struct CommandReceiver {
    rx: Receiver<Command>,
}

impl CommandReceiver {
    /// Next queued command, if any
    pub fn try_recv(&self) -> Option<Command> {
        self.rx.try_recv().ok()
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether no commands are queued
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Producer side of the event channel, owned by the windowing thread
pub struct EventSender {
    tx: Sender<Event>,
}

impl EventSender {
    /// Enqueue an event, blocking while the channel is full.
    ///
    /// Hands the event back if the game side has gone away.
    pub fn send(&self, event: Event) -> Result<(), Event> {
        self.tx.send(event).map_err(|err| err.into_inner())
    }
}

/// Result of a non-blocking event read
#[derive(Debug)]
pub enum TryRead {
    /// An event was available
    Event(Event),
    /// Nothing queued right now
    Empty,
    /// Queue drained and the windowing thread closed it
    Closed,
}

/// Consumer side of the event channel, owned by the game thread
pub struct EventReceiver {
    rx: Receiver<Event>,
    peeked: Option<Event>,
}

impl EventReceiver {
    /// Read one event without blocking
    pub fn try_read(&mut self) -> TryRead {
        if let Some(event) = self.peeked.take() {
            return TryRead::Event(event);
        }

        match self.rx.try_recv() {
            Ok(event) => TryRead::Event(event),
            Err(TryRecvError::Empty) => TryRead::Empty,
            Err(TryRecvError::Disconnected) => TryRead::Closed,
        }
    }

    /// Block until an event is available, without consuming it.
    ///
    /// Fails once the channel is closed and drained.
    pub fn wait(&mut self) -> WindowingResult<()> {
        if self.peeked.is_some() {
            return Ok(());
        }

        let event = self.rx.recv().map_err(|_| WindowingError::LoopTerminated)?;
        self.peeked = Some(event);
        Ok(())
    }

    /// Block until the next event, or `None` once closed and drained
    pub fn recv(&mut self) -> Option<Event> {
        self.peeked.take().or_else(|| self.rx.recv().ok())
    }

    /// Whether an event can be read without blocking
    pub fn has_pending(&self) -> bool {
        self.peeked.is_some() || !self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NoopWaker;
    use crate::types::WindowId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    struct CountingWaker(AtomicUsize);

    impl LoopWaker for CountingWaker {
        fn wake(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn close_event(id: u32) -> Event {
        Event::WindowClose { window: WindowId(id) }
    }

    #[test]
    fn test_commands_wake_the_loop() {
        let waker = Arc::new(CountingWaker(AtomicUsize::new(0)));
        let (tx, rx) = command_channel(waker.clone());

        tx.send(Command::Terminate).unwrap();
        tx.clone().send(Command::SwapBuffers { window: WindowId(1) }).unwrap();

        assert_eq!(waker.0.load(Ordering::SeqCst), 2);
        assert_eq!(rx.len(), 2);
        assert!(matches!(rx.try_recv(), Some(Command::Terminate)));
        assert!(matches!(rx.try_recv(), Some(Command::SwapBuffers { .. })));
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn test_send_after_receiver_dropped_fails() {
        let (tx, rx) = command_channel(Arc::new(NoopWaker));
        drop(rx);
        assert!(matches!(tx.send(Command::Terminate), Err(WindowingError::LoopTerminated)));
    }

    #[test]
    fn test_multiple_producers() {
        let (tx, rx) = command_channel(Arc::new(NoopWaker));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let tx = tx.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        tx.send(Command::SwapBuffers { window: WindowId(i) }).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(rx.len(), 100);
    }

    #[test]
    fn test_event_order_and_close() {
        let (tx, mut rx) = event_channel(Some(8));
        for i in 0..3 {
            tx.send(close_event(i)).unwrap();
        }
        drop(tx);

        let mut seen = Vec::new();
        loop {
            match rx.try_read() {
                TryRead::Event(event) => seen.push(event.window().unwrap().0),
                TryRead::Empty => panic!("closed channel reported empty"),
                TryRead::Closed => break,
            }
        }
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn test_wait_peeks_without_consuming() {
        let (tx, mut rx) = event_channel(Some(4));
        tx.send(close_event(9)).unwrap();

        rx.wait().unwrap();
        assert!(rx.has_pending());
        match rx.try_read() {
            TryRead::Event(event) => assert_eq!(event.window(), Some(WindowId(9))),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(rx.try_read(), TryRead::Empty));
    }

    #[test]
    fn test_full_event_channel_blocks_producer() {
        let (tx, mut rx) = event_channel(Some(1));
        tx.send(close_event(1)).unwrap();

        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        let producer = thread::spawn(move || {
            tx.send(close_event(2)).unwrap();
            done_tx.send(()).unwrap();
        });

        assert!(done_rx.recv_timeout(Duration::from_millis(100)).is_err());

        assert!(matches!(rx.try_read(), TryRead::Event(_)));
        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        producer.join().unwrap();
        assert!(matches!(rx.try_read(), TryRead::Event(_)));
    }
}
