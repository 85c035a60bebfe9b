//! Single-shot result slots for commands that need a reply
//!
//! A slot travels inside a command to the windowing thread and comes back
//! inside the completion event. Only the game thread fills it, while
//! dispatching that event, so completions are observed in event order.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

enum SlotState<T> {
    Empty,
    Filled(T),
    Taken,
}

/// Write-once result slot shared between a request and its completion
pub struct ResultSlot<T> {
    state: Arc<Mutex<SlotState<T>>>,
}

impl<T> ResultSlot<T> {
    /// Create an empty slot
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SlotState::Empty)),
        }
    }

    /// Store the result. Returns false if the slot was already fulfilled.
    pub fn fulfill(&self, value: T) -> bool {
        let mut state = self.state.lock();
        match *state {
            SlotState::Empty => {
                *state = SlotState::Filled(value);
                true
            }
            SlotState::Filled(_) | SlotState::Taken => false,
        }
    }

    /// Whether a result has been stored (taken or not)
    pub fn is_completed(&self) -> bool {
        !matches!(*self.state.lock(), SlotState::Empty)
    }

    /// Whether the result was already handed out
    pub fn is_taken(&self) -> bool {
        matches!(*self.state.lock(), SlotState::Taken)
    }

    /// Take the result if one is stored
    pub fn try_take(&self) -> Option<T> {
        let mut state = self.state.lock();
        match std::mem::replace(&mut *state, SlotState::Taken) {
            SlotState::Filled(value) => Some(value),
            SlotState::Empty => {
                *state = SlotState::Empty;
                None
            }
            SlotState::Taken => None,
        }
    }

    /// Game-side view of this slot
    pub fn pending(&self) -> Pending<T> {
        Pending { slot: self.clone() }
    }
}

impl<T> Clone for ResultSlot<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Default for ResultSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ResultSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match *self.state.lock() {
            SlotState::Empty => "empty",
            SlotState::Filled(_) => "filled",
            SlotState::Taken => "taken",
        };
        f.debug_struct("ResultSlot").field("state", &state).finish()
    }
}

/// Handle to a result that arrives later through the event queue.
///
/// Poll it with [`Pending::try_take`], or block on it with
/// `Windowing::wait_for`, which keeps pumping events in order while waiting.
#[derive(Debug)]
pub struct Pending<T> {
    slot: ResultSlot<T>,
}

impl<T> Pending<T> {
    /// Whether the result has arrived
    pub fn is_ready(&self) -> bool {
        self.slot.is_completed() && !self.slot.is_taken()
    }

    /// Whether the result was already taken
    pub fn is_taken(&self) -> bool {
        self.slot.is_taken()
    }

    /// Take the result if it has arrived
    pub fn try_take(&self) -> Option<T> {
        self.slot.try_take()
    }
}
