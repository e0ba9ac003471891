//! Semaphore Primitives
//!
//! Three named semaphores drive the bounded-buffer algorithm: `empty` and
//! `full` count free and occupied slots, `mutex` guards the critical
//! section. Each is a non-negative counter paired with a FIFO wait queue
//! of process ids (head at index 0).
//!
//! # Hand-off
//!
//! `signal` on a semaphore with waiters does not leave the permit up for
//! grabs. It re-consumes the permit on behalf of the queue head and
//! returns that process id, so a late-arriving `wait` can never overtake
//! a process that blocked earlier. The engine completes the wake-up by
//! marking the woken process ready and advancing its algorithm phase.

use std::fmt;

use serde::Serialize;

use super::process::{Process, ProcessId, ProcessState};

/// The three semaphore identities of the bounded-buffer algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SemaphoreId {
    /// Counts free buffer slots; producers wait on it.
    Empty,
    /// Counts occupied buffer slots; consumers wait on it.
    Full,
    /// Binary semaphore guarding the critical section.
    Mutex,
}

impl fmt::Display for SemaphoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemaphoreId::Empty => write!(f, "empty"),
            SemaphoreId::Full => write!(f, "full"),
            SemaphoreId::Mutex => write!(f, "mutex"),
        }
    }
}

/// Result of a `wait` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A permit was available and has been consumed.
    Acquired,
    /// No permit; the process is now parked in the wait queue.
    Blocked,
}

impl WaitOutcome {
    /// Check for the acquired outcome.
    #[inline(always)]
    pub const fn is_acquired(self) -> bool {
        matches!(self, WaitOutcome::Acquired)
    }
}

/// One counting semaphore with a FIFO wait queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Semaphore {
    /// Which of the three semaphores this is.
    pub(crate) id: SemaphoreId,
    /// Available permits.
    pub(crate) value: u32,
    /// Blocked process ids, head first.
    pub(crate) wait_queue: Vec<ProcessId>,
}

impl Semaphore {
    /// Create a semaphore with an initial permit count.
    pub fn new(id: SemaphoreId, value: u32) -> Self {
        Self {
            id,
            value,
            wait_queue: Vec::new(),
        }
    }

    /// Semaphore identity.
    #[inline(always)]
    pub fn id(&self) -> SemaphoreId {
        self.id
    }

    /// Available permits.
    #[inline(always)]
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Blocked process ids in FIFO order.
    pub fn wait_queue(&self) -> &[ProcessId] {
        &self.wait_queue
    }

    /// Attempt to take a permit for `process`.
    ///
    /// With a permit available the count drops, the process becomes
    /// `Running` and its `waiting_on` clears. Otherwise the process is
    /// appended to the wait queue (at most once), becomes `Blocked` and
    /// records this semaphore in `waiting_on`.
    pub fn wait(&mut self, process: &mut Process) -> WaitOutcome {
        if self.value > 0 {
            self.value -= 1;
            process.state = ProcessState::Running;
            process.waiting_on = None;
            WaitOutcome::Acquired
        } else {
            if !self.wait_queue.contains(&process.id) {
                self.wait_queue.push(process.id);
            }
            process.state = ProcessState::Blocked;
            process.waiting_on = Some(self.id);
            WaitOutcome::Blocked
        }
    }

    /// Release a permit.
    ///
    /// With waiters present the permit is handed to the queue head: the
    /// count is re-decremented and the dequeued id returned. The caller
    /// finishes the wake-up on the process record. With no waiters the
    /// count simply rises.
    pub fn signal(&mut self) -> Option<ProcessId> {
        self.value += 1;
        if self.wait_queue.is_empty() {
            None
        } else {
            let woken = self.wait_queue.remove(0);
            self.value -= 1;
            Some(woken)
        }
    }
}

/// The semaphore triple of one simulated world.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemaphoreSet {
    /// Free-slot counter, initialized to the buffer capacity.
    pub(crate) empty: Semaphore,
    /// Occupied-slot counter, initialized to zero.
    pub(crate) full: Semaphore,
    /// Critical-section guard, initialized to one.
    pub(crate) mutex: Semaphore,
}

impl SemaphoreSet {
    /// Build the canonical initial triple for a buffer of `capacity`
    /// slots: `empty = capacity`, `full = 0`, `mutex = 1`.
    pub fn for_capacity(capacity: usize) -> Self {
        Self {
            empty: Semaphore::new(SemaphoreId::Empty, capacity as u32),
            full: Semaphore::new(SemaphoreId::Full, 0),
            mutex: Semaphore::new(SemaphoreId::Mutex, 1),
        }
    }

    /// Shared view of one semaphore by identity.
    pub fn get(&self, id: SemaphoreId) -> &Semaphore {
        match id {
            SemaphoreId::Empty => &self.empty,
            SemaphoreId::Full => &self.full,
            SemaphoreId::Mutex => &self.mutex,
        }
    }

    /// The `empty` semaphore.
    pub fn empty(&self) -> &Semaphore {
        &self.empty
    }

    /// The `full` semaphore.
    pub fn full(&self) -> &Semaphore {
        &self.full
    }

    /// The `mutex` semaphore.
    pub fn mutex(&self) -> &Semaphore {
        &self.mutex
    }
}
