//! Process Records
//!
//! A simulated process is a small record: a stable identity (`P1`, `C2`),
//! a scheduling state, and the phase of the producer/consumer algorithm it
//! is currently in. Processes are created once per configuration install
//! and never added or removed afterwards.
//!
//! # State Transitions
//!
//! ```text
//! Ready ──────> Running      (semaphore acquired this micro-step)
//!   ↑  └──────> Blocked      (semaphore unavailable)
//!   │               │
//!   └───────────────┘        (permit handed off by signal)
//! ```
//!
//! The earlier string-typed discriminants of this state machine are
//! represented here as closed enums so the scheduler and evaluator match
//! statements are compile-time total.

use std::fmt;

use serde::{Serialize, Serializer};

use super::semaphore::SemaphoreId;

/// Whether a process produces items into the buffer or consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    /// Acquires `empty`, then `mutex`, then places an item.
    Producer,
    /// Acquires `full`, then `mutex`, then removes an item.
    Consumer,
}

impl ProcessKind {
    /// Check for the producer kind.
    #[inline(always)]
    pub const fn is_producer(self) -> bool {
        matches!(self, ProcessKind::Producer)
    }
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessKind::Producer => write!(f, "producer"),
            ProcessKind::Consumer => write!(f, "consumer"),
        }
    }
}

/// Stable process identity.
///
/// Displays and serializes as `P<n>` or `C<n>` with a 1-based index,
/// matching the identities exposed to callers and embedded in item ids.
///
/// # Example
///
/// ```rust
/// use semsim_engine::domain::{ProcessId, ProcessKind};
///
/// let id = ProcessId::new(ProcessKind::Producer, 1);
/// assert_eq!(id.to_string(), "P1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId {
    kind: ProcessKind,
    index: u32,
}

impl ProcessId {
    /// Create an id from a kind and a 1-based index.
    #[inline(always)]
    pub const fn new(kind: ProcessKind, index: u32) -> Self {
        Self { kind, index }
    }

    /// The process kind encoded in this id.
    #[inline(always)]
    pub const fn kind(self) -> ProcessKind {
        self.kind
    }

    /// The 1-based index within the kind (`P3` has index 3).
    #[inline(always)]
    pub const fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            ProcessKind::Producer => 'P',
            ProcessKind::Consumer => 'C',
        };
        write!(f, "{}{}", prefix, self.index)
    }
}

impl Serialize for ProcessId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Scheduling state of a process.
///
/// The scheduler considers `Ready` and `Running` processes eligible.
/// `Blocked` processes sit in exactly one semaphore wait queue and leave
/// it only through a permit hand-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Idle and eligible for scheduling.
    Ready,
    /// Made progress in the current or most recent micro-step.
    Running,
    /// Parked in a semaphore wait queue.
    Blocked,
}

impl ProcessState {
    /// Check whether the scheduler may pick this process.
    #[inline(always)]
    pub const fn is_eligible(self) -> bool {
        matches!(self, ProcessState::Ready | ProcessState::Running)
    }

    /// Check for the blocked state.
    #[inline(always)]
    pub const fn is_blocked(self) -> bool {
        matches!(self, ProcessState::Blocked)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Ready => write!(f, "ready"),
            ProcessState::Running => write!(f, "running"),
            ProcessState::Blocked => write!(f, "blocked"),
        }
    }
}

/// Phase of the producer/consumer algorithm a process is in.
///
/// `Producing`/`Consuming` mean the outer counting-semaphore permit is
/// held and the critical section has not completed yet. A process blocked
/// before acquiring that permit shows `WaitingSemaphore`; a process
/// blocked on `mutex` keeps its `Producing`/`Consuming` phase and is
/// distinguished by its `waiting_on` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessOperation {
    /// Between algorithm iterations; the next micro-step starts phase 1.
    Idle,
    /// Holds an `empty` permit; the next micro-step performs the produce.
    Producing,
    /// Holds a `full` permit; the next micro-step performs the consume.
    Consuming,
    /// Parked before the outer permit was acquired.
    WaitingSemaphore,
}

impl ProcessOperation {
    /// Check whether a counting-semaphore permit is currently held.
    #[inline(always)]
    pub const fn holds_permit(self) -> bool {
        matches!(self, ProcessOperation::Producing | ProcessOperation::Consuming)
    }
}

impl fmt::Display for ProcessOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessOperation::Idle => write!(f, "none"),
            ProcessOperation::Producing => write!(f, "producing"),
            ProcessOperation::Consuming => write!(f, "consuming"),
            ProcessOperation::WaitingSemaphore => write!(f, "waiting_semaphore"),
        }
    }
}

/// One simulated process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Process {
    /// Stable identity, fixed at construction.
    pub id: ProcessId,
    /// Producer or consumer.
    pub kind: ProcessKind,
    /// Scheduling state.
    pub state: ProcessState,
    /// Algorithm phase.
    pub current_operation: ProcessOperation,
    /// The semaphore this process is parked on, if blocked.
    pub waiting_on: Option<SemaphoreId>,
    /// Completed produce or consume operations.
    pub items_processed: u64,
    /// Cumulative abstract wait time. The engine carries this field
    /// through unchanged; callers own its accounting.
    pub total_wait_time: u64,
}

impl Process {
    /// Create a freshly initialized process in the `Ready` state.
    pub fn new(kind: ProcessKind, index: u32) -> Self {
        Self {
            id: ProcessId::new(kind, index),
            kind,
            state: ProcessState::Ready,
            current_operation: ProcessOperation::Idle,
            waiting_on: None,
            items_processed: 0,
            total_wait_time: 0,
        }
    }
}
