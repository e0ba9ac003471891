//! Domain Layer
//!
//! Pure simulation logic, leaves first:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      Domain Layer                          │
//! ├────────────────────────────────────────────────────────────┤
//! │  semaphore   wait/signal with FIFO hand-off                │
//! │  process     identities, scheduling state, algorithm phase │
//! │  buffer      fixed slots, deterministic scans              │
//! │  evaluator   one producer/consumer micro-step              │
//! │  scheduler   declaration-order selection, quiescence probe │
//! │  history     deep snapshots, truncation, restore           │
//! │  stats       derived throughput and utilization figures    │
//! │  simulation  Simulation<C>: state owner + dispatcher       │
//! │  clock       WallClock backends (system / manual)          │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod buffer;
pub mod clock;
pub mod command;
pub mod config;
pub(crate) mod evaluator;
pub mod history;
pub mod process;
pub(crate) mod scheduler;
pub mod semaphore;
pub mod simulation;
pub mod stats;

pub use buffer::{BoundedBuffer, BufferSlot, Item};
pub use clock::{ManualClock, SystemClock, WallClock};
pub use command::{Command, CommandOutcome, RejectReason};
pub use config::SimulationConfig;
pub use history::{History, Snapshot};
pub use process::{Process, ProcessId, ProcessKind, ProcessOperation, ProcessState};
pub use semaphore::{Semaphore, SemaphoreId, SemaphoreSet, WaitOutcome};
pub use simulation::{Simulation, SimulationState, StepOutcome, SystemSimulation};
pub use stats::Statistics;
