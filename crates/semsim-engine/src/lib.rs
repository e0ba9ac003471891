//! Bounded-Buffer Semaphore Simulator
//!
//! # Overview
//!
//! `semsim-engine` is a deterministic, reversible simulator for the
//! classical producer–consumer problem solved with three semaphores
//! (`empty`, `full`, `mutex`). The engine advances one discrete
//! micro-step at a time and records a deep snapshot of everything after
//! each step, so callers can scrub forward and backward through an
//! execution at will.
//!
//! # Architecture
//!
//! - **Domain**: semaphore primitives, process records, the bounded
//!   buffer, the micro-step evaluator, the scheduler, and the snapshot
//!   history, assembled by [`domain::Simulation`]
//! - **Infrastructure**: the trace exporter (JSON and text)
//!
//! # Determinism
//!
//! The engine is a single-threaded synchronous reducer. Scheduling is
//! by declaration order, ties inside the buffer resolve by ascending
//! slot index, and `signal` hands permits to FIFO queue heads, so a
//! given configuration and command sequence produces the same history
//! on every run. Wall time enters only through the pluggable
//! [`domain::WallClock`] backend.
//!
//! # Usage
//!
//! ```rust
//! use semsim_engine::domain::{Command, Simulation, SimulationConfig, SystemClock};
//!
//! let config = SimulationConfig {
//!     buffer_size: 2,
//!     producer_count: 1,
//!     consumer_count: 1,
//!     animation_speed: 1.0,
//! };
//! let mut sim = Simulation::new(config, SystemClock::new());
//!
//! // One full produce: acquire the empty permit, then fill a slot.
//! sim.apply(Command::StepForward);
//! sim.apply(Command::StepForward);
//! assert_eq!(sim.state().buffer().occupied_count(), 1);
//!
//! // Scrub back to the beginning.
//! sim.apply(Command::JumpToStep(0));
//! assert_eq!(sim.state().buffer().occupied_count(), 0);
//! assert!(sim.history().is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod domain;
pub mod infrastructure;

pub use domain::{
    Command,
    CommandOutcome,
    ManualClock,
    RejectReason,
    Simulation,
    SimulationConfig,
    SimulationState,
    Snapshot,
    StepOutcome,
    SystemClock,
    SystemSimulation,
};
pub use infrastructure::{export_json, render_text, trace_document};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
