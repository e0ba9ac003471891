//! Simulation Engine
//!
//! `Simulation` owns the whole world: configuration, semaphore triple,
//! process table, buffer, statistics, and the snapshot history. It is a
//! synchronous reducer; every command runs to completion on the calling
//! thread and there is no interior locking because nothing is shared.
//!
//! # Architecture
//!
//! ```text
//! Simulation<C: WallClock>
//!   ├─ state: SimulationState        (semaphores, processes, buffer, stats)
//!   ├─ history: History              (one deep snapshot per completed step)
//!   └─ clock: C                      (SystemClock in production, ManualClock in tests)
//! ```
//!
//! Commands enter through [`Simulation::apply`]; the scheduler picks the
//! acting process, the evaluator runs one micro-step, statistics are
//! recomputed and the snapshot appended. Invalid input never fails, it
//! collapses to a reported no-op.

use std::collections::HashMap;

use tracing::debug;

use super::buffer::BoundedBuffer;
use super::clock::{SystemClock, WallClock};
use super::command::{Command, CommandOutcome, RejectReason};
use super::config::SimulationConfig;
use super::evaluator::Completion;
use super::history::{History, Snapshot};
use super::process::{Process, ProcessId, ProcessKind};
use super::scheduler;
use super::semaphore::SemaphoreSet;
use super::stats::Statistics;

/// All dynamic state of one simulated world.
///
/// Obtained read-only through [`Simulation::state`]; the engine is the
/// only writer.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub(crate) config: SimulationConfig,
    pub(crate) semaphores: SemaphoreSet,
    pub(crate) processes: Vec<Process>,
    /// Id to process-table index, rebuilt only when the table is.
    pub(crate) index: HashMap<ProcessId, usize>,
    pub(crate) buffer: BoundedBuffer,
    pub(crate) current_step: u64,
    pub(crate) is_playing: bool,
    pub(crate) animation_speed: f64,
    pub(crate) start_time: u64,
    pub(crate) statistics: Statistics,
}

impl SimulationState {
    /// Build the initial world for a configuration: full `empty`
    /// semaphore, all processes ready, all slots free, zero statistics.
    pub(crate) fn initial(config: SimulationConfig) -> Self {
        let mut processes = Vec::with_capacity(config.process_count());
        for n in 1..=config.producer_count {
            processes.push(Process::new(ProcessKind::Producer, n as u32));
        }
        for n in 1..=config.consumer_count {
            processes.push(Process::new(ProcessKind::Consumer, n as u32));
        }
        let index = processes
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, i))
            .collect();

        Self {
            semaphores: SemaphoreSet::for_capacity(config.buffer_size),
            processes,
            index,
            buffer: BoundedBuffer::new(config.buffer_size),
            current_step: 0,
            is_playing: false,
            animation_speed: config.animation_speed,
            start_time: 0,
            statistics: Statistics::zero(),
            config,
        }
    }

    /// Deep-restore the dynamic portion of a snapshot. Playback fields
    /// (`is_playing`, `animation_speed`) and the live `start_time` stay.
    pub(crate) fn restore_from(&mut self, snapshot: &Snapshot) {
        self.semaphores = snapshot.semaphores.clone();
        self.processes = snapshot.processes.clone();
        self.buffer = snapshot.buffer.clone();
        self.statistics = snapshot.statistics;
        self.current_step = snapshot.step_number;
    }

    /// The installed configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The semaphore triple.
    pub fn semaphores(&self) -> &SemaphoreSet {
        &self.semaphores
    }

    /// All processes in declaration order (producers, then consumers).
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// Look up one process by id.
    pub fn process(&self, id: ProcessId) -> Option<&Process> {
        self.index.get(&id).map(|&i| &self.processes[i])
    }

    /// The bounded buffer.
    pub fn buffer(&self) -> &BoundedBuffer {
        &self.buffer
    }

    /// Number of completed steps; always equals the history length.
    pub fn current_step(&self) -> u64 {
        self.current_step
    }

    /// Whether playback is running.
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// The playback pacing hint.
    pub fn animation_speed(&self) -> f64 {
        self.animation_speed
    }

    /// Wall time playback first started, Unix milliseconds.
    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    /// The derived statistics.
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }
}

/// Result of one forward step attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// A micro-step completed and a snapshot was appended.
    Progressed {
        /// Description of the completed micro-step.
        action: String,
        /// The process that acted.
        process: ProcessId,
    },
    /// The scheduled process blocked; state changed, no snapshot.
    Blocked {
        /// Description of the blocked attempt.
        action: String,
        /// The process that blocked.
        process: ProcessId,
    },
    /// No process could be scheduled.
    Quiescent,
}

impl StepOutcome {
    /// Check whether a snapshot was appended.
    #[inline(always)]
    pub const fn is_progress(&self) -> bool {
        matches!(self, StepOutcome::Progressed { .. })
    }

    /// The action description, when a process was scheduled.
    pub fn action(&self) -> Option<&str> {
        match self {
            StepOutcome::Progressed { action, .. } | StepOutcome::Blocked { action, .. } => {
                Some(action)
            }
            StepOutcome::Quiescent => None,
        }
    }
}

/// Production engine driven by the host clock.
pub type SystemSimulation = Simulation<SystemClock>;

/// The simulation engine.
///
/// # Example
///
/// ```rust
/// use semsim_engine::domain::{Command, ManualClock, Simulation, SimulationConfig};
///
/// let config = SimulationConfig {
///     buffer_size: 1,
///     producer_count: 1,
///     consumer_count: 1,
///     animation_speed: 1.0,
/// };
/// let mut sim = Simulation::new(config, ManualClock::new());
///
/// sim.apply(Command::StepForward);
/// sim.apply(Command::StepForward);
/// assert_eq!(sim.state().current_step(), 2);
/// assert_eq!(sim.state().statistics().items_produced, 1);
///
/// sim.apply(Command::StepBackward);
/// assert_eq!(sim.state().current_step(), 1);
/// ```
pub struct Simulation<C: WallClock> {
    state: SimulationState,
    history: History,
    clock: C,
}

impl Simulation<SystemClock> {
    /// Create an engine on the host clock.
    pub fn with_system_clock(config: SimulationConfig) -> Self {
        Self::new(config, SystemClock::new())
    }
}

impl<C: WallClock> Simulation<C> {
    /// Create an engine with an explicit clock backend.
    ///
    /// An out-of-range configuration is replaced by the default one, in
    /// keeping with the rule that invalid input never fails.
    pub fn new(config: SimulationConfig, clock: C) -> Self {
        let config = if config.is_valid() {
            config
        } else {
            debug!("initial configuration out of range; using defaults");
            SimulationConfig::default()
        };
        Self {
            state: SimulationState::initial(config),
            history: History::new(),
            clock,
        }
    }

    /// Read-only view of the current state.
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// The snapshot history, oldest first.
    pub fn history(&self) -> &[Snapshot] {
        self.history.as_slice()
    }

    /// Consume the engine, yielding the final state.
    pub fn into_state(self) -> SimulationState {
        self.state
    }

    /// Apply one command, returning the discriminated outcome.
    pub fn apply(&mut self, command: Command) -> CommandOutcome {
        let outcome = match command {
            Command::SetConfig(config) => self.set_config(config),
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::StepForward => match self.step_forward() {
                StepOutcome::Quiescent => CommandOutcome::Quiescent,
                _ => CommandOutcome::Applied,
            },
            Command::StepBackward => self.step_backward(),
            Command::JumpToStep(target) => self.jump_to_step(target),
            Command::SetSpeed(speed) => self.set_speed(speed),
            Command::Reset => self.reset(),
        };
        if let CommandOutcome::Rejected(reason) = outcome {
            debug!(%reason, "command rejected");
        }
        outcome
    }

    /// Advance at most one micro-step.
    ///
    /// A snapshot is appended only when the scheduled process made
    /// progress; a blocked attempt changes the process and queue state
    /// but records nothing.
    pub fn step_forward(&mut self) -> StepOutcome {
        let Some(idx) = scheduler::select_next(&self.state.processes) else {
            scheduler::report_quiescence(&self.state.processes, &self.state.semaphores);
            return StepOutcome::Quiescent;
        };

        let step_number = self.history.len() as u64 + 1;
        let micro = self.state.execute_micro_step(idx, step_number);
        debug_assert!(self.state.semaphores.mutex().value() <= 1);

        if !micro.progressed {
            return StepOutcome::Blocked {
                action: micro.action,
                process: micro.process,
            };
        }

        match micro.completion {
            Some(Completion::Produced) => self.state.statistics.items_produced += 1,
            Some(Completion::Consumed) => self.state.statistics.items_consumed += 1,
            None => {}
        }
        {
            let SimulationState {
                ref buffer,
                ref processes,
                ref mut statistics,
                ..
            } = self.state;
            statistics.recompute(buffer, processes);
        }

        self.history.push(Snapshot {
            step_number,
            action: micro.action.clone(),
            process_id: micro.process,
            start_time: self.state.start_time,
            semaphores: self.state.semaphores.clone(),
            processes: self.state.processes.clone(),
            buffer: self.state.buffer.clone(),
            statistics: self.state.statistics,
        });
        self.state.current_step = self.history.len() as u64;

        StepOutcome::Progressed {
            action: micro.action,
            process: micro.process,
        }
    }

    fn set_config(&mut self, config: SimulationConfig) -> CommandOutcome {
        if !config.is_valid() {
            return CommandOutcome::Rejected(RejectReason::InvalidConfig);
        }
        self.state = SimulationState::initial(config);
        self.history.clear();
        CommandOutcome::Applied
    }

    fn start(&mut self) -> CommandOutcome {
        if !self.state.is_playing {
            self.state.is_playing = true;
            self.state.start_time = self.state.start_time.max(self.clock.now_ms());
        }
        CommandOutcome::Applied
    }

    fn pause(&mut self) -> CommandOutcome {
        self.state.is_playing = false;
        CommandOutcome::Applied
    }

    fn step_backward(&mut self) -> CommandOutcome {
        if self.state.current_step == 0 {
            return CommandOutcome::Applied;
        }
        self.restore_to(self.state.current_step - 1);
        CommandOutcome::Applied
    }

    fn jump_to_step(&mut self, target: i64) -> CommandOutcome {
        if target < 0 || target as usize > self.history.len() {
            return CommandOutcome::Rejected(RejectReason::InvalidJumpTarget);
        }
        self.restore_to(target as u64);
        CommandOutcome::Applied
    }

    fn set_speed(&mut self, speed: f64) -> CommandOutcome {
        if !SimulationConfig::is_valid_speed(speed) {
            return CommandOutcome::Rejected(RejectReason::InvalidSpeed);
        }
        self.state.animation_speed = speed;
        CommandOutcome::Applied
    }

    fn reset(&mut self) -> CommandOutcome {
        let speed = self.state.animation_speed;
        self.state = SimulationState::initial(self.state.config);
        self.state.animation_speed = speed;
        self.history.clear();
        CommandOutcome::Applied
    }

    /// Restore the world to the state after step `target`, discarding
    /// every later snapshot. Target 0 rebuilds the initial state from
    /// the configuration; playback fields survive either way.
    fn restore_to(&mut self, target: u64) {
        if target == 0 {
            let speed = self.state.animation_speed;
            let playing = self.state.is_playing;
            let started = self.state.start_time;
            self.state = SimulationState::initial(self.state.config);
            self.state.animation_speed = speed;
            self.state.is_playing = playing;
            self.state.start_time = started;
            self.history.clear();
            return;
        }
        let Some(snapshot) = self.history.get(target as usize - 1).cloned() else {
            return;
        };
        self.state.restore_from(&snapshot);
        self.history.truncate(target as usize);
    }
}
