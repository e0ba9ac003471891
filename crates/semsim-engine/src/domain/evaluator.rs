//! Micro-Step Evaluator
//!
//! One micro-step executes one phase of the canonical producer or
//! consumer algorithm for the scheduled process. The algorithm spreads
//! over two micro-steps:
//!
//! ```text
//! producer:  wait(empty)  ──>  [ wait(mutex); place; signal(mutex); signal(full)  ]
//! consumer:  wait(full)   ──>  [ wait(mutex); take;  signal(mutex); signal(empty) ]
//! ```
//!
//! Phase 2 is a single indivisible transition: no state between the
//! mutex acquisition and the trailing signals is ever observable.
//!
//! # Wake-up semantics
//!
//! `signal` hands permits directly to queue heads, so the permit of a
//! woken process is already spent. The evaluator therefore advances the
//! woken process's phase at wake time (a producer woken from `empty`
//! resumes holding its permit, in `Producing`); re-running the `wait` it
//! blocked in would double-charge the semaphore.

use super::buffer::Item;
use super::process::{ProcessId, ProcessOperation, ProcessState};
use super::semaphore::SemaphoreId;
use super::simulation::SimulationState;

/// What a produce/consume completion did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Completion {
    /// An item was placed.
    Produced,
    /// An item was removed.
    Consumed,
}

/// Result of evaluating one micro-step.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MicroStep {
    /// Human-readable description, e.g. `P1 acquired empty semaphore`.
    pub action: String,
    /// The process that acted.
    pub process: ProcessId,
    /// Whether the step made progress and deserves a snapshot.
    pub progressed: bool,
    /// Set when the step completed a produce or consume.
    pub completion: Option<Completion>,
}

impl MicroStep {
    fn progress(action: String, process: ProcessId) -> Self {
        Self {
            action,
            process,
            progressed: true,
            completion: None,
        }
    }

    fn completed(action: String, process: ProcessId, completion: Completion) -> Self {
        Self {
            action,
            process,
            progressed: true,
            completion: Some(completion),
        }
    }

    fn stall(action: String, process: ProcessId) -> Self {
        Self {
            action,
            process,
            progressed: false,
            completion: None,
        }
    }
}

impl SimulationState {
    /// Execute one micro-step for the process at `idx`.
    ///
    /// `step_number` is the snapshot number this step will receive if it
    /// progresses; item identities are derived from it.
    pub(crate) fn execute_micro_step(&mut self, idx: usize, step_number: u64) -> MicroStep {
        if self.processes[idx].kind.is_producer() {
            self.producer_step(idx, step_number)
        } else {
            self.consumer_step(idx, step_number)
        }
    }

    fn producer_step(&mut self, idx: usize, step_number: u64) -> MicroStep {
        let pid = self.processes[idx].id;
        match (
            self.processes[idx].current_operation,
            self.processes[idx].waiting_on,
        ) {
            // Phase 1: claim a free slot.
            (ProcessOperation::Idle, _) => {
                if self.semaphores.empty.wait(&mut self.processes[idx]).is_acquired() {
                    self.processes[idx].current_operation = ProcessOperation::Producing;
                    MicroStep::progress(format!("{} acquired empty semaphore", pid), pid)
                } else {
                    self.processes[idx].current_operation = ProcessOperation::WaitingSemaphore;
                    MicroStep::stall(format!("{} waiting for empty slot", pid), pid)
                }
            }
            // Phase 2: the critical section, indivisible.
            (ProcessOperation::Producing, None) => {
                if !self.semaphores.mutex.wait(&mut self.processes[idx]).is_acquired() {
                    return MicroStep::stall(format!("{} waiting for mutex", pid), pid);
                }
                let _slot = self.buffer.place(Item::new(step_number, pid));
                debug_assert!(_slot.is_some(), "empty permit held with no free slot");
                let process = &mut self.processes[idx];
                process.items_processed += 1;
                process.current_operation = ProcessOperation::Idle;
                process.state = ProcessState::Ready;
                if let Some(woken) = self.semaphores.mutex.signal() {
                    self.wake(woken, SemaphoreId::Mutex);
                }
                if let Some(woken) = self.semaphores.full.signal() {
                    self.wake(woken, SemaphoreId::Full);
                }
                MicroStep::completed(
                    format!("{} produced an item", pid),
                    pid,
                    Completion::Produced,
                )
            }
            _ => MicroStep::stall(format!("{} cannot advance", pid), pid),
        }
    }

    fn consumer_step(&mut self, idx: usize, _step_number: u64) -> MicroStep {
        let pid = self.processes[idx].id;
        match (
            self.processes[idx].current_operation,
            self.processes[idx].waiting_on,
        ) {
            // Phase 1: claim an occupied slot.
            (ProcessOperation::Idle, _) => {
                if self.semaphores.full.wait(&mut self.processes[idx]).is_acquired() {
                    self.processes[idx].current_operation = ProcessOperation::Consuming;
                    MicroStep::progress(format!("{} acquired full semaphore", pid), pid)
                } else {
                    self.processes[idx].current_operation = ProcessOperation::WaitingSemaphore;
                    MicroStep::stall(format!("{} waiting for full slot", pid), pid)
                }
            }
            // Phase 2: the critical section, indivisible.
            (ProcessOperation::Consuming, None) => {
                if !self.semaphores.mutex.wait(&mut self.processes[idx]).is_acquired() {
                    return MicroStep::stall(format!("{} waiting for mutex", pid), pid);
                }
                let _item = self.buffer.take();
                debug_assert!(_item.is_some(), "full permit held with no occupied slot");
                let process = &mut self.processes[idx];
                process.items_processed += 1;
                process.current_operation = ProcessOperation::Idle;
                process.state = ProcessState::Ready;
                if let Some(woken) = self.semaphores.mutex.signal() {
                    self.wake(woken, SemaphoreId::Mutex);
                }
                if let Some(woken) = self.semaphores.empty.signal() {
                    self.wake(woken, SemaphoreId::Empty);
                }
                MicroStep::completed(
                    format!("{} consumed an item", pid),
                    pid,
                    Completion::Consumed,
                )
            }
            _ => MicroStep::stall(format!("{} cannot advance", pid), pid),
        }
    }

    /// Finish a permit hand-off on the woken process.
    ///
    /// The permit itself was already transferred inside `signal`; here
    /// the process becomes schedulable again and its phase advances to
    /// reflect the granted semaphore. A grant from `mutex` leaves the
    /// phase alone: the process was already mid-critical-section.
    fn wake(&mut self, id: ProcessId, granted: SemaphoreId) {
        let Some(&idx) = self.index.get(&id) else {
            return;
        };
        let process = &mut self.processes[idx];
        process.state = ProcessState::Ready;
        process.waiting_on = None;
        match granted {
            SemaphoreId::Empty => process.current_operation = ProcessOperation::Producing,
            SemaphoreId::Full => process.current_operation = ProcessOperation::Consuming,
            SemaphoreId::Mutex => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::SimulationConfig;

    fn state(buffer_size: usize, producers: usize, consumers: usize) -> SimulationState {
        SimulationState::initial(SimulationConfig {
            buffer_size,
            producer_count: producers,
            consumer_count: consumers,
            animation_speed: 1.0,
        })
    }

    #[test]
    fn producer_phase_one_acquires_and_enters_producing() {
        let mut world = state(2, 1, 1);

        let step = world.execute_micro_step(0, 1);
        assert!(step.progressed);
        assert_eq!(step.action, "P1 acquired empty semaphore");
        assert_eq!(step.completion, None);
        assert_eq!(world.semaphores.empty.value(), 1);
        assert_eq!(world.processes[0].current_operation, ProcessOperation::Producing);
        assert_eq!(world.processes[0].state, ProcessState::Running);
    }

    #[test]
    fn producer_phase_two_places_item_and_releases() {
        let mut world = state(2, 1, 1);
        world.execute_micro_step(0, 1);

        let step = world.execute_micro_step(0, 2);
        assert!(step.progressed);
        assert_eq!(step.action, "P1 produced an item");
        assert_eq!(step.completion, Some(Completion::Produced));
        assert_eq!(world.semaphores.mutex.value(), 1);
        assert_eq!(world.semaphores.full.value(), 1);
        assert_eq!(world.buffer.occupied_count(), 1);
        assert_eq!(world.buffer.slots()[0].item.as_ref().map(|i| i.id.as_str()), Some("item-2-P1"));
        assert_eq!(world.processes[0].items_processed, 1);
        assert_eq!(world.processes[0].current_operation, ProcessOperation::Idle);
        assert_eq!(world.processes[0].state, ProcessState::Ready);
    }

    #[test]
    fn producer_blocks_on_exhausted_empty_semaphore() {
        let mut world = state(1, 1, 1);
        world.execute_micro_step(0, 1);
        world.execute_micro_step(0, 2);

        let step = world.execute_micro_step(0, 3);
        assert!(!step.progressed);
        assert_eq!(step.action, "P1 waiting for empty slot");
        let p1 = &world.processes[0];
        assert_eq!(p1.state, ProcessState::Blocked);
        assert_eq!(p1.waiting_on, Some(SemaphoreId::Empty));
        assert_eq!(p1.current_operation, ProcessOperation::WaitingSemaphore);
        assert_eq!(world.semaphores.empty.wait_queue(), &[p1.id]);
    }

    #[test]
    fn consume_hands_empty_permit_to_blocked_producer() {
        let mut world = state(1, 1, 1);
        // P1 fills the buffer, then blocks on the next empty permit.
        world.execute_micro_step(0, 1);
        world.execute_micro_step(0, 2);
        world.execute_micro_step(0, 3);

        // C1 acquires full and consumes; the trailing signal(empty) must
        // wake P1 with its grant already applied.
        let step = world.execute_micro_step(1, 3);
        assert_eq!(step.action, "C1 acquired full semaphore");
        let step = world.execute_micro_step(1, 4);
        assert_eq!(step.action, "C1 consumed an item");
        assert_eq!(step.completion, Some(Completion::Consumed));

        let p1 = &world.processes[0];
        assert_eq!(p1.state, ProcessState::Ready);
        assert_eq!(p1.waiting_on, None);
        assert_eq!(p1.current_operation, ProcessOperation::Producing);
        assert!(world.semaphores.empty.wait_queue().is_empty());
        // The handed-off permit is spent, not returned to the pool.
        assert_eq!(world.semaphores.empty.value(), 0);

        // P1 resumes at phase 2 and produces without re-waiting.
        let step = world.execute_micro_step(0, 4);
        assert_eq!(step.action, "P1 produced an item");
        assert_eq!(world.buffer.occupied_count(), 1);
    }

    #[test]
    fn consumer_blocks_on_exhausted_full_semaphore() {
        let mut world = state(2, 1, 1);

        let step = world.execute_micro_step(1, 1);
        assert!(!step.progressed);
        assert_eq!(step.action, "C1 waiting for full slot");
        assert_eq!(world.processes[1].state, ProcessState::Blocked);
        assert_eq!(world.semaphores.full.wait_queue(), &[world.processes[1].id]);
    }
}
