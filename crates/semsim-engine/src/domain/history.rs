//! History and Reversibility
//!
//! Every successful micro-step appends one snapshot: a deep, independent
//! copy of all dynamic state. Snapshots are the sole source of truth for
//! stepping backward and jumping; nothing else is replayed or recomputed.
//! Because each snapshot owns its data outright, later mutation of live
//! state can never reach back into recorded history.
//!
//! Snapshot numbering starts at 1; `history[k]` holds the snapshot with
//! `step_number == k + 1` and describes the state *after* that step
//! completed. Backward navigation therefore restores `history[target-1]`
//! and truncates everything above.

use serde::Serialize;

use super::buffer::BoundedBuffer;
use super::process::{Process, ProcessId};
use super::semaphore::SemaphoreSet;
use super::stats::Statistics;

/// A deep copy of all dynamic state after one completed micro-step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// 1-based step number.
    pub step_number: u64,
    /// Human-readable description of the micro-step.
    pub action: String,
    /// The process that acted.
    pub process_id: ProcessId,
    /// Wall time playback started, Unix milliseconds. Recorded for
    /// trace stability; restore does not apply it.
    pub start_time: u64,
    /// Semaphore triple after the step.
    pub semaphores: SemaphoreSet,
    /// All process records after the step.
    pub processes: Vec<Process>,
    /// Buffer contents after the step.
    pub buffer: BoundedBuffer,
    /// Statistics after the step.
    pub statistics: Statistics,
}

impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step {:>3}  {}", self.step_number, self.action)
    }
}

/// Append-only step log, truncated on backward navigation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<Snapshot>,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded snapshots.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check for an empty history.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot at `index`, if recorded.
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.entries.get(index)
    }

    /// All snapshots in step order.
    pub fn as_slice(&self) -> &[Snapshot] {
        &self.entries
    }

    /// Append the snapshot of a just-completed step.
    pub(crate) fn push(&mut self, snapshot: Snapshot) {
        self.entries.push(snapshot);
    }

    /// Discard every snapshot past `len`, making `len` the new length.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// Drop all snapshots.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::process::ProcessKind;

    fn snapshot(step_number: u64) -> Snapshot {
        let processes = vec![Process::new(ProcessKind::Producer, 1)];
        Snapshot {
            step_number,
            action: format!("step {}", step_number),
            process_id: processes[0].id,
            start_time: 0,
            semaphores: SemaphoreSet::for_capacity(1),
            processes,
            buffer: BoundedBuffer::new(1),
            statistics: Statistics::zero(),
        }
    }

    #[test]
    fn push_and_truncate_keep_step_order() {
        let mut history = History::new();
        for n in 1..=4 {
            history.push(snapshot(n));
        }
        assert_eq!(history.len(), 4);

        history.truncate(2);
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(1).map(|s| s.step_number), Some(2));
        assert_eq!(history.get(2), None);
    }

    #[test]
    fn snapshots_are_isolated_deep_copies() {
        let mut history = History::new();
        let mut snap = snapshot(1);
        history.push(snap.clone());

        // Mutating the original after capture must not reach the log.
        snap.action.push_str(" tampered");
        snap.processes[0].items_processed = 99;
        assert_eq!(history.get(0).map(|s| s.action.as_str()), Some("step 1"));
        assert_eq!(history.get(0).map(|s| s.processes[0].items_processed), Some(0));
    }

    #[test]
    fn display_shows_step_and_action() {
        assert_eq!(snapshot(3).to_string(), "step   3  step 3");
    }
}
