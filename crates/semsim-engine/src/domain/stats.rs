//! Derived Statistics
//!
//! Throughput counters plus two values recomputed from the post-step
//! state. Statistics are captured into every snapshot, so restoring a
//! snapshot restores them too.

use serde::Serialize;

use super::buffer::BoundedBuffer;
use super::process::Process;

/// Aggregate statistics over one simulated world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    /// Completed produce operations.
    pub items_produced: u64,
    /// Completed consume operations.
    pub items_consumed: u64,
    /// Occupied slots over capacity, as a percentage.
    pub buffer_utilization: f64,
    /// Arithmetic mean of per-process `total_wait_time`.
    pub average_wait_time: f64,
}

impl Statistics {
    /// All-zero statistics for a fresh world.
    pub const fn zero() -> Self {
        Self {
            items_produced: 0,
            items_consumed: 0,
            buffer_utilization: 0.0,
            average_wait_time: 0.0,
        }
    }

    /// Recompute the derived fields from the post-step state. The
    /// throughput counters are owned by the evaluator and left alone.
    pub fn recompute(&mut self, buffer: &BoundedBuffer, processes: &[Process]) {
        self.buffer_utilization =
            buffer.occupied_count() as f64 / buffer.capacity() as f64 * 100.0;
        self.average_wait_time = if processes.is_empty() {
            0.0
        } else {
            let total: u64 = processes.iter().map(|p| p.total_wait_time).sum();
            total as f64 / processes.len() as f64
        };
    }
}

impl Default for Statistics {
    fn default() -> Self {
        Self::zero()
    }
}
