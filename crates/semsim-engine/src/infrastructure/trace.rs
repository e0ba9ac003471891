//! Trace Export
//!
//! Serializes the snapshot history into two stable external formats: a
//! JSON document for tooling and an indented text rendering for humans.
//! Both carry the same fields.
//!
//! Per-step timestamps are not measurements. They are derived as
//! `start_time + step_number × 1000 / animation_speed` milliseconds, the
//! labeling convention playback uses, and are preserved verbatim for
//! compatibility.

use std::fmt::Write as _;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::domain::buffer::BoundedBuffer;
use crate::domain::config::SimulationConfig;
use crate::domain::history::Snapshot;
use crate::domain::process::{Process, ProcessId};
use crate::domain::semaphore::SemaphoreSet;
use crate::domain::simulation::SimulationState;
use crate::domain::stats::Statistics;

/// Document-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceMetadata {
    /// When the export was produced, RFC 3339.
    pub export_timestamp: String,
    /// The configuration the trace was recorded under.
    pub simulation_config: SimulationConfig,
    /// Number of recorded steps.
    pub total_steps: u64,
    /// Span of the derived step timestamps, milliseconds.
    pub total_duration_ms: u64,
}

/// One exported step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceStep<'a> {
    /// 1-based step number.
    pub step_number: u64,
    /// Derived step timestamp, RFC 3339.
    pub timestamp: String,
    /// Action description.
    pub action: &'a str,
    /// The acting process.
    pub process_id: ProcessId,
    /// Semaphore triple after the step.
    pub semaphores: &'a SemaphoreSet,
    /// Process records after the step.
    pub processes: &'a [Process],
    /// Buffer contents after the step.
    pub buffer: &'a BoundedBuffer,
    /// Statistics after the step.
    pub statistics: &'a Statistics,
}

/// The full export document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceDocument<'a> {
    /// Document-level metadata.
    pub metadata: TraceMetadata,
    /// One entry per recorded snapshot, oldest first.
    pub steps: Vec<TraceStep<'a>>,
}

/// Build the export document over the engine's state and history.
///
/// `export_at_ms` is the wall time of the export itself, Unix
/// milliseconds; the caller reads it from its clock backend.
pub fn trace_document<'a>(
    state: &'a SimulationState,
    history: &'a [Snapshot],
    export_at_ms: u64,
) -> TraceDocument<'a> {
    let speed = state.animation_speed();
    let total_steps = history.len() as u64;
    let metadata = TraceMetadata {
        export_timestamp: rfc3339(export_at_ms as i64),
        simulation_config: *state.config(),
        total_steps,
        total_duration_ms: (total_steps as f64 * 1000.0 / speed) as u64,
    };

    let steps = history
        .iter()
        .map(|snapshot| TraceStep {
            step_number: snapshot.step_number,
            timestamp: rfc3339(step_timestamp_ms(
                snapshot.start_time,
                snapshot.step_number,
                speed,
            )),
            action: &snapshot.action,
            process_id: snapshot.process_id,
            semaphores: &snapshot.semaphores,
            processes: &snapshot.processes,
            buffer: &snapshot.buffer,
            statistics: &snapshot.statistics,
        })
        .collect();

    TraceDocument { metadata, steps }
}

/// Serialize the document as pretty-printed JSON.
pub fn export_json(document: &TraceDocument<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}

/// Render the document as indented text, one block per step.
pub fn render_text(document: &TraceDocument<'_>) -> String {
    let mut out = String::new();
    let meta = &document.metadata;
    let _ = writeln!(out, "simulation trace");
    let _ = writeln!(out, "  exported:    {}", meta.export_timestamp);
    let _ = writeln!(
        out,
        "  config:      buffer={} producers={} consumers={} speed={}",
        meta.simulation_config.buffer_size,
        meta.simulation_config.producer_count,
        meta.simulation_config.consumer_count,
        meta.simulation_config.animation_speed,
    );
    let _ = writeln!(out, "  total steps: {}", meta.total_steps);
    let _ = writeln!(out, "  duration:    {} ms", meta.total_duration_ms);

    for step in &document.steps {
        let _ = writeln!(out);
        let _ = writeln!(out, "step {} [{}]", step.step_number, step.timestamp);
        let _ = writeln!(out, "  action:  {} ({})", step.action, step.process_id);
        let _ = writeln!(
            out,
            "  semaphores: empty={} full={} mutex={}",
            step.semaphores.empty().value(),
            step.semaphores.full().value(),
            step.semaphores.mutex().value(),
        );
        for sem in [
            step.semaphores.empty(),
            step.semaphores.full(),
            step.semaphores.mutex(),
        ] {
            if !sem.wait_queue().is_empty() {
                let queue: Vec<String> =
                    sem.wait_queue().iter().map(ToString::to_string).collect();
                let _ = writeln!(out, "    {} queue: {}", sem.id(), queue.join(", "));
            }
        }
        for process in step.processes {
            let _ = writeln!(
                out,
                "  {}: state={} op={} waiting_on={} items={} wait_time={}",
                process.id,
                process.state,
                process.current_operation,
                process
                    .waiting_on
                    .map_or_else(|| "none".to_string(), |s| s.to_string()),
                process.items_processed,
                process.total_wait_time,
            );
        }
        for slot in step.buffer.slots() {
            match &slot.item {
                Some(item) => {
                    let _ = writeln!(
                        out,
                        "  slot {}: {} (by {})",
                        slot.id, item.id, item.produced_by
                    );
                }
                None => {
                    let _ = writeln!(out, "  slot {}: free", slot.id);
                }
            }
        }
        let _ = writeln!(
            out,
            "  stats: produced={} consumed={} utilization={:.1}% avg_wait={:.1}",
            step.statistics.items_produced,
            step.statistics.items_consumed,
            step.statistics.buffer_utilization,
            step.statistics.average_wait_time,
        );
    }
    out
}

/// Derived timestamp of one step, Unix milliseconds.
fn step_timestamp_ms(start_time_ms: u64, step_number: u64, speed: f64) -> i64 {
    start_time_ms as i64 + (step_number as f64 * 1000.0 / speed) as i64
}

/// Format Unix milliseconds as RFC 3339, falling back to a raw
/// millisecond count if the value is outside the representable range.
fn rfc3339(unix_ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(unix_ms) * 1_000_000)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
        .unwrap_or_else(|| format!("{}ms", unix_ms))
}
