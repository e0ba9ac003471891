//! Scheduler
//!
//! Process selection is deliberately simple: processes are examined in
//! declaration order (producers `P1..Pn`, then consumers `C1..Cm`) and
//! the first one whose state is `Ready` or `Running` is chosen. The
//! chosen process keeps the turn even if its micro-step blocks; the
//! engine never falls through to the next candidate within one step.
//! Given the same configuration and command sequence this yields the
//! same trace on every run.
//!
//! When nobody is eligible the world is quiescent. That is only
//! reachable under external interference, because `signal` hands permits
//! directly to queue heads; a blocked process next to a positive
//! semaphore therefore indicates corrupted state and is reported.

use tracing::warn;

use super::process::{Process, ProcessId};
use super::semaphore::SemaphoreSet;

/// Index of the first eligible process in declaration order.
pub(crate) fn select_next(processes: &[Process]) -> Option<usize> {
    processes.iter().position(|p| p.state.is_eligible())
}

/// Look for a blocked process whose semaphore still has permits.
///
/// Hand-off makes this configuration unreachable from valid states, so a
/// hit means the state was tampered with from outside.
pub(crate) fn find_integrity_violation(
    processes: &[Process],
    semaphores: &SemaphoreSet,
) -> Option<ProcessId> {
    processes.iter().find_map(|p| {
        let blocked_on = p.waiting_on.filter(|_| p.state.is_blocked())?;
        (semaphores.get(blocked_on).value() > 0).then_some(p.id)
    })
}

/// Report quiescence, flagging integrity violations at `warn`.
pub(crate) fn report_quiescence(processes: &[Process], semaphores: &SemaphoreSet) {
    if let Some(id) = find_integrity_violation(processes, semaphores) {
        warn!(process = %id, "blocked process next to a positive semaphore; state integrity violated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::process::{ProcessKind, ProcessState};
    use crate::domain::semaphore::SemaphoreId;

    fn world() -> Vec<Process> {
        vec![
            Process::new(ProcessKind::Producer, 1),
            Process::new(ProcessKind::Producer, 2),
            Process::new(ProcessKind::Consumer, 1),
        ]
    }

    #[test]
    fn declaration_order_prefers_the_first_producer() {
        let processes = world();
        assert_eq!(select_next(&processes), Some(0));
    }

    #[test]
    fn blocked_processes_are_skipped() {
        let mut processes = world();
        processes[0].state = ProcessState::Blocked;
        processes[1].state = ProcessState::Blocked;
        assert_eq!(select_next(&processes), Some(2));
    }

    #[test]
    fn all_blocked_means_no_selection() {
        let mut processes = world();
        for p in &mut processes {
            p.state = ProcessState::Blocked;
        }
        assert_eq!(select_next(&processes), None);
    }

    #[test]
    fn integrity_probe_flags_blocked_process_with_permits_available() {
        let mut processes = world();
        let mut semaphores = SemaphoreSet::for_capacity(2);

        processes[0].state = ProcessState::Blocked;
        processes[0].waiting_on = Some(SemaphoreId::Empty);
        // empty.value is 2 here, which hand-off can never produce.
        assert_eq!(
            find_integrity_violation(&processes, &semaphores),
            Some(processes[0].id)
        );

        semaphores.empty.value = 0;
        assert_eq!(find_integrity_violation(&processes, &semaphores), None);
    }
}
