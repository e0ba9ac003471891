//! Property Tests
//!
//! Sweeps arbitrary configurations and command sequences through the
//! engine and checks the structural invariants of the algorithm after
//! every single command. The invariants here are the load-bearing ones:
//! semaphore accounting, queue coherence, and the step-count/history
//! correspondence.

use proptest::prelude::*;

use semsim_engine::domain::{
    Command, ManualClock, ProcessState, Simulation, SimulationConfig, SimulationState,
};

/// The permit-accounting identity of the bounded buffer.
///
/// Free permits, occupied permits, and permits held by in-flight
/// processes always add up to the capacity. A process in `Producing` or
/// `Consuming` holds exactly one permit of the respective counting
/// semaphore.
fn assert_accounting(state: &SimulationState) {
    let in_flight = state
        .processes()
        .iter()
        .filter(|p| p.current_operation.holds_permit())
        .count() as u32;
    let empty = state.semaphores().empty().value();
    let full = state.semaphores().full().value();
    assert_eq!(
        empty + full + in_flight,
        state.config().buffer_size as u32,
        "permit accounting broke: empty={} full={} in_flight={}",
        empty,
        full,
        in_flight
    );
}

fn assert_invariants(sim: &Simulation<ManualClock>) {
    let state = sim.state();

    // Binary semaphore stays binary.
    assert!(state.semaphores().mutex().value() <= 1);

    assert_accounting(state);

    // Occupied slots match the full count plus in-flight consumers.
    let consuming = state
        .processes()
        .iter()
        .filter(|p| p.current_operation == semsim_engine::domain::ProcessOperation::Consuming)
        .count();
    assert_eq!(
        state.buffer().occupied_count(),
        state.semaphores().full().value() as usize + consuming
    );

    // Every queued id names a blocked process waiting on that semaphore.
    for sem in [
        state.semaphores().empty(),
        state.semaphores().full(),
        state.semaphores().mutex(),
    ] {
        for id in sem.wait_queue() {
            let process = state.process(*id).expect("queued id resolves");
            assert_eq!(process.state, ProcessState::Blocked);
            assert_eq!(process.waiting_on, Some(sem.id()));
        }
    }

    // The step counter and the history never drift apart.
    assert_eq!(state.current_step(), sim.history().len() as u64);

    // Snapshot numbering is dense and 1-based.
    for (i, snapshot) in sim.history().iter().enumerate() {
        assert_eq!(snapshot.step_number, i as u64 + 1);
    }
}

fn config_strategy() -> impl Strategy<Value = SimulationConfig> {
    (1usize..=10, 1usize..=5, 1usize..=5, 0.5f64..=3.0).prop_map(
        |(buffer_size, producer_count, consumer_count, animation_speed)| SimulationConfig {
            buffer_size,
            producer_count,
            consumer_count,
            animation_speed,
        },
    )
}

fn command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        8 => Just(Command::StepForward),
        2 => Just(Command::StepBackward),
        1 => (-2i64..15).prop_map(Command::JumpToStep),
        1 => (0.0f64..4.0).prop_map(Command::SetSpeed),
        1 => Just(Command::Start),
        1 => Just(Command::Pause),
        1 => Just(Command::Reset),
        1 => config_strategy().prop_map(Command::SetConfig),
    ]
}

proptest! {
    #[test]
    fn invariants_hold_under_arbitrary_commands(
        config in config_strategy(),
        commands in prop::collection::vec(command_strategy(), 0..80),
    ) {
        let mut sim = Simulation::new(config, ManualClock::new());
        assert_invariants(&sim);

        for command in commands {
            let before_state = sim.state().clone();
            let before_history = sim.history().to_vec();

            let outcome = sim.apply(command);

            // Rejection and quiescence are state non-changes.
            if !outcome.is_applied() {
                prop_assert_eq!(sim.state(), &before_state);
                prop_assert_eq!(sim.history(), before_history.as_slice());
            }
            assert_invariants(&sim);
        }
    }

    #[test]
    fn forward_then_full_rewind_restores_the_initial_state(
        config in config_strategy(),
        steps in 0usize..30,
    ) {
        let mut sim = Simulation::new(config, ManualClock::new());
        let initial = sim.state().clone();

        for _ in 0..steps {
            sim.apply(Command::StepForward);
        }
        for _ in 0..steps {
            sim.apply(Command::StepBackward);
        }
        // Blocked attempts record nothing, so the rewind may bottom out
        // early; either way step zero is the initial world.
        prop_assert_eq!(sim.state(), &initial);
        prop_assert!(sim.history().is_empty());
    }

    #[test]
    fn replay_from_any_recorded_step_is_exact(
        config in config_strategy(),
        steps in 1usize..25,
        jump_fraction in 0.0f64..1.0,
    ) {
        let mut sim = Simulation::new(config, ManualClock::new());
        for _ in 0..steps {
            sim.apply(Command::StepForward);
        }
        let original = sim.history().to_vec();
        let recorded = original.len();
        let target = (recorded as f64 * jump_fraction) as i64;

        sim.apply(Command::JumpToStep(target));
        // Blocked attempts record nothing, so the replay may need more
        // calls than snapshots; a deterministic engine converges anyway.
        let mut calls = 0;
        while sim.history().len() < recorded {
            sim.step_forward();
            calls += 1;
            prop_assert!(calls <= 1_000, "replay did not converge");
        }
        prop_assert_eq!(sim.history(), original.as_slice());
    }
}
