//! Step Throughput Benchmark
//!
//! Measures the cost of one forward micro-step including the deep
//! snapshot append, at the largest supported configuration.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use semsim_engine::domain::{Command, ManualClock, Simulation, SimulationConfig};

fn largest_config() -> SimulationConfig {
    SimulationConfig {
        buffer_size: 10,
        producer_count: 5,
        consumer_count: 5,
        animation_speed: 1.0,
    }
}

fn bench_step_forward(c: &mut Criterion) {
    c.bench_function("step_forward_100_steps_max_config", |b| {
        b.iter_batched(
            || Simulation::new(largest_config(), ManualClock::new()),
            |mut sim| {
                for _ in 0..100 {
                    sim.apply(Command::StepForward);
                }
                sim
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_scrub(c: &mut Criterion) {
    c.bench_function("jump_across_100_recorded_steps", |b| {
        b.iter_batched(
            || {
                let mut sim = Simulation::new(largest_config(), ManualClock::new());
                for _ in 0..100 {
                    sim.apply(Command::StepForward);
                }
                sim
            },
            |mut sim| {
                sim.apply(Command::JumpToStep(10));
                for _ in 0..90 {
                    sim.apply(Command::StepForward);
                }
                sim
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_step_forward, bench_scrub);
criterion_main!(benches);
