//! Command-line driver for the bounded-buffer simulator.
//!
//! A thin consumer of the engine: it builds a configuration from flags,
//! issues step commands, and prints the step log or the exported trace.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use semsim_engine::domain::{
    Command, Simulation, SimulationConfig, StepOutcome, SystemClock, WallClock,
};
use semsim_engine::infrastructure::{export_json, render_text, trace_document};

#[derive(Parser)]
#[command(name = "semsim")]
#[command(about = "Deterministic bounded-buffer semaphore simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SimArgs {
    /// Buffer capacity (1..=10)
    #[arg(long, default_value_t = 5)]
    buffer_size: usize,

    /// Producer count (1..=5)
    #[arg(long, default_value_t = 2)]
    producers: usize,

    /// Consumer count (1..=5)
    #[arg(long, default_value_t = 2)]
    consumers: usize,

    /// Animation speed (0.5..=3.0)
    #[arg(long, default_value_t = 1.0)]
    speed: f64,
}

impl SimArgs {
    fn to_config(&self) -> SimulationConfig {
        SimulationConfig {
            buffer_size: self.buffer_size,
            producer_count: self.producers,
            consumer_count: self.consumers,
            animation_speed: self.speed,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TraceFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Run forward steps and print the step log
    Run {
        #[command(flatten)]
        sim: SimArgs,

        /// Number of forward steps to attempt
        #[arg(long, default_value_t = 20)]
        steps: usize,
    },
    /// Run forward steps and export the trace
    Trace {
        #[command(flatten)]
        sim: SimArgs,

        /// Number of forward steps to attempt
        #[arg(long, default_value_t = 20)]
        steps: usize,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: TraceFormat,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Scrub backward through a run and replay it
    Demo {
        #[command(flatten)]
        sim: SimArgs,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { sim, steps } => run(&sim.to_config(), steps),
        Commands::Trace {
            sim,
            steps,
            format,
            output,
        } => trace(&sim.to_config(), steps, format, output),
        Commands::Demo { sim } => demo(&sim.to_config()),
    }
}

fn drive(sim: &mut Simulation<SystemClock>, steps: usize, print: bool) {
    for _ in 0..steps {
        match sim.step_forward() {
            StepOutcome::Progressed { action, .. } => {
                if print {
                    println!("step {:>3}  {}", sim.state().current_step(), action);
                }
            }
            StepOutcome::Blocked { action, .. } => {
                if print {
                    println!("      -  {}", action);
                }
            }
            StepOutcome::Quiescent => {
                if print {
                    println!("quiescent; no process can advance");
                }
                break;
            }
        }
    }
}

fn run(config: &SimulationConfig, steps: usize) -> Result<()> {
    let mut sim = Simulation::with_system_clock(*config);
    sim.apply(Command::Start);
    drive(&mut sim, steps, true);

    let stats = sim.state().statistics();
    println!();
    println!(
        "recorded {} steps: produced={} consumed={} utilization={:.1}%",
        sim.history().len(),
        stats.items_produced,
        stats.items_consumed,
        stats.buffer_utilization,
    );
    Ok(())
}

fn trace(
    config: &SimulationConfig,
    steps: usize,
    format: TraceFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut sim = Simulation::with_system_clock(*config);
    sim.apply(Command::Start);
    drive(&mut sim, steps, false);

    let document = trace_document(sim.state(), sim.history(), SystemClock::new().now_ms());
    let rendered = match format {
        TraceFormat::Json => export_json(&document).context("serializing trace")?,
        TraceFormat::Text => render_text(&document),
    };

    match output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("writing trace to {}", path.display()))?;
            info!(path = %path.display(), steps = document.metadata.total_steps, "trace written");
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn demo(config: &SimulationConfig) -> Result<()> {
    let mut sim = Simulation::with_system_clock(*config);

    println!("forward:");
    drive(&mut sim, 6, true);
    let recorded = sim.history().to_vec();

    println!();
    println!("backward to step 2:");
    while sim.state().current_step() > 2 {
        sim.apply(Command::StepBackward);
    }
    println!("now at step {}", sim.state().current_step());

    println!();
    println!("replay:");
    while sim.history().len() < recorded.len() {
        drive(&mut sim, 1, true);
    }

    println!();
    println!(
        "replay reproduced the original run exactly: {}",
        sim.history() == recorded.as_slice()
    );
    Ok(())
}
