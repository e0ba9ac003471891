//! Command Surface
//!
//! The engine is driven by exactly eight commands carrying plain data.
//! Every command application reports a discriminated outcome so callers
//! can observe rejections and quiescence, but an invalid input is never
//! an error: it collapses to a state non-change.

use std::fmt;

use super::config::SimulationConfig;

/// The eight external commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Install a configuration, rebuilding the whole world.
    SetConfig(SimulationConfig),
    /// Begin playback; records the wall time playback started.
    Start,
    /// Stop playback.
    Pause,
    /// Advance at most one micro-step.
    StepForward,
    /// Return to the previous snapshot, discarding the future.
    StepBackward,
    /// Restore an arbitrary point in `[0, history_len]`.
    JumpToStep(i64),
    /// Change the playback pacing hint.
    SetSpeed(f64),
    /// Rebuild from the current configuration, keeping only the speed.
    Reset,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetConfig(_) => write!(f, "set-config"),
            Command::Start => write!(f, "start"),
            Command::Pause => write!(f, "pause"),
            Command::StepForward => write!(f, "step-forward"),
            Command::StepBackward => write!(f, "step-backward"),
            Command::JumpToStep(target) => write!(f, "jump-to-step({})", target),
            Command::SetSpeed(speed) => write!(f, "set-speed({})", speed),
            Command::Reset => write!(f, "reset"),
        }
    }
}

/// Why a command was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A configuration field fell outside its closed range.
    InvalidConfig,
    /// The speed fell outside `[0.5, 3.0]` or was not finite.
    InvalidSpeed,
    /// The jump target fell outside `[0, history_len]`.
    InvalidJumpTarget,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::InvalidConfig => write!(f, "configuration out of range"),
            RejectReason::InvalidSpeed => write!(f, "speed out of range"),
            RejectReason::InvalidJumpTarget => write!(f, "jump target out of range"),
        }
    }
}

impl std::error::Error for RejectReason {}

/// Outcome of one command application.
///
/// Rejection and quiescence both leave the state untouched; the
/// distinction exists purely for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command took effect (possibly as a documented no-op).
    Applied,
    /// The input was invalid; the state is unchanged.
    Rejected(RejectReason),
    /// A step was requested but no process could advance.
    Quiescent,
}

impl CommandOutcome {
    /// Check for the applied outcome.
    #[inline(always)]
    pub const fn is_applied(self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }

    /// Check for any rejection.
    #[inline(always)]
    pub const fn is_rejected(self) -> bool {
        matches!(self, CommandOutcome::Rejected(_))
    }

    /// Check for the quiescent outcome.
    #[inline(always)]
    pub const fn is_quiescent(self) -> bool {
        matches!(self, CommandOutcome::Quiescent)
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::Applied => write!(f, "applied"),
            CommandOutcome::Rejected(reason) => write!(f, "rejected: {}", reason),
            CommandOutcome::Quiescent => write!(f, "quiescent"),
        }
    }
}
