//! Error types for simulator setup and execution.
//!
//! Workloads and configuration are validated before the tick loop starts, so
//! the steady-state loop has no user-visible error paths: anything it raises
//! is an `Invariant` violation and indicates a scheduler bug, not bad input.

use std::fmt;
use std::io;

use crate::clock::Tick;

/// Errors surfaced by workload parsing, configuration, and the tick loop.
#[derive(Debug)]
pub enum SimError {
    /// Malformed workload text: bad task literal, unknown resource kind, or
    /// a non-positive burst time. Line numbers are 1-based.
    Input { line: usize, message: String },
    /// Rejected configuration: unknown policy or log level, zero cpus or
    /// quantum.
    Config(String),
    /// A scheduling invariant was violated at `tick`. Fail fast.
    Invariant { tick: Tick, message: String },
    /// A resource slot was assigned while busy. Caller bug; never reaches
    /// the user through validated inputs.
    ResourceBusy { resource: String },
    Io(io::Error),
    Json(serde_json::Error),
}

impl SimError {
    pub(crate) fn invariant(tick: Tick, message: impl Into<String>) -> Self {
        Self::Invariant {
            tick,
            message: message.into(),
        }
    }

    pub(crate) fn input(line: usize, message: impl Into<String>) -> Self {
        Self::Input {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input { line, message } => write!(f, "input line {line}: {message}"),
            Self::Config(message) => write!(f, "configuration error: {message}"),
            Self::Invariant { tick, message } => {
                write!(f, "invariant violation at tick {tick}: {message}")
            }
            Self::ResourceBusy { resource } => {
                write!(f, "resource {resource} is busy")
            }
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl std::error::Error for SimError {}

impl From<io::Error> for SimError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = SimError::input(3, "unknown resource kind `IO9`");
        assert_eq!(err.to_string(), "input line 3: unknown resource kind `IO9`");

        let err = SimError::invariant(7, "eviction targeted a free resource");
        assert!(err.to_string().contains("tick 7"));
    }
}
