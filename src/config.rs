//! Run configuration: CPU count, policy choice, quantum, arrival spacing.

use std::str::FromStr;

use crate::error::SimError;

/// CPU scheduling algorithm. I/O devices are always FCFS non-preemptive.
///
/// `Rr1` and `Rr4` are aliases forcing a quantum of 1 and 4; `Rr` uses the
/// configured quantum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algo {
    Fcfs,
    Spn,
    Hrrn,
    Rr,
    Rr1,
    Rr4,
    Srt,
}

impl Algo {
    pub fn as_str(self) -> &'static str {
        match self {
            Algo::Fcfs => "fcfs",
            Algo::Spn => "spn",
            Algo::Hrrn => "hrrn",
            Algo::Rr => "rr",
            Algo::Rr1 => "rr1",
            Algo::Rr4 => "rr4",
            Algo::Srt => "srt",
        }
    }
}

impl FromStr for Algo {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fcfs" => Ok(Algo::Fcfs),
            "spn" => Ok(Algo::Spn),
            "hrrn" => Ok(Algo::Hrrn),
            "rr" => Ok(Algo::Rr),
            "rr1" => Ok(Algo::Rr1),
            "rr4" => Ok(Algo::Rr4),
            "srt" => Ok(Algo::Srt),
            other => Err(SimError::Config(format!(
                "unknown scheduling algorithm `{other}`"
            ))),
        }
    }
}

/// Diagnostics verbosity for the `--log` flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(SimError::Config(format!("unknown log level `{other}`"))),
        }
    }
}

/// Configuration for a single simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimConfig {
    /// Size of the CPU pool.
    pub cpus: usize,
    /// CPU scheduler policy.
    pub algo: Algo,
    /// Round-robin quantum when `algo` is `rr`.
    pub quantum: u64,
    /// Arrival spacing: process `i` arrives at tick `i * interval`.
    /// Zero means all processes arrive together.
    pub interval: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cpus: 4,
            algo: Algo::Fcfs,
            quantum: 4,
            interval: 2,
        }
    }
}

impl SimConfig {
    /// Reject configurations the simulator cannot run.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.cpus == 0 {
            return Err(SimError::Config("cpus must be positive".to_string()));
        }
        if self.quantum == 0 {
            return Err(SimError::Config("quantum must be positive".to_string()));
        }
        Ok(())
    }

    /// The round-robin quantum after resolving the `rr1`/`rr4` aliases.
    pub fn effective_quantum(&self) -> u64 {
        match self.algo {
            Algo::Rr1 => 1,
            Algo::Rr4 => 4,
            _ => self.quantum,
        }
    }
}
