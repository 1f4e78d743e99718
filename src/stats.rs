//! End-of-run per-process statistics and report writers.

use std::io::{self, Write};

use crate::clock::Tick;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::proc::ProcTable;

/// Timing statistics for one terminated process.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ProcStats {
    /// 1-based process id.
    pub process: u32,
    pub arrival: Tick,
    /// Total CPU ticks demanded (and, once terminated, consumed).
    pub service: u64,
    /// Ticks spent ready, blocked, or in an I/O burst after arrival.
    pub waiting: u64,
    /// Tick at which the process terminated.
    pub finish: Tick,
    /// `finish - arrival`.
    pub turnaround: u64,
    /// `turnaround / service`.
    pub normalized_turnaround: f64,
}

/// Derive per-process statistics, in input order.
///
/// Every process must have terminated; call after the machine's run loop.
pub fn collect(table: &ProcTable) -> Vec<ProcStats> {
    table
        .iter()
        .map(|p| {
            debug_assert!(p.exit_time().is_some());
            let finish = p.exit_time().unwrap_or_default();
            let turnaround = finish - p.arrival_time();
            ProcStats {
                process: p.id().display(),
                arrival: p.arrival_time(),
                service: p.service_time(),
                waiting: p.ready_or_blocked_time(),
                finish,
                turnaround,
                normalized_turnaround: turnaround as f64 / p.service_time() as f64,
            }
        })
        .collect()
}

/// Write the tab-separated report: a header row, then one line per process.
pub fn write_table<W: Write>(mut w: W, stats: &[ProcStats]) -> io::Result<()> {
    writeln!(
        w,
        "Process\tArrival\tService\tWaiting\tFinish time\tTurnaround (Tr)\tTr/Ts"
    )?;
    for s in stats {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{:.6}",
            s.process, s.arrival, s.service, s.waiting, s.finish, s.turnaround,
            s.normalized_turnaround
        )?;
    }
    Ok(())
}

/// Machine-readable run summary, written as JSON next to the text reports.
#[derive(Debug, serde::Serialize)]
pub struct RunArtifact<'a> {
    pub algo: &'a str,
    pub cpus: usize,
    pub quantum: u64,
    pub interval: u64,
    /// One past the tick on which the last process terminated.
    pub total_ticks: Tick,
    pub procs: &'a [ProcStats],
}

impl<'a> RunArtifact<'a> {
    pub fn new(cfg: &SimConfig, total_ticks: Tick, procs: &'a [ProcStats]) -> Self {
        Self {
            algo: cfg.algo.as_str(),
            cpus: cfg.cpus,
            quantum: cfg.effective_quantum(),
            interval: cfg.interval,
            total_ticks,
            procs,
        }
    }
}

/// Serialize the artifact as pretty JSON.
pub fn write_artifact<W: Write>(w: W, artifact: &RunArtifact<'_>) -> Result<(), SimError> {
    serde_json::to_writer_pretty(w, artifact)?;
    Ok(())
}
