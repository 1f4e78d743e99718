//! Eviction policies: non-preemptive completion and round-robin quanta.

use crate::clock::Tick;
use crate::error::SimError;
use crate::policy::EvictionPolicy;
use crate::proc::{ProcId, ProcTable};
use crate::queue::ProcQueue;

/// Evict exactly the processes whose current task finished.
pub struct NonPreemptive;

impl EvictionPolicy for NonPreemptive {
    fn select_evictees(
        &self,
        running: &[ProcId],
        _queue: &ProcQueue,
        table: &ProcTable,
        _now: Tick,
    ) -> Result<Vec<ProcId>, SimError> {
        Ok(running
            .iter()
            .copied()
            .filter(|&pid| table.get(pid).current_task().is_finished())
            .collect())
    }
}

/// Round-robin with a global quantum boundary.
///
/// A process is evicted when its task finished or when `clock % quantum == 0`;
/// the boundary is shared by all CPUs, not tracked per process. Between
/// evictions no process may accumulate more than `quantum` running ticks.
pub struct RoundRobin {
    quantum: u64,
}

impl RoundRobin {
    /// `quantum` must be positive.
    pub fn new(quantum: u64) -> Self {
        debug_assert!(quantum > 0);
        Self { quantum }
    }

    pub fn quantum(&self) -> u64 {
        self.quantum
    }
}

impl EvictionPolicy for RoundRobin {
    fn select_evictees(
        &self,
        running: &[ProcId],
        _queue: &ProcQueue,
        table: &ProcTable,
        now: Tick,
    ) -> Result<Vec<ProcId>, SimError> {
        let mut evictees = Vec::new();
        for &pid in running {
            let proc = table.get(pid);
            if proc.running_time() > self.quantum {
                return Err(SimError::invariant(
                    now,
                    format!(
                        "process {pid} ran {} ticks but the quantum is {}",
                        proc.running_time(),
                        self.quantum
                    ),
                ));
            }
            if now % self.quantum == 0 || proc.current_task().is_finished() {
                evictees.push(pid);
            }
        }
        Ok(evictees)
    }
}
