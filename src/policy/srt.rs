//! Shortest Remaining Time: coupled selection and preemption.
//!
//! Both halves compare the same metric, the remaining ticks of the current
//! task. Selection takes the queued process with the smallest remaining time
//! (ties: lowest id, then earliest enter tick). Eviction always releases
//! finished tasks, then preempts a runner whenever a queued process has
//! strictly less remaining time, evicting the largest-remaining runner first
//! (ties: highest id). The freed slot is filled in the same tick's
//! assignment phase.

use std::cmp::Reverse;

use crate::clock::Tick;
use crate::error::SimError;
use crate::policy::{EvictionPolicy, SelectionPolicy};
use crate::proc::{ProcId, ProcTable};
use crate::queue::ProcQueue;

pub struct Srt;

fn remaining(table: &ProcTable, pid: ProcId) -> u64 {
    table.get(pid).current_task().remaining()
}

impl SelectionPolicy for Srt {
    fn select(&self, queue: &ProcQueue, table: &ProcTable, _now: Tick) -> Option<ProcId> {
        queue
            .entries()
            .min_by_key(|e| (remaining(table, e.pid), e.pid, e.entered_at))
            .map(|e| e.pid)
    }
}

impl EvictionPolicy for Srt {
    fn select_evictees(
        &self,
        running: &[ProcId],
        queue: &ProcQueue,
        table: &ProcTable,
        _now: Tick,
    ) -> Result<Vec<ProcId>, SimError> {
        let mut evictees: Vec<ProcId> = running
            .iter()
            .copied()
            .filter(|&pid| table.get(pid).current_task().is_finished())
            .collect();

        // Runners still holding a CPU, largest remaining first.
        let mut runners: Vec<ProcId> = running
            .iter()
            .copied()
            .filter(|pid| !evictees.contains(pid))
            .collect();
        runners.sort_by_key(|&pid| (Reverse(remaining(table, pid)), Reverse(pid)));

        // Queued challengers, smallest remaining first.
        let mut challengers: Vec<(u64, ProcId, Tick)> = queue
            .entries()
            .map(|e| (remaining(table, e.pid), e.pid, e.entered_at))
            .collect();
        challengers.sort();

        // Greedy pairing: once the best challenger cannot beat the
        // largest-remaining runner, no pair can.
        let mut next = 0;
        for &runner in &runners {
            match challengers.get(next) {
                Some(&(rem, _, _)) if rem < remaining(table, runner) => {
                    evictees.push(runner);
                    next += 1;
                }
                _ => break,
            }
        }
        Ok(evictees)
    }
}
