//! Pluggable selection and eviction policies.
//!
//! Selection picks which queued process takes a freed slot; eviction picks
//! which running processes leave their slots this tick. Policies are pure
//! observers of the queue and process table; the scheduler wrapper performs
//! the actual queue and resource mutations.
//!
//! SRT is the one policy whose eviction depends on the queue contents, so it
//! implements both traits and is installed in both slots.

pub mod eviction;
pub mod selection;
pub mod srt;

pub use eviction::{NonPreemptive, RoundRobin};
pub use selection::{Fifo, Hrrn, Spn};
pub use srt::Srt;

use std::rc::Rc;

use crate::clock::Tick;
use crate::config::Algo;
use crate::error::SimError;
use crate::proc::{ProcId, ProcTable};
use crate::queue::ProcQueue;

/// Chooses which queued process to assign next.
///
/// Implementations must not mutate the queue; removal is the caller's job.
/// Ties break by lower id, then earlier enter tick.
pub trait SelectionPolicy {
    fn select(&self, queue: &ProcQueue, table: &ProcTable, now: Tick) -> Option<ProcId>;
}

/// Chooses which running processes must leave their resources this tick.
pub trait EvictionPolicy {
    fn select_evictees(
        &self,
        running: &[ProcId],
        queue: &ProcQueue,
        table: &ProcTable,
        now: Tick,
    ) -> Result<Vec<ProcId>, SimError>;
}

/// Build the CPU selection/eviction pair for an algorithm choice.
///
/// `quantum` is the effective round-robin quantum (`rr1`/`rr4` already
/// resolved). I/O devices always pair [`Fifo`] with [`NonPreemptive`].
pub fn cpu_policies(
    algo: Algo,
    quantum: u64,
) -> (Rc<dyn SelectionPolicy>, Rc<dyn EvictionPolicy>) {
    match algo {
        Algo::Fcfs => (Rc::new(Fifo), Rc::new(NonPreemptive)),
        Algo::Rr | Algo::Rr1 | Algo::Rr4 => (Rc::new(Fifo), Rc::new(RoundRobin::new(quantum))),
        Algo::Spn => (Rc::new(Spn), Rc::new(NonPreemptive)),
        Algo::Hrrn => (Rc::new(Hrrn), Rc::new(NonPreemptive)),
        Algo::Srt => {
            let srt = Rc::new(Srt);
            (srt.clone(), srt)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srt_is_one_object_in_both_slots() {
        let (selection, evictor) = cpu_policies(Algo::Srt, 4);
        let sel_ptr = Rc::as_ptr(&selection) as *const ();
        let ev_ptr = Rc::as_ptr(&evictor) as *const ();
        assert_eq!(sel_ptr, ev_ptr);
    }
}
