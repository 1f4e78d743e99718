//! Per-device-class scheduler: a queue, a selection policy, an eviction
//! policy, and the resource set they drive.
//!
//! The machine invokes the four operations in a fixed order each tick:
//! `check_running`, `collect_evicted`, `push` (routing), `process_queue`.
//! After `check_running` only processes the evictor spared still hold
//! resources; after `process_queue` either the queue is empty or every slot
//! is busy.

use std::rc::Rc;

use crate::clock::Tick;
use crate::error::SimError;
use crate::policy::{EvictionPolicy, SelectionPolicy};
use crate::proc::{ProcId, ProcTable};
use crate::queue::ProcQueue;
use crate::resource::ResourceSet;

pub struct SchedulerWrapper {
    name: &'static str,
    queue: ProcQueue,
    selection: Rc<dyn SelectionPolicy>,
    evictor: Rc<dyn EvictionPolicy>,
    resources: Box<dyn ResourceSet>,
    evicted: Vec<ProcId>,
}

impl SchedulerWrapper {
    pub fn new(
        name: &'static str,
        queue: ProcQueue,
        selection: Rc<dyn SelectionPolicy>,
        evictor: Rc<dyn EvictionPolicy>,
        resources: Box<dyn ResourceSet>,
    ) -> Self {
        Self {
            name,
            queue,
            selection,
            evictor,
            resources,
            evicted: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the evictor over the current occupants and release their slots.
    ///
    /// Evicted processes accumulate in an internal buffer until the machine
    /// drains it with [`collect_evicted`](Self::collect_evicted).
    pub fn check_running(&mut self, table: &mut ProcTable, now: Tick) -> Result<(), SimError> {
        let running = self.resources.running();
        let evictees = self
            .evictor
            .select_evictees(&running, &self.queue, table, now)?;
        for pid in evictees {
            self.resources.must_evict(pid, now, table)?;
            tracing::debug!(tick = now, proc = pid.index() as u64, scheduler = self.name, "evicted");
            self.evicted.push(pid);
        }
        Ok(())
    }

    /// Drain the processes evicted this tick, in eviction order.
    pub fn collect_evicted(&mut self) -> Vec<ProcId> {
        std::mem::take(&mut self.evicted)
    }

    /// Enqueue a process waiting for this resource class.
    pub fn push(&mut self, pid: ProcId, now: Tick) {
        self.queue.push(pid, now);
    }

    /// Fill free slots from the queue through the selection policy.
    pub fn process_queue(&mut self, table: &mut ProcTable, now: Tick) -> Result<(), SimError> {
        while let Some(slot) = self.resources.find_free() {
            let Some(pid) = self.selection.select(&self.queue, table, now) else {
                break;
            };
            let removed = self.queue.remove(pid);
            debug_assert!(removed, "selection returned a process not in the queue");
            self.resources.assign(slot, pid, table)?;
            tracing::debug!(tick = now, proc = pid.index() as u64, scheduler = self.name, "assigned");
        }
        Ok(())
    }

    /// Occupant of every slot, in index order (snapshot rows).
    pub fn occupants(&self) -> Vec<Option<ProcId>> {
        self.resources.occupants()
    }

    /// Advance the per-slot occupancy counters.
    pub fn tick_resources(&mut self) {
        self.resources.tick();
    }

    pub(crate) fn queue(&self) -> &ProcQueue {
        &self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Fifo, NonPreemptive};
    use crate::proc::{ProcState, Process, ResourceKind, Task};
    use crate::resource::CpuPool;

    fn pid(id: u32) -> ProcId {
        ProcId::from_u32(id)
    }

    fn cpu_wrapper(cpus: usize) -> SchedulerWrapper {
        SchedulerWrapper::new(
            "CPUs",
            ProcQueue::new("CPUs"),
            Rc::new(Fifo),
            Rc::new(NonPreemptive),
            Box::new(CpuPool::new(cpus)),
        )
    }

    fn ready_table(bursts: &[u64]) -> ProcTable {
        let procs = bursts
            .iter()
            .enumerate()
            .map(|(i, &t)| {
                let mut p = Process::new(
                    ProcId::from_u32(i as u32),
                    0,
                    vec![Task::new(ResourceKind::Cpu, t)],
                );
                p.admit();
                p
            })
            .collect();
        ProcTable::new(procs)
    }

    #[test]
    fn process_queue_fills_all_free_slots_in_order() {
        let mut table = ready_table(&[3, 3, 3]);
        let mut sched = cpu_wrapper(2);
        for id in 0..3 {
            sched.push(pid(id), 0);
        }

        sched.process_queue(&mut table, 0).unwrap();

        assert_eq!(sched.occupants(), vec![Some(pid(0)), Some(pid(1))]);
        assert_eq!(sched.queue().len(), 1);
        assert_eq!(table.get(pid(0)).state(), ProcState::Running);
    }

    #[test]
    fn check_running_buffers_finished_processes() {
        let mut table = ready_table(&[1, 5]);
        let mut sched = cpu_wrapper(2);
        sched.push(pid(0), 0);
        sched.push(pid(1), 0);
        sched.process_queue(&mut table, 0).unwrap();

        table.get_mut(pid(0)).tick();
        table.get_mut(pid(1)).tick();

        sched.check_running(&mut table, 1).unwrap();
        assert_eq!(sched.collect_evicted(), vec![pid(0)]);
        assert!(sched.collect_evicted().is_empty());
        assert_eq!(sched.occupants(), vec![None, Some(pid(1))]);
    }

    #[test]
    fn empty_queue_leaves_slots_free() {
        let mut table = ready_table(&[]);
        let mut sched = cpu_wrapper(2);
        sched.process_queue(&mut table, 0).unwrap();
        assert_eq!(sched.occupants(), vec![None, None]);
    }
}
