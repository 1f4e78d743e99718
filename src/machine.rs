//! The machine: a phase-ordered tick loop over three schedulers.
//!
//! Each tick runs admit -> evict -> route -> assign -> snapshot -> advance.
//! The ordering is a contract, not an implementation detail: every decision
//! during tick `t` observes `clock == t`, the snapshot row for `t` reflects
//! post-assignment occupancy, and the clock moves only after all accounting
//! for `t` has been applied. Reordering phases changes observable output.
//!
//! Determinism: queues iterate in push order, pools in slot order, and the
//! unscheduled set in id order, so two runs with the same workload and
//! options produce byte-identical snapshot streams.

use std::rc::Rc;

use crate::clock::{Clock, Tick};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::policy::{self, Fifo, NonPreemptive};
use crate::proc::{ProcId, ProcState, ProcTable, ResourceKind};
use crate::queue::ProcQueue;
use crate::resource::{CpuPool, Resource};
use crate::sched::SchedulerWrapper;
use crate::snapshot::{SnapshotRow, SnapshotSink};

pub struct Machine<'a> {
    clock: Clock,
    table: ProcTable,
    cpu: SchedulerWrapper,
    io1: SchedulerWrapper,
    io2: SchedulerWrapper,
    /// Not yet arrived, ascending id (= admission order).
    unscheduled: Vec<ProcId>,
    /// Arrived and not terminated. An index over the table, not an owner.
    running: Vec<ProcId>,
    sink: &'a mut dyn SnapshotSink,
}

impl<'a> Machine<'a> {
    pub fn new(
        table: ProcTable,
        cpu: SchedulerWrapper,
        io1: SchedulerWrapper,
        io2: SchedulerWrapper,
        sink: &'a mut dyn SnapshotSink,
    ) -> Self {
        let unscheduled: Vec<ProcId> = table.ids().collect();
        Self {
            clock: Clock::new(),
            table,
            cpu,
            io1,
            io2,
            unscheduled,
            running: Vec::new(),
            sink,
        }
    }

    /// Assemble the standard machine: a CPU pool driven by the configured
    /// policy and two FCFS non-preemptive I/O devices.
    pub fn with_config(cfg: &SimConfig, table: ProcTable, sink: &'a mut dyn SnapshotSink) -> Self {
        let (selection, evictor) = policy::cpu_policies(cfg.algo, cfg.effective_quantum());
        let cpu = SchedulerWrapper::new(
            "CPUs",
            ProcQueue::new("CPUs"),
            selection,
            evictor,
            Box::new(CpuPool::new(cfg.cpus)),
        );
        let io1 = SchedulerWrapper::new(
            "IO1",
            ProcQueue::new("IO1"),
            Rc::new(Fifo),
            Rc::new(NonPreemptive),
            Box::new(Resource::new("IO1", ResourceKind::Io1)),
        );
        let io2 = SchedulerWrapper::new(
            "IO2",
            ProcQueue::new("IO2"),
            Rc::new(Fifo),
            Rc::new(NonPreemptive),
            Box::new(Resource::new("IO2", ResourceKind::Io2)),
        );
        Self::new(table, cpu, io1, io2, sink)
    }

    /// Current clock value; after [`run`](Self::run) this is one past the
    /// tick on which the last process terminated.
    pub fn clock(&self) -> Tick {
        self.clock.now()
    }

    pub fn table(&self) -> &ProcTable {
        &self.table
    }

    /// Whether every process has arrived and terminated.
    pub fn is_done(&self) -> bool {
        self.unscheduled.is_empty() && self.running.is_empty()
    }

    /// Run ticks until every process has terminated.
    pub fn run(&mut self) -> Result<(), SimError> {
        while !self.is_done() {
            self.step()?;
        }
        Ok(())
    }

    /// Consume the machine, releasing the snapshot sink borrow.
    pub fn finish(self) -> (Tick, ProcTable) {
        (self.clock.now(), self.table)
    }

    /// Execute one tick: the six phases, in order.
    pub fn step(&mut self) -> Result<(), SimError> {
        let now = self.clock.now();

        self.admit(now);

        self.cpu.check_running(&mut self.table, now)?;
        self.io1.check_running(&mut self.table, now)?;
        self.io2.check_running(&mut self.table, now)?;

        self.route(now)?;

        self.cpu.process_queue(&mut self.table, now)?;
        self.io1.process_queue(&mut self.table, now)?;
        self.io2.process_queue(&mut self.table, now)?;

        self.snapshot(now);
        self.advance();
        Ok(())
    }

    /// Phase 1: move arrived processes into the CPU queue, in id order.
    fn admit(&mut self, now: Tick) {
        let mut i = 0;
        while i < self.unscheduled.len() {
            let pid = self.unscheduled[i];
            if self.table.get(pid).arrival_time() <= now {
                self.unscheduled.remove(i);
                self.table.get_mut(pid).admit();
                tracing::info!(tick = now, proc = pid.index() as u64, "process arrived");
                self.cpu.push(pid, now);
                self.running.push(pid);
            } else {
                i += 1;
            }
        }
    }

    /// Phase 3: route each evicted process by its post-eviction state.
    fn route(&mut self, now: Tick) -> Result<(), SimError> {
        let mut evicted = self.cpu.collect_evicted();
        evicted.extend(self.io1.collect_evicted());
        evicted.extend(self.io2.collect_evicted());

        for pid in evicted {
            match self.table.get(pid).state() {
                ProcState::Terminated => {
                    tracing::info!(tick = now, proc = pid.index() as u64, "process finished");
                    self.running.retain(|&p| p != pid);
                }
                ProcState::Ready => self.cpu.push(pid, now),
                ProcState::Blocked => match self.table.get(pid).current_task().kind() {
                    ResourceKind::Io1 => {
                        tracing::debug!(tick = now, proc = pid.index() as u64, "blocked on IO1");
                        self.io1.push(pid, now);
                    }
                    ResourceKind::Io2 => {
                        tracing::debug!(tick = now, proc = pid.index() as u64, "blocked on IO2");
                        self.io2.push(pid, now);
                    }
                    ResourceKind::Cpu => {
                        return Err(SimError::invariant(
                            now,
                            format!("process {pid} is blocked but its current task wants the CPU"),
                        ))
                    }
                },
                state => {
                    return Err(SimError::invariant(
                        now,
                        format!("evicted process {pid} left in state {state:?}"),
                    ))
                }
            }
        }
        Ok(())
    }

    /// Phase 5: emit the occupancy row for this tick.
    fn snapshot(&mut self, now: Tick) {
        let row = SnapshotRow {
            tick: now,
            cpus: self.cpu.occupants(),
            io1: self.io1.occupants()[0],
            io2: self.io2.occupants()[0],
        };
        self.sink.record(&row);
    }

    /// Phase 6: account every live process at `clock == t`, then advance.
    fn advance(&mut self) {
        for &pid in &self.running {
            self.table.get_mut(pid).tick();
        }
        self.cpu.tick_resources();
        self.io1.tick_resources();
        self.io2.tick_resources();
        self.clock.advance();
    }
}

#[cfg(test)]
impl Machine<'_> {
    /// Test oracle: between ticks, every arrived, unfinished process sits in
    /// exactly one queue or on exactly one resource; terminated and
    /// unarrived processes sit in none.
    pub(crate) fn assert_conservation(&self) {
        for pid in self.table.ids() {
            let mut places = 0;
            if self.unscheduled.contains(&pid) {
                places += 1;
            }
            for sched in [&self.cpu, &self.io1, &self.io2] {
                places += sched.queue().entries().filter(|e| e.pid == pid).count();
                places += sched
                    .occupants()
                    .into_iter()
                    .flatten()
                    .filter(|&p| p == pid)
                    .count();
            }
            let expected = match self.table.get(pid).state() {
                ProcState::Terminated => 0,
                _ => 1,
            };
            assert_eq!(
                places, expected,
                "process {pid} found in {places} places (state {:?})",
                self.table.get(pid).state()
            );
        }
    }
}
