//! CPU and I/O resource units and the sets that own them.
//!
//! A [`Resource`] holds at most one process at a time; assignment and
//! eviction notify the process so its state machine stays in lock-step with
//! the slot. [`CpuPool`] is a fixed, ordered pool of CPU units; `find_free`
//! returns the lowest free index, which is the deterministic tie-break for
//! multi-CPU runs.

use crate::clock::Tick;
use crate::error::SimError;
use crate::proc::{ProcId, ProcTable, ResourceKind};

/// A single CPU or I/O unit.
#[derive(Clone, Debug)]
pub struct Resource {
    name: String,
    kind: ResourceKind,
    current: Option<ProcId>,
    proc_running_time: u64,
}

impl Resource {
    pub fn new(name: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            current: None,
            proc_running_time: 0,
        }
    }

    #[inline(always)]
    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    /// The process occupying this unit, if any.
    #[inline(always)]
    pub fn current(&self) -> Option<ProcId> {
        self.current
    }

    /// Ticks the current occupant has held this unit.
    #[inline(always)]
    pub fn proc_running_time(&self) -> u64 {
        self.proc_running_time
    }

    fn assign(&mut self, pid: ProcId, table: &mut ProcTable) -> Result<(), SimError> {
        if self.is_busy() {
            return Err(SimError::ResourceBusy {
                resource: self.name.clone(),
            });
        }
        self.current = Some(pid);
        self.proc_running_time = 0;
        table.get_mut(pid).assign(self.kind);
        Ok(())
    }

    fn must_evict(&mut self, pid: ProcId, now: Tick, table: &mut ProcTable) -> Result<(), SimError> {
        match self.current {
            None => Err(SimError::invariant(
                now,
                format!("eviction targeted free resource {}", self.name),
            )),
            Some(cur) if cur != pid => Err(SimError::invariant(
                now,
                format!("process {pid} is not running on {}", self.name),
            )),
            Some(_) => {
                self.current = None;
                self.proc_running_time = 0;
                table.get_mut(pid).on_evict(now)
            }
        }
    }

    fn tick(&mut self) {
        if self.is_busy() {
            self.proc_running_time += 1;
        }
    }
}

/// A set of identical resource units driven by one scheduler.
///
/// Slots are addressed by index so a caller can look up a free slot and
/// assign to it without holding a borrow across the selection call.
pub trait ResourceSet {
    /// Lowest-indexed free slot, if any.
    fn find_free(&self) -> Option<usize>;

    /// Put `pid` on `slot` and flip its state to running/reading.
    fn assign(&mut self, slot: usize, pid: ProcId, table: &mut ProcTable) -> Result<(), SimError>;

    /// Remove `pid` from whichever slot holds it and run its evict handler.
    fn must_evict(&mut self, pid: ProcId, now: Tick, table: &mut ProcTable)
        -> Result<(), SimError>;

    /// Occupant of every slot, in index order.
    fn occupants(&self) -> Vec<Option<ProcId>>;

    /// Processes currently held, in slot index order.
    fn running(&self) -> Vec<ProcId>;

    /// Advance per-slot occupancy counters by one tick.
    fn tick(&mut self);
}

impl ResourceSet for Resource {
    fn find_free(&self) -> Option<usize> {
        (!self.is_busy()).then_some(0)
    }

    fn assign(&mut self, slot: usize, pid: ProcId, table: &mut ProcTable) -> Result<(), SimError> {
        debug_assert_eq!(slot, 0);
        Resource::assign(self, pid, table)
    }

    fn must_evict(
        &mut self,
        pid: ProcId,
        now: Tick,
        table: &mut ProcTable,
    ) -> Result<(), SimError> {
        Resource::must_evict(self, pid, now, table)
    }

    fn occupants(&self) -> Vec<Option<ProcId>> {
        vec![self.current]
    }

    fn running(&self) -> Vec<ProcId> {
        self.current.into_iter().collect()
    }

    fn tick(&mut self) {
        Resource::tick(self)
    }
}

/// Fixed, ordered pool of CPU units.
#[derive(Clone, Debug)]
pub struct CpuPool {
    cpus: Vec<Resource>,
}

impl CpuPool {
    /// Pool of `n` CPUs named `CPU1..CPUn`. `n` must be positive.
    pub fn new(n: usize) -> Self {
        debug_assert!(n > 0);
        let cpus = (1..=n)
            .map(|i| Resource::new(format!("CPU{i}"), ResourceKind::Cpu))
            .collect();
        Self { cpus }
    }

    pub fn len(&self) -> usize {
        self.cpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cpus.is_empty()
    }
}

impl ResourceSet for CpuPool {
    fn find_free(&self) -> Option<usize> {
        self.cpus.iter().position(|r| !r.is_busy())
    }

    fn assign(&mut self, slot: usize, pid: ProcId, table: &mut ProcTable) -> Result<(), SimError> {
        self.cpus[slot].assign(pid, table)
    }

    fn must_evict(
        &mut self,
        pid: ProcId,
        now: Tick,
        table: &mut ProcTable,
    ) -> Result<(), SimError> {
        match self.cpus.iter_mut().find(|r| r.current() == Some(pid)) {
            Some(cpu) => cpu.must_evict(pid, now, table),
            None => Err(SimError::invariant(
                now,
                format!("process {pid} is not running on any cpu"),
            )),
        }
    }

    fn occupants(&self) -> Vec<Option<ProcId>> {
        self.cpus.iter().map(Resource::current).collect()
    }

    fn running(&self) -> Vec<ProcId> {
        self.cpus.iter().filter_map(Resource::current).collect()
    }

    fn tick(&mut self) {
        for cpu in &mut self.cpus {
            cpu.tick();
        }
    }
}
