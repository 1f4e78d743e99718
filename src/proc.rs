//! Process and task model: the per-process state machine and accounting.
//!
//! A process is a predetermined list of CPU and I/O bursts, starting with a
//! CPU burst. Queues and resources refer to processes through stable
//! [`ProcId`] handles; the [`ProcTable`] owned by the machine is the only
//! owner of process state.
//!
//! State machine invariants:
//! - The task cursor advances only at the eviction boundary, never mid-tick.
//! - `Running` implies the current task wants the resource kind the process
//!   is assigned to; `ReadsIo` is the same condition on an I/O device.
//! - A process in `ReadsIo` can only be evicted with its task finished
//!   (I/O is non-preemptive).

use std::fmt;

use crate::clock::Tick;
use crate::error::SimError;

/// Resource classes a task can demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ResourceKind {
    Cpu,
    Io1,
    Io2,
}

impl ResourceKind {
    /// Whether this kind names one of the I/O devices.
    #[inline(always)]
    pub fn is_io(self) -> bool {
        !matches!(self, ResourceKind::Cpu)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Cpu => write!(f, "CPU"),
            ResourceKind::Io1 => write!(f, "IO1"),
            ResourceKind::Io2 => write!(f, "IO2"),
        }
    }
}

/// One burst: a resource kind, a total duration, and elapsed progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Task {
    kind: ResourceKind,
    total: u64,
    elapsed: u64,
}

impl Task {
    /// Create an unstarted task. `total` must be positive.
    pub fn new(kind: ResourceKind, total: u64) -> Self {
        debug_assert!(total > 0);
        Self {
            kind,
            total,
            elapsed: 0,
        }
    }

    #[inline(always)]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    #[inline(always)]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Ticks left until this task finishes.
    #[inline(always)]
    pub fn remaining(&self) -> u64 {
        self.total - self.elapsed
    }

    #[inline(always)]
    pub fn is_finished(&self) -> bool {
        self.elapsed == self.total
    }

    fn advance(&mut self) {
        debug_assert!(!self.is_finished());
        self.elapsed += 1;
    }
}

/// Stable process identifier (input line order, 0-based).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ProcId(u32);

impl ProcId {
    #[inline(always)]
    pub fn from_u32(id: u32) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// 1-based id used in reports.
    #[inline(always)]
    pub fn display(self) -> u32 {
        self.0 + 1
    }
}

impl fmt::Display for ProcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle states.
///
/// `ReadsIo` is the shadow of `Running` on an I/O device; eviction logic
/// needs to distinguish the two because only CPU time can be preempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcState {
    Unscheduled,
    Ready,
    Running,
    Blocked,
    ReadsIo,
    Terminated,
}

/// A simulated process with its task list and accounting counters.
#[derive(Clone, Debug)]
pub struct Process {
    id: ProcId,
    arrival_time: Tick,
    tasks: Vec<Task>,
    task_idx: usize,
    state: ProcState,
    running_time: u64,
    service_time: u64,
    ready_or_blocked_time: u64,
    exit_time: Option<Tick>,
}

impl Process {
    /// Create a process in `Unscheduled` state. `tasks` must be non-empty.
    pub fn new(id: ProcId, arrival_time: Tick, tasks: Vec<Task>) -> Self {
        debug_assert!(!tasks.is_empty());
        Self {
            id,
            arrival_time,
            tasks,
            task_idx: 0,
            state: ProcState::Unscheduled,
            running_time: 0,
            service_time: 0,
            ready_or_blocked_time: 0,
            exit_time: None,
        }
    }

    #[inline(always)]
    pub fn id(&self) -> ProcId {
        self.id
    }

    #[inline(always)]
    pub fn arrival_time(&self) -> Tick {
        self.arrival_time
    }

    #[inline(always)]
    pub fn state(&self) -> ProcState {
        self.state
    }

    /// Ticks spent on a resource since the last assignment.
    #[inline(always)]
    pub fn running_time(&self) -> u64 {
        self.running_time
    }

    /// Total CPU ticks consumed so far.
    #[inline(always)]
    pub fn service_time(&self) -> u64 {
        self.service_time
    }

    /// Ticks spent waiting (ready, blocked, or in an I/O burst) since arrival.
    #[inline(always)]
    pub fn ready_or_blocked_time(&self) -> u64 {
        self.ready_or_blocked_time
    }

    /// Tick at which the process terminated, if it has.
    #[inline(always)]
    pub fn exit_time(&self) -> Option<Tick> {
        self.exit_time
    }

    /// The task at the cursor. After termination this stays on the last task.
    #[inline(always)]
    pub fn current_task(&self) -> &Task {
        &self.tasks[self.task_idx]
    }

    /// Sum of `total` over the CPU tasks; the Service column of the report.
    pub fn total_cpu_time(&self) -> u64 {
        self.tasks
            .iter()
            .filter(|t| t.kind() == ResourceKind::Cpu)
            .map(Task::total)
            .sum()
    }

    /// Admission: the clock reached `arrival_time`.
    pub(crate) fn admit(&mut self) {
        debug_assert_eq!(self.state, ProcState::Unscheduled);
        self.state = ProcState::Ready;
    }

    /// Called by a resource when this process takes one of its slots.
    pub(crate) fn assign(&mut self, kind: ResourceKind) {
        debug_assert_eq!(self.current_task().kind(), kind);
        if kind.is_io() {
            debug_assert_eq!(self.state, ProcState::Blocked);
            self.state = ProcState::ReadsIo;
        } else {
            debug_assert_eq!(self.state, ProcState::Ready);
            self.state = ProcState::Running;
        }
    }

    /// Called by a resource when this process leaves its slot.
    ///
    /// Advances the task cursor when the current task is finished and moves
    /// the process to its next state: `Ready` for a CPU task, `Blocked` for
    /// an I/O task, `Terminated` when no task is left. A preempted CPU task
    /// goes back to `Ready`; preempting an I/O burst is an invariant
    /// violation.
    pub(crate) fn on_evict(&mut self, now: Tick) -> Result<(), SimError> {
        if !matches!(self.state, ProcState::Running | ProcState::ReadsIo) {
            return Err(SimError::invariant(
                now,
                format!("evicting process {} in state {:?}", self.id, self.state),
            ));
        }

        self.running_time = 0;

        if self.current_task().is_finished() {
            if self.task_idx + 1 < self.tasks.len() {
                self.task_idx += 1;
                self.state = if self.current_task().kind().is_io() {
                    ProcState::Blocked
                } else {
                    ProcState::Ready
                };
            } else {
                self.state = ProcState::Terminated;
                self.exit_time = Some(now);
            }
            return Ok(());
        }

        match self.state {
            ProcState::Running => {
                self.state = ProcState::Ready;
                Ok(())
            }
            _ => Err(SimError::invariant(
                now,
                format!("process {} preempted mid I/O burst", self.id),
            )),
        }
    }

    /// Per-tick accounting, applied once per tick after assignments.
    ///
    /// Running ticks count as service; I/O ticks advance the burst but count
    /// as waiting for the report, so `turnaround == service + waiting`.
    pub(crate) fn tick(&mut self) {
        match self.state {
            ProcState::Running => {
                self.tasks[self.task_idx].advance();
                self.running_time += 1;
                self.service_time += 1;
            }
            ProcState::ReadsIo => {
                self.tasks[self.task_idx].advance();
                self.running_time += 1;
                self.ready_or_blocked_time += 1;
            }
            ProcState::Ready | ProcState::Blocked => {
                self.ready_or_blocked_time += 1;
            }
            ProcState::Unscheduled | ProcState::Terminated => {}
        }
    }
}

/// Indirection table mapping [`ProcId`] handles to process state.
///
/// The machine owns the table; queues, resources, and policies hold handles.
#[derive(Clone, Debug, Default)]
pub struct ProcTable {
    procs: Vec<Process>,
}

impl ProcTable {
    /// Build a table from processes ordered by id.
    pub fn new(procs: Vec<Process>) -> Self {
        debug_assert!(procs.iter().enumerate().all(|(i, p)| p.id().index() == i));
        Self { procs }
    }

    #[inline(always)]
    pub fn get(&self, id: ProcId) -> &Process {
        &self.procs[id.index()]
    }

    #[inline(always)]
    pub fn get_mut(&mut self, id: ProcId) -> &mut Process {
        &mut self.procs[id.index()]
    }

    pub fn len(&self) -> usize {
        self.procs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }

    /// All ids in input order.
    pub fn ids(&self) -> impl Iterator<Item = ProcId> + '_ {
        (0..self.procs.len() as u32).map(ProcId::from_u32)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.procs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc_with(tasks: Vec<Task>) -> Process {
        Process::new(ProcId::from_u32(0), 0, tasks)
    }

    #[test]
    fn cpu_burst_lifecycle() {
        let mut p = proc_with(vec![Task::new(ResourceKind::Cpu, 2)]);
        p.admit();
        assert_eq!(p.state(), ProcState::Ready);

        p.assign(ResourceKind::Cpu);
        assert_eq!(p.state(), ProcState::Running);
        p.tick();
        p.tick();
        assert!(p.current_task().is_finished());

        p.on_evict(2).unwrap();
        assert_eq!(p.state(), ProcState::Terminated);
        assert_eq!(p.exit_time(), Some(2));
        assert_eq!(p.service_time(), 2);
        assert_eq!(p.ready_or_blocked_time(), 0);
    }

    #[test]
    fn finished_cpu_task_blocks_on_next_io_task() {
        let mut p = proc_with(vec![
            Task::new(ResourceKind::Cpu, 1),
            Task::new(ResourceKind::Io2, 3),
        ]);
        p.admit();
        p.assign(ResourceKind::Cpu);
        p.tick();
        p.on_evict(1).unwrap();

        assert_eq!(p.state(), ProcState::Blocked);
        assert_eq!(p.current_task().kind(), ResourceKind::Io2);
    }

    #[test]
    fn preempted_cpu_task_returns_to_ready() {
        let mut p = proc_with(vec![Task::new(ResourceKind::Cpu, 5)]);
        p.admit();
        p.assign(ResourceKind::Cpu);
        p.tick();
        assert_eq!(p.running_time(), 1);

        p.on_evict(1).unwrap();
        assert_eq!(p.state(), ProcState::Ready);
        assert_eq!(p.running_time(), 0);
        assert_eq!(p.current_task().remaining(), 4);
    }

    #[test]
    fn io_preemption_is_an_invariant_violation() {
        let mut p = proc_with(vec![
            Task::new(ResourceKind::Cpu, 1),
            Task::new(ResourceKind::Io1, 4),
        ]);
        p.admit();
        p.assign(ResourceKind::Cpu);
        p.tick();
        p.on_evict(1).unwrap();
        p.assign(ResourceKind::Io1);
        p.tick();

        let err = p.on_evict(2).unwrap_err();
        assert!(err.to_string().contains("mid I/O burst"));
    }

    #[test]
    fn io_ticks_count_as_waiting_not_service() {
        let mut p = proc_with(vec![
            Task::new(ResourceKind::Cpu, 1),
            Task::new(ResourceKind::Io1, 2),
        ]);
        p.admit();
        p.assign(ResourceKind::Cpu);
        p.tick();
        p.on_evict(1).unwrap();
        p.assign(ResourceKind::Io1);
        p.tick();
        p.tick();
        p.on_evict(3).unwrap();

        assert_eq!(p.service_time(), 1);
        assert_eq!(p.ready_or_blocked_time(), 2);
        assert_eq!(p.total_cpu_time(), 1);
    }
}
