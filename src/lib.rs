//! Tick-driven simulator of a short-term OS scheduler.
//!
//! Models a pool of identical CPUs and two I/O devices (IO1, IO2) driven by
//! pluggable scheduling policies (FCFS, SPN, HRRN, SRT, round-robin). Each
//! process is a predetermined list of CPU and I/O bursts; the machine
//! advances a global integer clock one tick at a time, records which process
//! holds each resource, and reports per-process timing statistics at the end
//! of the run.
//!
//! Tick phases (the ordering is a contract):
//! 1) admit arrivals, 2) evict finished or preempted processes, 3) route
//! evicted processes to their next queue, 4) assign queued processes to free
//! resources, 5) snapshot occupancy, 6) account and advance the clock.
//!
//! Module map:
//! - `clock`: the global tick counter.
//! - `proc`: process/task state machine and accounting.
//! - `queue`: arrival-stamped FIFO per resource class.
//! - `resource`: CPU pool and I/O devices.
//! - `policy`: selection and eviction strategies.
//! - `sched`: the per-class scheduler wrapper.
//! - `machine`: the tick loop.
//! - `snapshot`, `stats`: per-tick rows and end-of-run reports.
//! - `workload`, `config`, `cli`: outer surfaces of the binary.

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod machine;
pub mod policy;
pub mod proc;
pub mod queue;
pub mod resource;
pub mod sched;
pub mod snapshot;
pub mod stats;
pub mod workload;


pub use clock::{Clock, Tick};
pub use config::{Algo, LogLevel, SimConfig};
pub use error::SimError;
pub use machine::Machine;
pub use proc::{ProcId, ProcState, ProcTable, Process, ResourceKind, Task};
pub use queue::{ProcQueue, QueueEntry};
pub use sched::SchedulerWrapper;
pub use snapshot::{SnapshotRow, SnapshotSink, VecSink, WriterSink};
pub use stats::{ProcStats, RunArtifact};
pub use workload::parse_workload;
