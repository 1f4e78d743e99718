//! Named FIFO of processes waiting for one resource class.
//!
//! Entries carry the tick at which the process entered the queue; HRRN uses
//! it as the waiting time, FIFO ignores it. Selection policies observe the
//! full queue without mutating it; the scheduler wrapper removes the chosen
//! entry.

use std::collections::VecDeque;

use crate::clock::Tick;
use crate::proc::ProcId;

/// A queued process and the tick it entered the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueEntry {
    pub pid: ProcId,
    pub entered_at: Tick,
}

/// FIFO queue ordered by push order.
#[derive(Clone, Debug)]
pub struct ProcQueue {
    name: &'static str,
    entries: VecDeque<QueueEntry>,
}

impl ProcQueue {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: VecDeque::new(),
        }
    }

    /// Queue name, used in diagnostics only.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Append a process, stamping it with the current tick.
    pub fn push(&mut self, pid: ProcId, now: Tick) {
        self.entries.push_back(QueueEntry {
            pid,
            entered_at: now,
        });
    }

    /// Pop the head of the queue.
    pub fn pop(&mut self) -> Option<QueueEntry> {
        self.entries.pop_front()
    }

    /// Remove a process by id, preserving the order of the rest.
    ///
    /// Returns `false` if the process was not queued.
    pub fn remove(&mut self, pid: ProcId) -> bool {
        match self.entries.iter().position(|e| e.pid == pid) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Entries in queue order, for selection policies.
    pub fn entries(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
