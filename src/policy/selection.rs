//! Non-preemptive selection policies: FIFO, SPN, HRRN.

use crate::clock::Tick;
use crate::policy::SelectionPolicy;
use crate::proc::{ProcId, ProcTable};
use crate::queue::ProcQueue;

/// First in, first out: take the queue head.
pub struct Fifo;

impl SelectionPolicy for Fifo {
    fn select(&self, queue: &ProcQueue, _table: &ProcTable, _now: Tick) -> Option<ProcId> {
        queue.entries().next().map(|e| e.pid)
    }
}

/// Shortest Process Next: minimum total time of the current task.
pub struct Spn;

impl SelectionPolicy for Spn {
    fn select(&self, queue: &ProcQueue, table: &ProcTable, _now: Tick) -> Option<ProcId> {
        queue
            .entries()
            .min_by_key(|e| (table.get(e.pid).current_task().total(), e.pid, e.entered_at))
            .map(|e| e.pid)
    }
}

/// Highest Response Ratio Next.
///
/// The ratio is `(wait + estimate) / estimate` with `wait = now - enter_tick`
/// and `estimate = current_task.total`. Compared by cross-multiplication so
/// no floats enter the decision.
pub struct Hrrn;

impl SelectionPolicy for Hrrn {
    fn select(&self, queue: &ProcQueue, table: &ProcTable, now: Tick) -> Option<ProcId> {
        queue
            .entries()
            .min_by(|a, b| {
                let (wait_a, est_a) = (now - a.entered_at, table.get(a.pid).current_task().total());
                let (wait_b, est_b) = (now - b.entered_at, table.get(b.pid).current_task().total());
                // (wait_a + est_a) / est_a >= (wait_b + est_b) / est_b
                //   <=>  wait_a * est_b >= wait_b * est_a
                (wait_b * est_a)
                    .cmp(&(wait_a * est_b))
                    .then(a.pid.cmp(&b.pid))
                    .then(a.entered_at.cmp(&b.entered_at))
            })
            .map(|e| e.pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proc::{Process, ResourceKind, Task};

    fn table_with_bursts(bursts: &[u64]) -> ProcTable {
        let procs = bursts
            .iter()
            .enumerate()
            .map(|(i, &t)| {
                Process::new(
                    ProcId::from_u32(i as u32),
                    0,
                    vec![Task::new(ResourceKind::Cpu, t)],
                )
            })
            .collect();
        ProcTable::new(procs)
    }

    fn pid(id: u32) -> ProcId {
        ProcId::from_u32(id)
    }

    #[test]
    fn fifo_takes_the_head() {
        let table = table_with_bursts(&[5, 1]);
        let mut q = ProcQueue::new("CPUs");
        q.push(pid(1), 0);
        q.push(pid(0), 0);
        assert_eq!(Fifo.select(&q, &table, 0), Some(pid(1)));
    }

    #[test]
    fn fifo_on_empty_queue_is_none() {
        let table = table_with_bursts(&[]);
        let q = ProcQueue::new("CPUs");
        assert_eq!(Fifo.select(&q, &table, 0), None);
    }

    #[test]
    fn spn_picks_shortest_current_task() {
        let table = table_with_bursts(&[5, 1, 3]);
        let mut q = ProcQueue::new("CPUs");
        for id in 0..3 {
            q.push(pid(id), 0);
        }
        assert_eq!(Spn.select(&q, &table, 0), Some(pid(1)));
    }

    #[test]
    fn spn_breaks_ties_by_lower_id() {
        let table = table_with_bursts(&[2, 2]);
        let mut q = ProcQueue::new("CPUs");
        q.push(pid(1), 0);
        q.push(pid(0), 1);
        assert_eq!(Spn.select(&q, &table, 1), Some(pid(0)));
    }

    #[test]
    fn hrrn_prefers_highest_response_ratio() {
        // At tick 10: p0 ratio (10+10)/10 = 2.0, p1 ratio (5+2)/2 = 3.5.
        let table = table_with_bursts(&[10, 2]);
        let mut q = ProcQueue::new("CPUs");
        q.push(pid(0), 0);
        q.push(pid(1), 5);
        assert_eq!(Hrrn.select(&q, &table, 10), Some(pid(1)));
    }

    #[test]
    fn hrrn_ties_go_to_lower_id() {
        // Same estimate, same wait -> same ratio.
        let table = table_with_bursts(&[4, 4]);
        let mut q = ProcQueue::new("CPUs");
        q.push(pid(1), 2);
        q.push(pid(0), 2);
        assert_eq!(Hrrn.select(&q, &table, 6), Some(pid(0)));
    }
}
