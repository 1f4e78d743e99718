//! Workload parsing: one process per line, `KIND(N)` task literals.
//!
//! Grammar, per line (line index = process id, arrival = id * interval):
//!
//! ```text
//! line    := literal (';' literal)* ';'?
//! literal := ('CPU' | 'IO1' | 'IO2') '(' positive-decimal ')'
//! ```
//!
//! Whitespace around literals is tolerated. Everything else is rejected up
//! front so the tick loop never sees a malformed workload.

use std::io::BufRead;

use crate::error::SimError;
use crate::proc::{ProcId, ProcTable, Process, ResourceKind, Task};

/// Parse a workload into a process table, assigning arrival times at
/// `id * interval`.
pub fn parse_workload<R: BufRead>(input: R, interval: u64) -> Result<ProcTable, SimError> {
    let mut procs = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        let tasks = parse_line(idx + 1, &line)?;
        procs.push(Process::new(
            ProcId::from_u32(idx as u32),
            idx as u64 * interval,
            tasks,
        ));
    }
    Ok(ProcTable::new(procs))
}

fn parse_line(lineno: usize, line: &str) -> Result<Vec<Task>, SimError> {
    let mut literals: Vec<&str> = line.trim().split(';').collect();
    if literals.last().is_some_and(|l| l.trim().is_empty()) {
        literals.pop();
    }
    if literals.is_empty() || literals.iter().all(|l| l.trim().is_empty()) {
        return Err(SimError::input(lineno, "empty task list"));
    }

    let tasks: Vec<Task> = literals
        .into_iter()
        .map(|lit| parse_task(lineno, lit))
        .collect::<Result<_, _>>()?;

    // Admission always enters the CPU queue, so the first burst must be CPU.
    if tasks[0].kind() != ResourceKind::Cpu {
        return Err(SimError::input(
            lineno,
            "process must begin with a CPU burst",
        ));
    }
    Ok(tasks)
}

fn parse_task(lineno: usize, literal: &str) -> Result<Task, SimError> {
    let lit = literal.trim();
    let malformed = || SimError::input(lineno, format!("malformed task literal `{lit}`"));

    let body = lit.strip_suffix(')').ok_or_else(malformed)?;
    let (kind_str, time_str) = body.split_once('(').ok_or_else(malformed)?;

    let kind = match kind_str {
        "CPU" => ResourceKind::Cpu,
        "IO1" => ResourceKind::Io1,
        "IO2" => ResourceKind::Io2,
        other => {
            return Err(SimError::input(
                lineno,
                format!("unknown resource kind `{other}`"),
            ))
        }
    };

    let time: u64 = time_str.parse().map_err(|_| malformed())?;
    if time == 0 {
        return Err(SimError::input(
            lineno,
            format!("task time must be positive in `{lit}`"),
        ));
    }
    Ok(Task::new(kind, time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str, interval: u64) -> Result<ProcTable, SimError> {
        parse_workload(text.as_bytes(), interval)
    }

    #[test]
    fn parses_task_lists_and_arrival_times() {
        let table = parse("CPU(5);IO1(2);CPU(1)\nCPU(4);IO2(10);CPU(2)\n", 2).unwrap();
        assert_eq!(table.len(), 2);

        let p0 = table.get(ProcId::from_u32(0));
        assert_eq!(p0.arrival_time(), 0);
        assert_eq!(p0.current_task().kind(), ResourceKind::Cpu);
        assert_eq!(p0.current_task().total(), 5);
        assert_eq!(p0.total_cpu_time(), 6);

        assert_eq!(table.get(ProcId::from_u32(1)).arrival_time(), 2);
    }

    #[test]
    fn tolerates_trailing_semicolon_and_whitespace() {
        let table = parse("  CPU(3) ; IO2(1) ; CPU(2) ;\n", 0).unwrap();
        assert_eq!(table.get(ProcId::from_u32(0)).total_cpu_time(), 5);
    }

    #[test]
    fn rejects_unknown_resource_kind() {
        let err = parse("CPU(2);IO9(3)\n", 0).unwrap_err();
        assert!(err.to_string().contains("unknown resource kind `IO9`"));
    }

    #[test]
    fn rejects_non_positive_task_time() {
        let err = parse("CPU(0)\n", 0).unwrap_err();
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn rejects_malformed_literals() {
        for bad in ["CPU", "CPU()", "CPU(x)", "CPU 3", "(3)", "CPU(3"] {
            let err = parse(&format!("{bad}\n"), 0).unwrap_err();
            assert!(
                matches!(err, SimError::Input { line: 1, .. }),
                "`{bad}` should be rejected, got {err}"
            );
        }
    }

    #[test]
    fn rejects_empty_line() {
        let err = parse("CPU(1)\n\nCPU(2)\n", 0).unwrap_err();
        assert!(matches!(err, SimError::Input { line: 2, .. }));
    }

    #[test]
    fn rejects_io_first_process() {
        let err = parse("IO1(3);CPU(2)\n", 0).unwrap_err();
        assert!(err.to_string().contains("begin with a CPU burst"));
    }
}
