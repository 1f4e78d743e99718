//! Per-tick occupancy rows and the sinks they stream into.

use std::io::{self, Write};

use crate::clock::Tick;
use crate::proc::ProcId;

/// Occupancy of every resource after a tick's assignment phase.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SnapshotRow {
    pub tick: Tick,
    pub cpus: Vec<Option<ProcId>>,
    pub io1: Option<ProcId>,
    pub io2: Option<ProcId>,
}

impl SnapshotRow {
    /// Render as a report line: the tick right-justified to width 3, then
    /// one cell per CPU, IO1, IO2. A cell is the 1-based process id, or `-`
    /// when the resource is idle.
    pub fn render(&self) -> String {
        let mut out = format!("{:>3}", self.tick);
        for cell in self.cpus.iter().chain([&self.io1, &self.io2]) {
            out.push(' ');
            match cell {
                Some(pid) => out.push_str(&pid.display().to_string()),
                None => out.push('-'),
            }
        }
        out
    }
}

/// Receives one row per tick, in tick order.
pub trait SnapshotSink {
    fn record(&mut self, row: &SnapshotRow);
}

/// Collects rows in memory; used by tests and artifacts.
#[derive(Clone, Debug, Default)]
pub struct VecSink {
    pub rows: Vec<SnapshotRow>,
}

impl SnapshotSink for VecSink {
    fn record(&mut self, row: &SnapshotRow) {
        self.rows.push(row.clone());
    }
}

/// Streams rendered rows to a writer.
///
/// Write failures are latched rather than raised mid-simulation; callers
/// must check [`finish`](Self::finish) after the run.
pub struct WriterSink<W: Write> {
    out: W,
    err: Option<io::Error>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, err: None }
    }

    /// Flush and surface any write error seen during the run.
    pub fn finish(mut self) -> io::Result<()> {
        match self.err.take() {
            Some(err) => Err(err),
            None => self.out.flush(),
        }
    }
}

impl<W: Write> SnapshotSink for WriterSink<W> {
    fn record(&mut self, row: &SnapshotRow) {
        if self.err.is_none() {
            if let Err(err) = writeln!(self.out, "{}", row.render()) {
                self.err = Some(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: u32) -> ProcId {
        ProcId::from_u32(id)
    }

    #[test]
    fn renders_ids_one_based_and_idle_as_dash() {
        let row = SnapshotRow {
            tick: 7,
            cpus: vec![Some(pid(0)), None],
            io1: None,
            io2: Some(pid(2)),
        };
        assert_eq!(row.render(), "  7 1 - - 3");
    }

    #[test]
    fn tick_field_is_right_justified_to_three() {
        let row = SnapshotRow {
            tick: 123,
            cpus: vec![None],
            io1: None,
            io2: None,
        };
        assert_eq!(row.render(), "123 - - -");
    }

    #[test]
    fn writer_sink_streams_lines() {
        let mut buf = Vec::new();
        {
            let mut sink = WriterSink::new(&mut buf);
            sink.record(&SnapshotRow {
                tick: 0,
                cpus: vec![Some(pid(0))],
                io1: None,
                io2: None,
            });
            sink.finish().unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "  0 1 - -\n");
    }
}
