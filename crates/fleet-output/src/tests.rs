//! Unit tests for fleet-output.

use std::fs;

use fleet_agent::{TaskPhase, Trace};
use fleet_core::{Location, RobotId, SimConfig, TaskId, Tick};
use fleet_sim::{SimBuilder, SimObserver};
use fleet_topology::warehouse_layout;

use crate::{CsvTraceWriter, OutputError, OutputResult, TickRow, TraceOutputObserver, TraceRow, TraceWriter};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn read_lines(path: &std::path::Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_owned)
        .collect()
}

/// Writer that fails every call after the first `ok` trace batches.
struct Flaky {
    ok:       usize,
    batches:  usize,
    finished: usize,
}

impl TraceWriter for Flaky {
    fn write_traces(&mut self, _rows: &[TraceRow]) -> OutputResult<()> {
        self.batches += 1;
        if self.batches > self.ok {
            return Err(OutputError::Io(std::io::Error::other("disk full")));
        }
        Ok(())
    }

    fn write_tick(&mut self, _row: &TickRow) -> OutputResult<()> {
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.finished += 1;
        Ok(())
    }
}

// ── Rows ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod rows {
    use super::*;

    #[test]
    fn task_trace_flattens_all_fields() {
        let trace = Trace::TaskExecution {
            phase:     TaskPhase::End,
            task:      TaskId(12),
            robot:     RobotId(3),
            location:  Location(6),
            timestamp: Tick(9),
        };
        let row = TraceRow::from(&trace);
        assert_eq!(row.kind, "task");
        assert_eq!(row.task, Some(12));
        assert_eq!(row.phase, Some("end"));
        assert_eq!((row.source, row.target), (6, 6));
        assert_eq!(row.timestamp, 9);
    }

    #[test]
    fn null_trace_has_no_task() {
        let trace = Trace::NullAction { robot: RobotId(1), location: Location(4), timestamp: Tick(2) };
        let row = TraceRow::from(&trace);
        assert_eq!(row.kind, "null");
        assert_eq!(row.task, None);
        assert_eq!(row.phase, None);
    }
}

// ── CSV backend ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_backend {
    use super::*;

    #[test]
    fn headers_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = CsvTraceWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(
            read_lines(&dir.path().join("traces.csv")),
            vec!["kind,robot,task,phase,source,target,timestamp"]
        );
        assert_eq!(read_lines(&dir.path().join("ticks.csv")), vec!["tick,traces"]);
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        CsvTraceWriter::new(&nested).unwrap();
        assert!(nested.join("traces.csv").exists());
    }

    #[test]
    fn rows_round_out_empty_optionals() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = CsvTraceWriter::new(dir.path()).unwrap();
        let moved = Trace::Move { robot: RobotId(0), source: Location(1), target: Location(2), timestamp: Tick(1) };
        w.write_traces(&[TraceRow::from(&moved)]).unwrap();
        w.write_tick(&TickRow { tick: 1, traces: 1 }).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();

        let traces = read_lines(&dir.path().join("traces.csv"));
        assert_eq!(traces[1], "move,0,,,1,2,1");
        let ticks = read_lines(&dir.path().join("ticks.csv"));
        assert_eq!(ticks[1], "1,1");
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer {
    use super::*;

    #[test]
    fn serial_run_writes_every_trace() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = SimConfig { iterations: 4, ..SimConfig::default() };
        let mut sim = SimBuilder::new(cfg, warehouse_layout())
            .robots_at(2, Location(1))
            .task(Location(1), Location(2))
            .task(Location(1), Location(6))
            .build()
            .unwrap();

        let mut obs = TraceOutputObserver::new(CsvTraceWriter::new(dir.path()).unwrap());
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none());
        assert_eq!(obs.written(), 8);

        let traces = read_lines(&dir.path().join("traces.csv"));
        assert_eq!(traces.len(), 1 + 8);
        assert_eq!(traces.iter().filter(|l| l.contains(",end,")).count(), 2);

        let ticks = read_lines(&dir.path().join("ticks.csv"));
        assert_eq!(&ticks[1..], &["1,2", "2,2", "3,2", "4,2"]);
    }

    #[test]
    fn first_error_is_kept_and_run_continues() {
        let mut obs = TraceOutputObserver::new(Flaky { ok: 1, batches: 0, finished: 0 });
        let t = Trace::NullAction { robot: RobotId(0), location: Location(1), timestamp: Tick(1) };

        for tick in 1..=3 {
            obs.on_trace(&t);
            obs.on_tick_end(Tick(tick));
        }
        obs.on_sim_end(Tick(3));

        let err = obs.take_error().unwrap();
        assert!(matches!(err, OutputError::Io(_)));
        assert!(obs.take_error().is_none());

        let w = obs.into_writer();
        assert_eq!(w.batches, 3);
        assert_eq!(w.finished, 1);
    }

    #[test]
    fn sim_end_flushes_unticked_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut obs = TraceOutputObserver::new(CsvTraceWriter::new(dir.path()).unwrap());
        let t = Trace::NullAction { robot: RobotId(2), location: Location(5), timestamp: Tick(7) };
        obs.on_trace(&t);
        obs.on_trace(&t);
        obs.on_sim_end(Tick(7));

        assert_eq!(read_lines(&dir.path().join("traces.csv")).len(), 3);
        assert_eq!(read_lines(&dir.path().join("ticks.csv")).len(), 1);
    }
}
