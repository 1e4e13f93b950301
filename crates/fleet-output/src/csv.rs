//! CSV output backend.
//!
//! Creates two files in the output directory:
//! - `traces.csv`
//! - `ticks.csv`

use std::fs::{self, File};
use std::path::Path;

use csv::Writer;

use crate::writer::TraceWriter;
use crate::{OutputResult, TickRow, TraceRow};

pub const TRACE_HEADER: [&str; 7] = ["kind", "robot", "task", "phase", "source", "target", "timestamp"];
pub const TICK_HEADER: [&str; 2] = ["tick", "traces"];

/// Writes traces and per-iteration counts to two CSV files.
pub struct CsvTraceWriter {
    traces:   Writer<File>,
    ticks:    Writer<File>,
    finished: bool,
}

impl CsvTraceWriter {
    /// Create `dir` if needed, open both files and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;

        let mut traces = Writer::from_path(dir.join("traces.csv"))?;
        traces.write_record(TRACE_HEADER)?;

        let mut ticks = Writer::from_path(dir.join("ticks.csv"))?;
        ticks.write_record(TICK_HEADER)?;

        Ok(Self { traces, ticks, finished: false })
    }
}

impl TraceWriter for CsvTraceWriter {
    fn write_traces(&mut self, rows: &[TraceRow]) -> OutputResult<()> {
        for row in rows {
            self.traces.write_record(&[
                row.kind.to_string(),
                row.robot.to_string(),
                row.task.map(|t| t.to_string()).unwrap_or_default(),
                row.phase.unwrap_or_default().to_string(),
                row.source.to_string(),
                row.target.to_string(),
                row.timestamp.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick(&mut self, row: &TickRow) -> OutputResult<()> {
        self.ticks.write_record(&[row.tick.to_string(), row.traces.to_string()])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.traces.flush()?;
        self.ticks.flush()?;
        Ok(())
    }
}
