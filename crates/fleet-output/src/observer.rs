//! `TraceOutputObserver<W>`: bridges `SimObserver` to a `TraceWriter`.

use tracing::{debug, warn};

use fleet_agent::Trace;
use fleet_core::Tick;
use fleet_sim::SimObserver;

use crate::row::{TickRow, TraceRow};
use crate::writer::TraceWriter;
use crate::{OutputError, OutputResult};

/// Rows buffered before a write when no tick boundary arrives (concurrent
/// runs never call `on_tick_end`).
const FLUSH_ROWS: usize = 4_096;

/// A [`SimObserver`] that writes every trace, plus one count row per serial
/// iteration, to any [`TraceWriter`].
///
/// `SimObserver` methods return nothing, so write errors are stored.  Check
/// [`take_error`][Self::take_error] after the run.
pub struct TraceOutputObserver<W: TraceWriter> {
    writer:      W,
    pending:     Vec<TraceRow>,
    in_tick:     u64,
    written:     u64,
    last_error:  Option<OutputError>,
}

impl<W: TraceWriter> TraceOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pending:    Vec::new(),
            in_tick:    0,
            written:    0,
            last_error: None,
        }
    }

    /// Take the stored write error, `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Trace rows handed to the writer so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let result = self.writer.write_traces(&self.pending);
        self.written += self.pending.len() as u64;
        self.pending.clear();
        self.store_err(result);
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                warn!(error = %e, "trace output failed");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: TraceWriter> SimObserver for TraceOutputObserver<W> {
    fn on_trace(&mut self, trace: &Trace) {
        self.pending.push(TraceRow::from(trace));
        self.in_tick += 1;
        if self.pending.len() >= FLUSH_ROWS {
            self.flush_pending();
        }
    }

    fn on_tick_end(&mut self, tick: Tick) {
        self.flush_pending();
        let row = TickRow { tick: tick.0, traces: self.in_tick };
        self.in_tick = 0;
        let result = self.writer.write_tick(&row);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.flush_pending();
        let result = self.writer.finish();
        self.store_err(result);
        debug!(%final_tick, rows = self.written, "trace output closed");
    }
}
