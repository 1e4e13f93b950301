//! The `TraceWriter` trait implemented by output backends.

use crate::{OutputResult, TickRow, TraceRow};

/// Sink for trace rows.
///
/// Errors are stored by the observer and retrieved with
/// [`TraceOutputObserver::take_error`](crate::TraceOutputObserver::take_error).
pub trait TraceWriter {
    fn write_traces(&mut self, rows: &[TraceRow]) -> OutputResult<()>;

    fn write_tick(&mut self, row: &TickRow) -> OutputResult<()>;

    /// Flush and close all underlying handles.  Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
