//! Flat row types written by output backends.

use fleet_agent::Trace;

/// One trace, flattened.  `task` and `phase` are only set for task traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRow {
    pub kind:      &'static str,
    pub robot:     u32,
    pub task:      Option<u64>,
    pub phase:     Option<&'static str>,
    pub source:    u32,
    pub target:    u32,
    pub timestamp: u64,
}

impl From<&Trace> for TraceRow {
    fn from(trace: &Trace) -> Self {
        Self {
            kind:      trace.kind(),
            robot:     trace.robot().raw(),
            task:      trace.task().map(|t| t.raw()),
            phase:     trace.phase().map(fleet_agent::TaskPhase::as_str),
            source:    trace.source().raw(),
            target:    trace.target().raw(),
            timestamp: trace.timestamp().0,
        }
    }
}

/// Traces seen during one serial iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRow {
    pub tick:   u64,
    pub traces: u64,
}
