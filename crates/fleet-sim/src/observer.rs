//! Simulation observer trait for trace consumption and early stopping.

use fleet_agent::{TaskPhase, Trace};
use fleet_core::Tick;

/// Receives every trace the robots produce.
///
/// Only [`on_trace`][Self::on_trace] is required.  The serial driver calls
/// the hooks inline; the concurrent driver calls them from a single drain
/// task, so implementations never see two callbacks at once.
///
/// # Example: stop after the first delivery
///
/// ```rust,ignore
/// struct FirstDelivery(bool);
///
/// impl SimObserver for FirstDelivery {
///     fn on_trace(&mut self, trace: &Trace) {
///         self.0 |= trace.phase() == Some(TaskPhase::End);
///     }
///     fn is_done(&self) -> bool { self.0 }
/// }
/// ```
pub trait SimObserver {
    fn on_trace(&mut self, trace: &Trace);

    /// Called after every robot has run once in a serial iteration.
    fn on_tick_end(&mut self, _tick: Tick) {}

    /// Called once when the run ends, with the last tick reached.
    fn on_sim_end(&mut self, _final_tick: Tick) {}

    /// Return `true` to ask the driver to stop early.
    fn is_done(&self) -> bool {
        false
    }
}

impl<O: SimObserver + ?Sized> SimObserver for Box<O> {
    fn on_trace(&mut self, trace: &Trace) {
        (**self).on_trace(trace)
    }
    fn on_tick_end(&mut self, tick: Tick) {
        (**self).on_tick_end(tick)
    }
    fn on_sim_end(&mut self, final_tick: Tick) {
        (**self).on_sim_end(final_tick)
    }
    fn is_done(&self) -> bool {
        (**self).is_done()
    }
}

/// A [`SimObserver`] that ignores everything.
pub struct NoopObserver;

impl SimObserver for NoopObserver {
    fn on_trace(&mut self, _trace: &Trace) {}
}

/// Tallies traces by kind.  Optionally reports done after `target`
/// deliveries.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CountingObserver {
    pub moves:       usize,
    pub pickups:     usize,
    pub deliveries:  usize,
    pub idles:       usize,
    pub ticks:       u64,
    pub final_tick:  Option<Tick>,
    target:          Option<usize>,
}

impl CountingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Done once `deliveries >= target`.
    pub fn until_deliveries(target: usize) -> Self {
        Self { target: Some(target), ..Self::default() }
    }

    pub fn total(&self) -> usize {
        self.moves + self.pickups + self.deliveries + self.idles
    }
}

impl SimObserver for CountingObserver {
    fn on_trace(&mut self, trace: &Trace) {
        match trace {
            Trace::Move { .. } => self.moves += 1,
            Trace::TaskExecution { phase: TaskPhase::Start, .. } => self.pickups += 1,
            Trace::TaskExecution { phase: TaskPhase::End, .. } => self.deliveries += 1,
            Trace::NullAction { .. } => self.idles += 1,
        }
    }

    fn on_tick_end(&mut self, _tick: Tick) {
        self.ticks += 1;
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.final_tick = Some(final_tick);
    }

    fn is_done(&self) -> bool {
        self.target.is_some_and(|t| self.deliveries >= t)
    }
}
