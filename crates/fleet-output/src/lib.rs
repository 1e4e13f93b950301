//! `fleet-output`: trace output writers for the fleet simulator.
//!
//! | Backend | Files created                 |
//! |---------|-------------------------------|
//! | CSV     | `traces.csv`, `ticks.csv`     |
//!
//! Backends implement [`TraceWriter`] and are driven by
//! [`TraceOutputObserver`], which implements `fleet_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fleet_output::{CsvTraceWriter, TraceOutputObserver};
//!
//! let writer = CsvTraceWriter::new(Path::new("./output"))?;
//! let mut obs = TraceOutputObserver::new(writer);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvTraceWriter;
pub use error::{OutputError, OutputResult};
pub use observer::TraceOutputObserver;
pub use row::{TickRow, TraceRow};
pub use writer::TraceWriter;
