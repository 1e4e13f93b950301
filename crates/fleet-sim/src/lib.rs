//! `fleet-sim`: drivers that make a fleet of robots work through tasks.
//!
//! # Drivers
//!
//! ```text
//! SerialSim (one thread, deterministic)
//!   for iteration in 0..config.iterations:
//!     for robot in registry order:
//!       robot.run(navigator, pool) → Trace → observer.on_trace
//!     observer.on_tick_end
//!
//! ConcurrentSim (tokio)
//!   robot unit × N   loop { run → send Trace → yield }   until cancelled
//!   task feeder      every feed_interval: p → add random task, up to cap
//!   observer unit    drain Trace channel → observer.on_trace
//! ```
//!
//! Both drivers share [`World`], [`SimObserver`] and [`SimBuilder`].  Every
//! robot reports one trace per tick, idle or not; a failed delivery aborts
//! the run with [`SimError::Agent`].
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use fleet_core::{Location, SimConfig};
//! use fleet_sim::{CountingObserver, SimBuilder};
//! use fleet_topology::warehouse_layout;
//!
//! let mut sim = SimBuilder::new(SimConfig::default(), warehouse_layout())
//!     .robots_at(2, Location(1))
//!     .task(Location(1), Location(2))
//!     .build()?;
//! let mut obs = CountingObserver::new();
//! sim.run(&mut obs)?;
//! ```

pub mod builder;
pub mod concurrent;
pub mod error;
pub mod feeder;
pub mod observer;
pub mod sim;
pub mod world;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use concurrent::{ConcurrentSim, SimHandle, TraceSender};
pub use error::{SimError, SimResult};
pub use feeder::{TaskFeeder, random_task, random_tasks};
pub use observer::{CountingObserver, NoopObserver, SimObserver};
pub use sim::SerialSim;
pub use world::World;
