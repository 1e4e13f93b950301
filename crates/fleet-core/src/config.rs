//! Top-level simulation configuration.

use std::time::Duration;

use crate::{CoreError, CoreResult};

/// Simulation-level knobs shared by both drivers.
///
/// Typically loaded from a TOML file by the application crate (with the
/// `serde` feature) and passed to the simulation builders.  Missing fields
/// fall back to [`SimConfig::default`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Serial driver: number of iterations (each ticks every robot once).
    pub iterations: u64,

    /// Number of robots placed at setup.
    pub robot_count: usize,

    /// Master RNG seed.  The same seed always produces identical serial runs.
    pub seed: u64,

    /// Concurrent driver: chance per feeder tick of adding a task, in [0, 1].
    pub feed_probability: f64,

    /// Concurrent driver: total tasks the feeder adds before it stops.
    pub feed_cap: usize,

    /// Concurrent driver: feeder timer period.
    pub feed_interval_ms: u64,

    /// Concurrent driver: bound of the trace channel feeding the observer.
    pub trace_channel_capacity: usize,

    /// Concurrent driver: how often the supervisor polls the broker.
    pub poll_interval_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            iterations:             10,
            robot_count:            5,
            seed:                   42,
            feed_probability:       0.3,
            feed_cap:               5,
            feed_interval_ms:       5,
            trace_channel_capacity: 1_024,
            poll_interval_ms:       2,
        }
    }
}

impl SimConfig {
    /// Reject values that would make a run meaningless or hang.
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..=1.0).contains(&self.feed_probability) {
            return Err(CoreError::Config(format!(
                "feed_probability must be within [0, 1], got {}",
                self.feed_probability
            )));
        }
        if self.feed_cap > 0 && self.feed_probability == 0.0 {
            return Err(CoreError::Config(
                "feed_probability is 0 but feed_cap expects tasks".into(),
            ));
        }
        if self.trace_channel_capacity == 0 {
            return Err(CoreError::Config("trace_channel_capacity must be > 0".into()));
        }
        if self.feed_interval_ms == 0 || self.poll_interval_ms == 0 {
            return Err(CoreError::Config("timer intervals must be > 0 ms".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn feed_interval(&self) -> Duration {
        Duration::from_millis(self.feed_interval_ms)
    }

    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
