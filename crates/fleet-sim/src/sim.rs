//! The serial driver and its iteration loop.

use tracing::{error, info};

use fleet_core::{SimConfig, SimRng, Tick};
use fleet_tasks::{OldestFirst, TaskBroker, TaskPool, TaskSelector};
use fleet_topology::{BellmanFordRouter, Router};

use crate::{SimObserver, SimResult, World};

/// Single-threaded driver.
///
/// Each iteration visits every robot in registry order and calls
/// [`Robot::run`](fleet_agent::Robot::run) once, forwarding the trace to the
/// observer.  Runs are fully deterministic for a given seed.
///
/// Create via [`SimBuilder::build`][crate::SimBuilder::build].
pub struct SerialSim<S = OldestFirst, R = BellmanFordRouter> {
    pub config: SimConfig,
    world:      World<TaskPool<S>, R>,
    rng:        SimRng,
    iteration:  u64,
}

impl<S: TaskSelector, R: Router> SerialSim<S, R> {
    pub(crate) fn new(config: SimConfig, world: World<TaskPool<S>, R>, rng: SimRng) -> Self {
        Self { config, world, rng, iteration: 0 }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn world(&self) -> &World<TaskPool<S>, R> {
        &self.world
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut World<TaskPool<S>, R> {
        &mut self.world
    }

    /// Iterations completed so far.
    #[inline]
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// The run's RNG, for callers that add random work between iterations.
    #[inline]
    pub fn rng(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run `config.iterations` iterations, or until the observer is done.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        info!(
            iterations = self.config.iterations,
            robots = self.world.robots.len(),
            pending = self.world.broker.pending_count(),
            "serial simulation started"
        );
        for _ in 0..self.config.iterations {
            self.step(observer)?;
            if observer.is_done() {
                break;
            }
        }
        self.finish(observer);
        Ok(())
    }

    /// Run exactly `n` iterations.  Ignores `is_done`; no `on_sim_end`.
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Iterate until no task is pending or in flight, at most `max`
    /// iterations.  Returns the number of iterations run.
    pub fn run_until_idle<O: SimObserver>(&mut self, max: u64, observer: &mut O) -> SimResult<u64> {
        let start = self.iteration;
        while self.iteration - start < max && self.has_outstanding() {
            self.step(observer)?;
            if observer.is_done() {
                break;
            }
        }
        self.finish(observer);
        Ok(self.iteration - start)
    }

    // ── Iteration ─────────────────────────────────────────────────────────

    fn has_outstanding(&self) -> bool {
        self.world.broker.has_tasks() || self.world.broker.active_count() > 0
    }

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let World { navigator, broker, robots, .. } = &mut self.world;

        for robot in robots.iter_mut() {
            match robot.run(navigator, &mut *broker) {
                Ok(trace) => observer.on_trace(&trace),
                Err(e) => {
                    error!(robot = %robot.id, error = %e, "robot failed");
                    return Err(e.into());
                }
            }
        }

        self.iteration += 1;
        observer.on_tick_end(Tick(self.iteration));
        Ok(())
    }

    fn finish<O: SimObserver>(&mut self, observer: &mut O) {
        let broker = &self.world.broker;
        info!(
            iterations = self.iteration,
            finished = broker.finished_count(),
            active = broker.active_count(),
            pending = broker.pending_count(),
            "serial simulation finished"
        );
        observer.on_sim_end(Tick(self.iteration));
    }
}
