//! `World`: topology, robots and the broker they share.

use std::sync::Arc;

use tracing::debug;

use fleet_agent::{Navigator, Robot};
use fleet_core::{IdSupplier, Location, RobotId, TaskId};
use fleet_tasks::{Task, TaskBroker, TaskPool};
use fleet_topology::{BellmanFordRouter, Router, Topology};

use crate::SimResult;

/// Every location a live robot or task references is a node of the
/// topology; `add_robot` and `add_task` reject anything else.
pub struct World<B = TaskPool, R = BellmanFordRouter> {
    pub(crate) navigator: Navigator<R>,
    pub(crate) broker:    B,
    pub(crate) robots:    Vec<Robot>,
    pub(crate) ids:       Arc<IdSupplier>,
}

impl<B: TaskBroker, R: Router> World<B, R> {
    pub fn new(topology: Arc<Topology>, router: R, broker: B) -> Self {
        Self {
            navigator: Navigator::with_router(topology, router),
            broker,
            robots:    Vec::new(),
            ids:       Arc::new(IdSupplier::new()),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn topology(&self) -> &Arc<Topology> {
        self.navigator.topology()
    }

    #[inline]
    pub fn navigator(&self) -> &Navigator<R> {
        &self.navigator
    }

    #[inline]
    pub fn broker(&self) -> &B {
        &self.broker
    }

    #[inline]
    pub fn broker_mut(&mut self) -> &mut B {
        &mut self.broker
    }

    #[inline]
    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn robot(&self, id: RobotId) -> Option<&Robot> {
        self.robots.iter().find(|r| r.id == id)
    }

    /// Shared ID source; hand a clone to anything that creates tasks.
    #[inline]
    pub fn ids(&self) -> &Arc<IdSupplier> {
        &self.ids
    }

    // ── Population ────────────────────────────────────────────────────────

    /// Place a new robot at `location`.
    pub fn add_robot(&mut self, location: Location) -> SimResult<RobotId> {
        self.topology().require(location)?;
        let id = self.ids.next_robot();
        self.robots.push(Robot::new(id, location));
        debug!(robot = %id, %location, "robot placed");
        Ok(id)
    }

    /// Validate `task`'s endpoints and hand it to the broker.
    ///
    /// `Ok(false)` when the broker rejects it (duplicate ID or already
    /// completed).
    pub fn add_task(&mut self, task: Task) -> SimResult<bool> {
        let topology = self.navigator.topology();
        topology.require(task.origin)?;
        topology.require(task.destination)?;
        Ok(self.broker.add_task(task))
    }

    /// Create and add a task with a fresh ID.
    pub fn new_task(&mut self, origin: Location, destination: Location) -> SimResult<TaskId> {
        let id = self.ids.next_task();
        self.add_task(Task::new(id, origin, destination))?;
        Ok(id)
    }

    // ── Congestion ────────────────────────────────────────────────────────

    /// Lower edge weights around every robot.
    ///
    /// See [`Topology::decay_from`]; call `topology().reset_weights()` to undo.
    pub fn apply_congestion(&self, steps: u32) {
        let topology = self.navigator.topology();
        for robot in &self.robots {
            topology.decay_from(robot.location, steps);
        }
    }

    /// Split into parts; used when handing robots to concurrent units.
    pub(crate) fn into_parts(self) -> (Navigator<R>, B, Vec<Robot>, Arc<IdSupplier>) {
        (self.navigator, self.broker, self.robots, self.ids)
    }
}
