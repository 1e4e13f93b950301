//! Turning a claimed task into an action chain.

use std::sync::Arc;

use tracing::trace;

use fleet_core::Location;
use fleet_tasks::Task;
use fleet_topology::{BellmanFordRouter, RouteResult, Router, Topology};

use crate::{Action, MoveAction};

/// Build the full chain for carrying `task` from wherever the robot is.
///
/// ```text
///   at origin:   BeginTask → Move(origin→dest) → EndTask → Null
///   elsewhere:   Move(current→origin) → BeginTask → Move(origin→dest) → EndTask → Null
/// ```
///
/// Both legs are routed against the current weights; nothing is claimed here.
pub fn plan_task_action<R: Router + ?Sized>(
    router:   &R,
    topology: &Topology,
    current:  Location,
    task:     &Task,
) -> RouteResult<Action> {
    let delivery = router.shortest_path(topology, task.origin, task.destination)?;

    let tail = Action::begin(
        task.id,
        task.origin,
        Action::moving(
            MoveAction::new(task.origin, task.destination, delivery),
            Action::end(task.id, task.destination, Action::Null),
        ),
    );

    if current == task.origin {
        return Ok(tail);
    }

    let approach = router.shortest_path(topology, current, task.origin)?;
    trace!(task = %task.id, %current, hops = approach.len(), "planned approach leg");
    Ok(Action::moving(MoveAction::new(current, task.origin, approach), tail))
}

/// Shared topology plus the router robots plan with.
///
/// Cheap to clone: one per concurrent unit.
#[derive(Debug)]
pub struct Navigator<R = BellmanFordRouter> {
    topology: Arc<Topology>,
    router:   R,
}

impl<R: Clone> Clone for Navigator<R> {
    fn clone(&self) -> Self {
        Self {
            topology: Arc::clone(&self.topology),
            router:   self.router.clone(),
        }
    }
}

impl Navigator<BellmanFordRouter> {
    pub fn new(topology: Arc<Topology>) -> Self {
        Self::with_router(topology, BellmanFordRouter)
    }
}

impl<R: Router> Navigator<R> {
    pub fn with_router(topology: Arc<Topology>, router: R) -> Self {
        Self { topology, router }
    }

    #[inline]
    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    #[inline]
    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn shortest_path(&self, from: Location, to: Location) -> RouteResult<Vec<Location>> {
        self.router.shortest_path(&self.topology, from, to)
    }

    /// [`plan_task_action`] against this navigator's topology.
    pub fn plan(&self, current: Location, task: &Task) -> RouteResult<Action> {
        plan_task_action(&self.router, &self.topology, current, task)
    }
}
