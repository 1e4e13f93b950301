//! The robot state machine.

use std::mem;

use tracing::{debug, trace, warn};

use fleet_core::{Location, RobotId, TaskId, Tick};
use fleet_tasks::{Task, TaskBroker, TaskStatus};
use fleet_topology::Router;

use crate::{Action, ActionStatus, AgentError, AgentResult, Navigator, TaskPhase, Trace};

/// What [`Robot::plan`] did this tick.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PlanOutcome {
    /// Already carrying a chain.
    Busy,
    /// Nothing pending.
    NoWork,
    /// No pending task has a route from here.
    Unroutable,
    /// Another robot claimed the chosen task first.
    Lost(TaskId),
    Claimed(TaskId),
}

/// One warehouse robot.
///
/// Owned by exactly one driver unit; only its own `plan`/`execute` mutate it.
#[derive(Clone, Debug)]
pub struct Robot {
    pub id:       RobotId,
    pub location: Location,
    /// Task currently carried or being fetched.
    pub task:     Option<TaskId>,
    /// Remaining chain; `Null` when idle.
    pub action:   Action,
    /// Local clock, advanced once per [`run`](Self::run).
    pub tick:     Tick,
}

impl Robot {
    pub fn new(id: RobotId, location: Location) -> Self {
        Self {
            id,
            location,
            task:   None,
            action: Action::Null,
            tick:   Tick::ZERO,
        }
    }

    /// No chain and no task.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.task.is_none() && self.action.is_null()
    }

    /// Pick up work if idle.
    ///
    /// Routes the broker's offered task first, then the other pending tasks
    /// in priority order, and claims the first one with a route.  Tasks that
    /// cannot be routed stay pending.  Losing the claim race leaves the robot
    /// idle until the next tick.
    pub fn plan<R, B>(&mut self, nav: &Navigator<R>, broker: &mut B) -> PlanOutcome
    where
        R: Router,
        B: TaskBroker + ?Sized,
    {
        if !self.is_idle() {
            return PlanOutcome::Busy;
        }
        let Some(offered) = broker.next_task() else {
            return PlanOutcome::NoWork;
        };

        let routed = match self.route(nav, &offered) {
            Some(chain) => Some((offered, chain)),
            None => broker
                .tasks(broker.pending_count())
                .into_iter()
                .filter(|t| t.id != offered.id)
                .find_map(|t| self.route(nav, &t).map(|chain| (t, chain))),
        };
        let Some((task, chain)) = routed else {
            return PlanOutcome::Unroutable;
        };

        match broker.claim(task.id) {
            Ok(claimed) => {
                debug!(robot = %self.id, task = %claimed.id, steps = chain.step_count(), "claimed task");
                self.task = Some(claimed.id);
                self.action = chain;
                PlanOutcome::Claimed(claimed.id)
            }
            Err(e) => {
                debug!(robot = %self.id, task = %task.id, error = %e, "lost claim race");
                PlanOutcome::Lost(task.id)
            }
        }
    }

    /// Advance the chain by one step and report it.
    pub fn execute<B: TaskBroker + ?Sized>(&mut self, broker: &mut B) -> AgentResult<Trace> {
        let robot = self.id;
        let timestamp = self.tick;

        match &mut self.action {
            Action::Null => Ok(Trace::NullAction { robot, location: self.location, timestamp }),

            Action::Move { step, .. } => {
                step.status = ActionStatus::Active;
                let source = self.location;
                let target = match step.path.pop_front() {
                    Some(next) => next,
                    None => source,
                };
                self.location = target;
                if step.path.is_empty() {
                    step.status = ActionStatus::Ended;
                    self.advance();
                }
                trace!(robot = %robot, %source, %target, "moved");
                Ok(Trace::Move { robot, source, target, timestamp })
            }

            Action::BeginTask { task, .. } => {
                let task = *task;
                self.advance();
                Ok(Trace::TaskExecution {
                    phase: TaskPhase::Start,
                    task,
                    robot,
                    location: self.location,
                    timestamp,
                })
            }

            Action::EndTask { task, .. } => {
                let task = *task;
                broker
                    .task_update(task, TaskStatus::Completed)
                    .map_err(|source| AgentError::Completion { robot, task, source })?;
                debug!(robot = %robot, task = %task, "delivered task");
                self.task = None;
                self.advance();
                Ok(Trace::TaskExecution {
                    phase: TaskPhase::End,
                    task,
                    robot,
                    location: self.location,
                    timestamp,
                })
            }
        }
    }

    /// One full tick: advance the clock, plan, then execute.
    ///
    /// Always yields the tick's trace unless the broker refuses a delivery.
    pub fn run<R, B>(&mut self, nav: &Navigator<R>, broker: &mut B) -> AgentResult<Trace>
    where
        R: Router,
        B: TaskBroker + ?Sized,
    {
        self.tick.advance();
        self.plan(nav, broker);
        self.execute(broker)
    }

    fn route<R: Router>(&self, nav: &Navigator<R>, task: &Task) -> Option<Action> {
        match nav.plan(self.location, task) {
            Ok(chain) => Some(chain),
            Err(e) => {
                warn!(robot = %self.id, task = %task.id, error = %e, "no route for task");
                None
            }
        }
    }

    fn advance(&mut self) {
        let current = mem::take(&mut self.action);
        self.action = current.into_child();
    }
}
