//! `fleet-agent`: what a robot is, what it plans, and what it reports.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`action`]    | `Action` chain, `MoveAction`, `ActionStatus`              |
//! | [`planner`]   | `plan_task_action`, `Navigator` (topology + router)       |
//! | [`robot`]     | `Robot`: plan / execute / run                             |
//! | [`trace`]     | `Trace`, `TaskPhase`                                      |
//! | [`error`]     | `AgentError`, `AgentResult<T>`                            |
//!
//! # Robot cycle
//!
//! ```text
//!   Idle ──plan──► Planning ──claim ok──► Executing ──chain exhausted──► Idle
//!                     │
//!                     └─claim conflict / no routable task──► Idle
//! ```
//!
//! Every call to [`Robot::execute`] advances the chain by at most one step
//! and returns exactly one [`Trace`].

pub mod action;
pub mod error;
pub mod planner;
pub mod robot;
pub mod trace;


pub use action::{Action, ActionStatus, MoveAction};
pub use error::{AgentError, AgentResult};
pub use planner::{Navigator, plan_task_action};
pub use robot::{PlanOutcome, Robot};
pub use trace::{TaskPhase, Trace};
