use thiserror::Error;

use fleet_core::TaskId;

use crate::TaskStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// The task is not pending: never added, or already claimed.
    #[error("task {0} not found in the pending pool")]
    NotFound(TaskId),

    /// Lost a claim race.  Recoverable: retry on the next tick.
    #[error("task {0} was claimed by another robot")]
    ClaimConflict(TaskId),

    /// `from` is `None` when the broker does not track the task at all.
    #[error("task {id}: cannot move from {from:?} to {to}")]
    InvalidTransition {
        id:   TaskId,
        from: Option<TaskStatus>,
        to:   TaskStatus,
    },
}

pub type BrokerResult<T> = Result<T, BrokerError>;
