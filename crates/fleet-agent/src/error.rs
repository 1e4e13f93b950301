use thiserror::Error;

use fleet_core::{RobotId, TaskId};
use fleet_tasks::BrokerError;

#[derive(Debug, Error)]
pub enum AgentError {
    /// The broker refused to complete a task the robot was carrying.
    #[error("robot {robot} could not complete task {task}: {source}")]
    Completion {
        robot:  RobotId,
        task:   TaskId,
        #[source]
        source: BrokerError,
    },
}

pub type AgentResult<T> = Result<T, AgentError>;
