use fleet_agent::AgentError;
use fleet_core::{CoreError, Location};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("location {0} is not part of the topology")]
    UnknownLocation(Location),

    #[error("robot failure: {0}")]
    Agent(#[from] AgentError),

    #[error("simulation unit panicked or was aborted: {0}")]
    Join(String),
}

impl From<CoreError> for SimError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::UnknownLocation(loc) => SimError::UnknownLocation(loc),
            CoreError::Config(msg)          => SimError::Config(msg),
        }
    }
}

impl From<tokio::task::JoinError> for SimError {
    fn from(e: tokio::task::JoinError) -> Self {
        SimError::Join(e.to_string())
    }
}

pub type SimResult<T> = Result<T, SimError>;
