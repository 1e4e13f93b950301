//! Routing error type.

use thiserror::Error;

use fleet_core::Location;

/// Errors produced when no finite route can be computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("no route from {from} to {to}")]
    Unreachable { from: Location, to: Location },

    #[error("negative cycle reachable from {from}")]
    NegativeCycle { from: Location },

    #[error("edge {a} - {b} has negative weight {weight}; use a Bellman-Ford router")]
    NegativeWeight { a: Location, b: Location, weight: f64 },

    #[error("location {0} not found in topology")]
    UnknownLocation(Location),
}

pub type RouteResult<T> = Result<T, RouteError>;
