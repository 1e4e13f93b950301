//! Base error type.
//!
//! Sub-crates define their own error enums and either convert into
//! `CoreError` or wrap it as one variant, whichever keeps error sites clean.

use thiserror::Error;

use crate::Location;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("location {0} is not part of the topology")]
    UnknownLocation(Location),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `fleet-core`.
pub type CoreResult<T> = Result<T, CoreError>;
