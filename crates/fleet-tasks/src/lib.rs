//! `fleet-tasks`: task lifecycle and claim arbitration.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                       |
//! |--------------|----------------------------------------------------------------|
//! | [`task`]     | `Task`, `TaskStatus`                                           |
//! | [`selector`] | `TaskSelector` trait, `OldestFirst`, `RandomPick`              |
//! | [`broker`]   | `TaskBroker` trait, the contract both brokers implement        |
//! | [`pool`]     | `TaskPool<S>`: single-threaded broker (direct map mutation)    |
//! | [`shared`]   | `SharedBroker<S>`: clonable handle, one lock around a pool     |
//! | [`error`]    | `BrokerError`, `BrokerResult<T>`                               |
//!
//! # Lifecycle
//!
//! ```text
//!   add_task ──► Unassigned ──claim──► Active ──complete──► Archive
//!                 (pending)            (Assigned)           (Completed)
//! ```
//!
//! A task lives in exactly one of the three pools.  Transitions only move
//! rightwards; the archive is write-only bookkeeping and never feeds back into
//! the pending pool.

pub mod broker;
pub mod error;
pub mod pool;
pub mod selector;
pub mod shared;
pub mod task;


pub use broker::TaskBroker;
pub use error::{BrokerError, BrokerResult};
pub use pool::TaskPool;
pub use selector::{OldestFirst, RandomPick, TaskSelector};
pub use shared::SharedBroker;
pub use task::{Task, TaskStatus};
