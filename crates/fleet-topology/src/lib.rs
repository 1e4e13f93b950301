//! `fleet-topology`: warehouse graph, edge weights, and routing.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`topology`] | `Topology` (CSR + lock-guarded weights), `TopologyBuilder` |
//! | [`layout`]   | `warehouse_layout()`: the fixed 12-node reference graph    |
//! | [`router`]   | `Router` trait, `BellmanFordRouter`, `DijkstraRouter`      |
//! | [`error`]    | `RouteError`, `RouteResult<T>`                             |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `fx-hash` | FxHash for the `Location` → index map.                     |

pub mod error;
pub mod layout;
pub mod router;
pub mod topology;

#[cfg(test)]
mod tests;

pub use error::{RouteError, RouteResult};
pub use layout::{WAREHOUSE_EDGES, warehouse_layout};
pub use router::{BellmanFordRouter, DijkstraRouter, Router};
pub use topology::{Topology, TopologyBuilder};
