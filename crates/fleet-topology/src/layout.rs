//! The fixed 12-node reference warehouse.
//!
//! ```text
//! 1 - 5 - 9
//! | X |   |
//! 2 - 6   10
//! |   |   |
//! 3   7   11
//! |   |   |
//! 4 - 8 - 12
//! ```

use fleet_core::Location;

use crate::{Topology, TopologyBuilder};

/// Unit-weight edges of the reference warehouse, as `(a, b)` node numbers.
pub const WAREHOUSE_EDGES: [(u32, u32); 16] = [
    (1, 2), (1, 5), (1, 6), (2, 5), (2, 3), (2, 6), (3, 4), (4, 8),
    (8, 7), (7, 6), (6, 5), (5, 9), (9, 10), (10, 11), (11, 12), (12, 8),
];

/// Build the reference warehouse: nodes `Location(1)..=Location(12)`, every
/// edge weight 1.
pub fn warehouse_layout() -> Topology {
    let mut b = TopologyBuilder::new();
    for n in 1..=12 {
        b.add_node(Location(n));
    }
    for (a, c) in WAREHOUSE_EDGES {
        b.add_edge(Location(a), Location(c));
    }
    b.build()
}
