//! Routing trait and the two bundled shortest-path implementations.
//!
//! # Pluggability
//!
//! Robots plan through the [`Router`] trait, so applications can swap in a
//! custom search without touching the planner.  [`BellmanFordRouter`] is the
//! default because congestion decay can push weights below zero.
//!
//! # Path shape
//!
//! A route is the ordered list of locations from the first hop after `from`
//! up to and including `to`.  `from == to` yields an empty route.  Routes are
//! never cached: weights may change between two queries.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use fleet_core::Location;

use crate::{RouteError, RouteResult, Topology};

/// Marker for an unreached node in the predecessor table.
const NO_PREV: usize = usize::MAX;

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
///
/// Implementations must be `Send + Sync` so one router can serve every
/// concurrent robot unit.
pub trait Router: Send + Sync {
    /// Compute the cheapest route from `from` to `to` on the current weights.
    fn shortest_path(
        &self,
        topology: &Topology,
        from: Location,
        to: Location,
    ) -> RouteResult<Vec<Location>>;
}

impl<R: Router + ?Sized> Router for std::sync::Arc<R> {
    fn shortest_path(
        &self,
        topology: &Topology,
        from: Location,
        to: Location,
    ) -> RouteResult<Vec<Location>> {
        (**self).shortest_path(topology, from, to)
    }
}

// ── BellmanFordRouter ─────────────────────────────────────────────────────────

/// Single-source Bellman-Ford over the undirected graph.
///
/// Accepts negative weights.  Since every edge is traversable both ways, a
/// single negative edge reachable from `from` already forms a negative cycle
/// and is reported as [`RouteError::NegativeCycle`].
///
/// Relaxation runs in CSR order with a strict `<`, so ties resolve to the
/// first edge inserted and results are deterministic.
#[derive(Debug, Default, Clone, Copy)]
pub struct BellmanFordRouter;

impl Router for BellmanFordRouter {
    fn shortest_path(
        &self,
        topology: &Topology,
        from: Location,
        to: Location,
    ) -> RouteResult<Vec<Location>> {
        bellman_ford(topology, from, to)
    }
}

fn bellman_ford(topology: &Topology, from: Location, to: Location) -> RouteResult<Vec<Location>> {
    let src = topology.index_of(from).ok_or(RouteError::UnknownLocation(from))?;
    let dst = topology.index_of(to).ok_or(RouteError::UnknownLocation(to))?;
    if src == dst {
        return Ok(vec![]);
    }

    let n = topology.node_count();
    let weights = topology.weights_snapshot();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev = vec![NO_PREV; n];
    dist[src] = 0.0;

    // n - 1 rounds suffice without negative cycles; stop early once stable.
    for _ in 1..n {
        if !relax_all(topology, &weights, &mut dist, &mut prev) {
            break;
        }
    }
    // One more round: any improvement means a reachable negative cycle.
    if relax_all(topology, &weights, &mut dist, &mut prev) {
        return Err(RouteError::NegativeCycle { from });
    }

    if dist[dst].is_infinite() {
        return Err(RouteError::Unreachable { from, to });
    }
    reconstruct(topology, &prev, src, dst).ok_or(RouteError::Unreachable { from, to })
}

/// One relaxation pass over every half-edge.  Returns `true` if any distance
/// improved.
fn relax_all(topology: &Topology, weights: &[f64], dist: &mut [f64], prev: &mut [usize]) -> bool {
    let mut changed = false;
    for u in 0..topology.node_count() {
        if dist[u].is_infinite() {
            continue;
        }
        for h in topology.out_half_edges(u) {
            let v = topology.half_target(h);
            let candidate = dist[u] + weights[topology.half_weight_slot(h)];
            if candidate < dist[v] {
                dist[v] = candidate;
                prev[v] = u;
                changed = true;
            }
        }
    }
    changed
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Dijkstra's algorithm over the CSR graph.
///
/// Faster than Bellman-Ford but only valid for non-negative weights; the first
/// negative edge it touches aborts the query with
/// [`RouteError::NegativeWeight`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn shortest_path(
        &self,
        topology: &Topology,
        from: Location,
        to: Location,
    ) -> RouteResult<Vec<Location>> {
        dijkstra(topology, from, to)
    }
}

/// Total-ordered `f64` cost for the binary heap.
#[derive(Copy, Clone, PartialEq)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn dijkstra(topology: &Topology, from: Location, to: Location) -> RouteResult<Vec<Location>> {
    let src = topology.index_of(from).ok_or(RouteError::UnknownLocation(from))?;
    let dst = topology.index_of(to).ok_or(RouteError::UnknownLocation(to))?;
    if src == dst {
        return Ok(vec![]);
    }

    let n = topology.node_count();
    let weights = topology.weights_snapshot();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev = vec![NO_PREV; n];
    dist[src] = 0.0;

    // Min-heap: (cost, node).  Secondary key gives deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(Cost, usize)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), src)));

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        if node == dst {
            return reconstruct(topology, &prev, src, dst)
                .ok_or(RouteError::Unreachable { from, to });
        }

        // Skip stale heap entries.
        if cost > dist[node] {
            continue;
        }

        for h in topology.out_half_edges(node) {
            let slot = topology.half_weight_slot(h);
            let w = weights[slot];
            if w < 0.0 {
                let (a, b) = topology.edge_ends(slot);
                return Err(RouteError::NegativeWeight { a, b, weight: w });
            }
            let neighbor = topology.half_target(h);
            let new_cost = cost + w;
            if new_cost < dist[neighbor] {
                dist[neighbor] = new_cost;
                prev[neighbor] = node;
                heap.push(Reverse((Cost(new_cost), neighbor)));
            }
        }
    }

    Err(RouteError::Unreachable { from, to })
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Walk `prev` back from `dst` and return the head-exclusive path.
///
/// Returns `None` if the chain is broken or longer than the node count.
fn reconstruct(topology: &Topology, prev: &[usize], src: usize, dst: usize) -> Option<Vec<Location>> {
    let mut path = Vec::new();
    let mut cur = dst;
    while cur != src {
        if path.len() > topology.node_count() {
            return None;
        }
        path.push(topology.location_at(cur));
        cur = prev[cur];
        if cur == NO_PREV {
            return None;
        }
    }
    path.reverse();
    Some(path)
}
