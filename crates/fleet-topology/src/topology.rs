//! Warehouse topology and builder.
//!
//! # Data layout
//!
//! Nodes are stored densely in insertion order; a hash map translates an
//! opaque [`Location`] into its dense index.  Each undirected edge becomes two
//! **half-edges** stored in Compressed Sparse Row (CSR) format.  Given a dense
//! node index `n`, its outgoing half-edges occupy the slice:
//!
//! ```text
//! half_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Both half-edges of an undirected edge point at the same slot in the weight
//! table (`half_edge`), so a weight change is seen from either direction.
//!
//! # Mutable weights
//!
//! The structure of the graph is immutable after [`TopologyBuilder::build`].
//! Edge weights are not: congestion decay lowers them while robots are
//! routing.  The weight table sits behind a `parking_lot::RwLock` so an
//! `Arc<Topology>` can be shared by every concurrent unit.  Routers take one
//! read-locked snapshot per query.

use std::ops::Range;

use parking_lot::RwLock;
use tracing::trace;

use fleet_core::{CoreError, CoreResult, Location};

#[cfg(feature = "fx-hash")]
type IndexMap = rustc_hash::FxHashMap<Location, usize>;
#[cfg(not(feature = "fx-hash"))]
type IndexMap = std::collections::HashMap<Location, usize>;

// ── Topology ──────────────────────────────────────────────────────────────────

/// Undirected, weighted warehouse graph.
///
/// Do not construct directly; use [`TopologyBuilder`] or
/// [`warehouse_layout`](crate::warehouse_layout).
pub struct Topology {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Locations in insertion order; position = dense index.
    nodes: Vec<Location>,
    index: IndexMap,

    // ── CSR half-edge adjacency ───────────────────────────────────────────
    /// Length = `node_count + 1`.
    node_out_start: Vec<u32>,
    /// Dense index of each half-edge's target.
    half_to: Vec<u32>,
    /// Undirected edge (weight slot) each half-edge belongs to.
    half_edge: Vec<u32>,

    // ── Edge data (indexed by undirected edge) ────────────────────────────
    edge_ends:    Vec<(u32, u32)>,
    base_weights: Vec<f64>,
    weights:      RwLock<Vec<f64>>,
}

impl std::fmt::Debug for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topology")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}

impl Topology {
    /// Construct a topology with no nodes or edges.
    pub fn empty() -> Self {
        TopologyBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ── Node lookup ───────────────────────────────────────────────────────

    /// All locations, in insertion order.
    pub fn nodes(&self) -> &[Location] {
        &self.nodes
    }

    pub fn contains(&self, loc: Location) -> bool {
        self.index.contains_key(&loc)
    }

    /// `Ok(())` if `loc` is a node of this topology.
    pub fn require(&self, loc: Location) -> CoreResult<()> {
        if self.contains(loc) {
            Ok(())
        } else {
            Err(CoreError::UnknownLocation(loc))
        }
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Neighbours of `loc` in CSR order.  Empty for unknown locations.
    pub fn neighbors(&self, loc: Location) -> impl Iterator<Item = Location> + '_ {
        let range = match self.index_of(loc) {
            Some(i) => self.out_half_edges(i),
            None => 0..0,
        };
        range.map(|h| self.nodes[self.half_to[h] as usize])
    }

    pub fn degree(&self, loc: Location) -> usize {
        self.index_of(loc).map_or(0, |i| self.out_half_edges(i).len())
    }

    // ── Edge weights ──────────────────────────────────────────────────────

    /// Current weight of the edge `a - b`, or `None` if they are not adjacent.
    pub fn weight(&self, a: Location, b: Location) -> Option<f64> {
        let e = self.edge_between(a, b)?;
        Some(self.weights.read()[e])
    }

    /// Overwrite the weight of edge `a - b`.  Returns `false` if there is no
    /// such edge.
    pub fn set_weight(&self, a: Location, b: Location, weight: f64) -> bool {
        match self.edge_between(a, b) {
            Some(e) => {
                self.weights.write()[e] = weight;
                true
            }
            None => false,
        }
    }

    /// Restore every edge to the weight it was built with.
    pub fn reset_weights(&self) {
        self.weights.write().clone_from(&self.base_weights);
    }

    /// Congestion decay radiating from `start`.
    ///
    /// Recursively visits neighbours while `depth < steps`; at recursion depth
    /// `d` (starting at 1) every edge leaving the visited node loses `1 / d²`.
    /// The walk does not track visited nodes, so edges near `start` are hit
    /// several times and the decay is strongest around the source.
    pub fn decay_from(&self, start: Location, steps: u32) {
        let Some(i) = self.index_of(start) else {
            return;
        };
        let mut weights = self.weights.write();
        self.propagate_decay(&mut weights, i, steps, 1);
        trace!(%start, steps, "applied congestion decay");
    }

    fn propagate_decay(&self, weights: &mut [f64], node: usize, steps: u32, depth: u32) {
        if steps <= depth {
            return;
        }
        let delta = 1.0 / f64::from(depth * depth);
        for h in self.out_half_edges(node) {
            weights[self.half_edge[h] as usize] -= delta;
            self.propagate_decay(weights, self.half_to[h] as usize, steps, depth + 1);
        }
    }

    // ── Crate-internal accessors used by routers ─────────────────────────

    #[inline]
    pub(crate) fn index_of(&self, loc: Location) -> Option<usize> {
        self.index.get(&loc).copied()
    }

    #[inline]
    pub(crate) fn location_at(&self, i: usize) -> Location {
        self.nodes[i]
    }

    /// Half-edge ids leaving dense node `i`; a contiguous range.
    #[inline]
    pub(crate) fn out_half_edges(&self, i: usize) -> Range<usize> {
        self.node_out_start[i] as usize..self.node_out_start[i + 1] as usize
    }

    #[inline]
    pub(crate) fn half_target(&self, h: usize) -> usize {
        self.half_to[h] as usize
    }

    #[inline]
    pub(crate) fn half_weight_slot(&self, h: usize) -> usize {
        self.half_edge[h] as usize
    }

    /// Copy of the current weight table, taken under one read lock.
    pub(crate) fn weights_snapshot(&self) -> Vec<f64> {
        self.weights.read().clone()
    }

    pub(crate) fn edge_ends(&self, e: usize) -> (Location, Location) {
        let (a, b) = self.edge_ends[e];
        (self.nodes[a as usize], self.nodes[b as usize])
    }

    fn edge_between(&self, a: Location, b: Location) -> Option<usize> {
        let ia = self.index_of(a)?;
        let ib = self.index_of(b)?;
        self.out_half_edges(ia)
            .find(|&h| self.half_to[h] as usize == ib)
            .map(|h| self.half_edge[h] as usize)
    }
}

// ── TopologyBuilder ───────────────────────────────────────────────────────────

/// Construct a [`Topology`] incrementally, then call [`build`](Self::build).
///
/// Edges may reference locations that were never added with
/// [`add_node`](Self::add_node); those nodes are added implicitly.  Setting
/// the same edge twice keeps the last weight.  Self-loops are ignored.
///
/// # Example
///
/// ```
/// use fleet_core::Location;
/// use fleet_topology::TopologyBuilder;
///
/// let mut b = TopologyBuilder::new();
/// b.add_edge(Location(1), Location(2));
/// b.add_weighted_edge(Location(2), Location(3), 4.0);
/// let topo = b.build();
/// assert_eq!(topo.node_count(), 3);
/// assert_eq!(topo.edge_count(), 2);
/// assert_eq!(topo.weight(Location(3), Location(2)), Some(4.0));
/// ```
pub struct TopologyBuilder {
    nodes:     Vec<Location>,
    index:     IndexMap,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    a:      u32,
    b:      u32,
    weight: f64,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), index: IndexMap::default(), raw_edges: Vec::new() }
    }

    /// Add a node.  Returns `false` if it was already present.
    pub fn add_node(&mut self, loc: Location) -> bool {
        if self.index.contains_key(&loc) {
            return false;
        }
        self.index.insert(loc, self.nodes.len());
        self.nodes.push(loc);
        true
    }

    /// Add an undirected unit-weight edge.
    pub fn add_edge(&mut self, a: Location, b: Location) {
        self.add_weighted_edge(a, b, 1.0);
    }

    /// Add an undirected edge with an explicit weight.
    pub fn add_weighted_edge(&mut self, a: Location, b: Location, weight: f64) {
        if a == b {
            return;
        }
        self.add_node(a);
        self.add_node(b);
        let (ia, ib) = (self.index[&a] as u32, self.index[&b] as u32);
        let (lo, hi) = if ia < ib { (ia, ib) } else { (ib, ia) };
        match self.raw_edges.iter_mut().find(|e| e.a == lo && e.b == hi) {
            Some(existing) => existing.weight = weight,
            None => self.raw_edges.push(RawEdge { a: lo, b: hi, weight }),
        }
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`Topology`].
    pub fn build(self) -> Topology {
        let node_count = self.nodes.len();

        // Expand each undirected edge into two half-edges, sorted by source
        // node for CSR construction.  The sort is stable so neighbour order
        // follows edge insertion order.
        let mut halves: Vec<(u32, u32, u32)> = Vec::with_capacity(self.raw_edges.len() * 2);
        for (e, raw) in self.raw_edges.iter().enumerate() {
            halves.push((raw.a, raw.b, e as u32));
            halves.push((raw.b, raw.a, e as u32));
        }
        halves.sort_by_key(|&(from, _, _)| from);

        let half_to:   Vec<u32> = halves.iter().map(|&(_, to, _)| to).collect();
        let half_edge: Vec<u32> = halves.iter().map(|&(_, _, e)| e).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for &(from, _, _) in &halves {
            node_out_start[from as usize + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, halves.len());

        let edge_ends:    Vec<(u32, u32)> = self.raw_edges.iter().map(|e| (e.a, e.b)).collect();
        let base_weights: Vec<f64>        = self.raw_edges.iter().map(|e| e.weight).collect();

        Topology {
            nodes: self.nodes,
            index: self.index,
            node_out_start,
            half_to,
            half_edge,
            edge_ends,
            weights: RwLock::new(base_weights.clone()),
            base_weights,
        }
    }
}

impl Default for TopologyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
