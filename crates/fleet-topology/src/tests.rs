//! Unit tests for fleet-topology.
//!
//! All tests use hand-crafted graphs or the reference warehouse.

#[cfg(test)]
mod helpers {
    use fleet_core::Location;
    use crate::{Topology, TopologyBuilder};

    pub fn loc(n: u32) -> Location {
        Location(n)
    }

    /// Small weighted graph:
    ///
    /// ```text
    ///   10 -- 11 -- 12
    ///   |            |
    ///   13 -------- 14
    /// ```
    ///
    /// Path 10→14 via 11,12 costs 30; via 13 costs 60.
    pub fn ring() -> Topology {
        let mut b = TopologyBuilder::new();
        b.add_weighted_edge(loc(10), loc(11), 10.0);
        b.add_weighted_edge(loc(11), loc(12), 10.0);
        b.add_weighted_edge(loc(12), loc(14), 10.0);
        b.add_weighted_edge(loc(10), loc(13), 50.0);
        b.add_weighted_edge(loc(13), loc(14), 10.0);
        b.build()
    }
}

// ── Builder & structure ───────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use super::helpers::{loc, ring};
    use crate::{TopologyBuilder, warehouse_layout};

    #[test]
    fn empty_build() {
        let topo = TopologyBuilder::new().build();
        assert_eq!(topo.node_count(), 0);
        assert_eq!(topo.edge_count(), 0);
        assert!(topo.is_empty());
    }

    #[test]
    fn edges_add_missing_nodes() {
        let topo = ring();
        assert_eq!(topo.node_count(), 5);
        assert_eq!(topo.edge_count(), 5);
        assert!(topo.contains(loc(13)));
        assert!(!topo.contains(loc(1)));
        assert!(topo.require(loc(1)).is_err());
    }

    #[test]
    fn duplicate_edge_keeps_last_weight() {
        let mut b = TopologyBuilder::new();
        b.add_weighted_edge(loc(1), loc(2), 3.0);
        b.add_weighted_edge(loc(2), loc(1), 7.0);
        let topo = b.build();
        assert_eq!(topo.edge_count(), 1);
        assert_eq!(topo.weight(loc(1), loc(2)), Some(7.0));
    }

    #[test]
    fn self_loop_ignored() {
        let mut b = TopologyBuilder::new();
        b.add_edge(loc(1), loc(1));
        let topo = b.build();
        assert_eq!(topo.edge_count(), 0);
        assert_eq!(topo.node_count(), 0);
    }

    #[test]
    fn warehouse_shape() {
        let topo = warehouse_layout();
        assert_eq!(topo.node_count(), 12);
        assert_eq!(topo.edge_count(), 16);
        let mut n1: Vec<_> = topo.neighbors(loc(1)).collect();
        n1.sort();
        assert_eq!(n1, vec![loc(2), loc(5), loc(6)]);
        assert_eq!(topo.degree(loc(2)), 4);
        assert_eq!(topo.degree(loc(12)), 2);
        assert_eq!(topo.neighbors(loc(99)).count(), 0);
    }

    #[test]
    fn undirected_weight_lookup() {
        let topo = ring();
        assert_eq!(topo.weight(loc(10), loc(13)), Some(50.0));
        assert_eq!(topo.weight(loc(13), loc(10)), Some(50.0));
        assert_eq!(topo.weight(loc(10), loc(14)), None);
    }
}

// ── Mutable weights & decay ───────────────────────────────────────────────────

#[cfg(test)]
mod weights {
    use super::helpers::loc;
    use crate::warehouse_layout;

    #[test]
    fn set_and_reset() {
        let topo = warehouse_layout();
        assert!(topo.set_weight(loc(5), loc(9), 4.0));
        assert_eq!(topo.weight(loc(9), loc(5)), Some(4.0));
        assert!(!topo.set_weight(loc(1), loc(12), 4.0));
        topo.reset_weights();
        assert_eq!(topo.weight(loc(5), loc(9)), Some(1.0));
    }

    #[test]
    fn decay_strongest_near_source() {
        let topo = warehouse_layout();
        topo.decay_from(loc(1), 3);
        // 1-2 loses 1 (from node 1) and 1/4 (from node 2's visit).
        assert_eq!(topo.weight(loc(1), loc(2)), Some(-0.25));
        // 2-5 is hit from both node 2 and node 5 at depth 2.
        assert_eq!(topo.weight(loc(2), loc(5)), Some(0.5));
        // 2-3 only from node 2.
        assert_eq!(topo.weight(loc(2), loc(3)), Some(0.75));
        // Outside the radius.
        assert_eq!(topo.weight(loc(3), loc(4)), Some(1.0));
    }

    #[test]
    fn decay_with_single_step_is_noop() {
        let topo = warehouse_layout();
        topo.decay_from(loc(1), 1);
        assert_eq!(topo.weight(loc(1), loc(2)), Some(1.0));
    }

    #[test]
    fn decay_from_unknown_location_is_noop() {
        let topo = warehouse_layout();
        topo.decay_from(loc(40), 3);
        assert_eq!(topo.weight(loc(1), loc(2)), Some(1.0));
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use super::helpers::{loc, ring};
    use crate::{BellmanFordRouter, DijkstraRouter, RouteError, Router, TopologyBuilder, warehouse_layout};

    #[test]
    fn same_node_is_empty_route() {
        let topo = warehouse_layout();
        assert!(BellmanFordRouter.shortest_path(&topo, loc(4), loc(4)).unwrap().is_empty());
        assert!(DijkstraRouter.shortest_path(&topo, loc(4), loc(4)).unwrap().is_empty());
    }

    #[test]
    fn path_excludes_start_includes_end() {
        let topo = warehouse_layout();
        let path = BellmanFordRouter.shortest_path(&topo, loc(1), loc(2)).unwrap();
        assert_eq!(path, vec![loc(2)]);
        let path = BellmanFordRouter.shortest_path(&topo, loc(1), loc(6)).unwrap();
        assert_eq!(path, vec![loc(6)]);
    }

    #[test]
    fn cheapest_not_fewest_hops() {
        let topo = ring();
        let path = BellmanFordRouter.shortest_path(&topo, loc(10), loc(14)).unwrap();
        assert_eq!(path, vec![loc(11), loc(12), loc(14)]);
        let path = DijkstraRouter.shortest_path(&topo, loc(10), loc(14)).unwrap();
        assert_eq!(path, vec![loc(11), loc(12), loc(14)]);
    }

    #[test]
    fn routers_agree_on_hop_count_in_warehouse() {
        let topo = warehouse_layout();
        for &a in topo.nodes() {
            for &b in topo.nodes() {
                let bf = BellmanFordRouter.shortest_path(&topo, a, b).unwrap();
                let dj = DijkstraRouter.shortest_path(&topo, a, b).unwrap();
                assert_eq!(bf.len(), dj.len(), "{a} -> {b}");
                assert_eq!(bf.last().copied().unwrap_or(a), b);
            }
        }
    }

    #[test]
    fn consecutive_hops_are_adjacent() {
        let topo = warehouse_layout();
        let path = BellmanFordRouter.shortest_path(&topo, loc(3), loc(11)).unwrap();
        let mut cur = loc(3);
        for &next in &path {
            assert!(topo.neighbors(cur).any(|n| n == next), "{cur} -> {next}");
            cur = next;
        }
        assert_eq!(cur, loc(11));
    }

    #[test]
    fn weight_change_reroutes() {
        let topo = ring();
        topo.set_weight(loc(11), loc(12), 100.0);
        let path = BellmanFordRouter.shortest_path(&topo, loc(10), loc(14)).unwrap();
        assert_eq!(path, vec![loc(13), loc(14)]);
    }

    #[test]
    fn disconnected_is_unreachable() {
        let mut b = TopologyBuilder::new();
        b.add_edge(loc(1), loc(2));
        b.add_edge(loc(3), loc(4));
        let topo = b.build();
        assert_eq!(
            BellmanFordRouter.shortest_path(&topo, loc(1), loc(4)),
            Err(RouteError::Unreachable { from: loc(1), to: loc(4) })
        );
        assert_eq!(
            DijkstraRouter.shortest_path(&topo, loc(1), loc(4)),
            Err(RouteError::Unreachable { from: loc(1), to: loc(4) })
        );
    }

    #[test]
    fn unknown_location_rejected() {
        let topo = warehouse_layout();
        assert_eq!(
            BellmanFordRouter.shortest_path(&topo, loc(1), loc(77)),
            Err(RouteError::UnknownLocation(loc(77)))
        );
    }

    #[test]
    fn negative_edge_is_negative_cycle_for_bellman_ford() {
        let topo = warehouse_layout();
        topo.decay_from(loc(1), 3);
        assert_eq!(
            BellmanFordRouter.shortest_path(&topo, loc(3), loc(9)),
            Err(RouteError::NegativeCycle { from: loc(3) })
        );
    }

    #[test]
    fn negative_edge_rejected_by_dijkstra() {
        let topo = ring();
        topo.set_weight(loc(10), loc(11), -1.0);
        assert!(matches!(
            DijkstraRouter.shortest_path(&topo, loc(10), loc(14)),
            Err(RouteError::NegativeWeight { .. })
        ));
    }

    #[test]
    fn negative_cycle_unreachable_from_source_is_ignored() {
        let mut b = TopologyBuilder::new();
        b.add_edge(loc(1), loc(2));
        b.add_weighted_edge(loc(3), loc(4), -5.0);
        let topo = b.build();
        assert_eq!(BellmanFordRouter.shortest_path(&topo, loc(1), loc(2)).unwrap(), vec![loc(2)]);
    }
}
