//! Unit tests for fleet-sim.

use std::sync::Arc;
use std::time::Duration;

use fleet_core::{IdSupplier, Location, SimConfig, SimRng, TaskId};
use fleet_tasks::{TaskBroker, TaskStatus};
use fleet_topology::{TopologyBuilder, warehouse_layout};

use crate::{CountingObserver, NoopObserver, SimBuilder, SimError};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn loc(n: u32) -> Location {
    Location(n)
}

fn config() -> SimConfig {
    SimConfig { iterations: 20, robot_count: 2, ..SimConfig::default() }
}

// ── World ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod world {
    use super::*;

    #[test]
    fn rejects_unknown_robot_location() {
        let err = SimBuilder::new(config(), warehouse_layout())
            .robot_at(loc(99))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SimError::UnknownLocation(l) if l == loc(99)));
    }

    #[test]
    fn rejects_unknown_task_location() {
        let mut sim = SimBuilder::new(config(), warehouse_layout()).build().unwrap();
        let err = sim.world_mut().new_task(loc(1), loc(13)).unwrap_err();
        assert!(matches!(err, SimError::UnknownLocation(l) if l == loc(13)));
        assert_eq!(sim.world().broker().pending_count(), 0);
    }

    #[test]
    fn default_placement_uses_robot_count() {
        let sim = SimBuilder::new(config(), warehouse_layout()).build().unwrap();
        let world = sim.world();
        assert_eq!(world.robots().len(), 2);
        assert!(world.robots().iter().all(|r| world.topology().contains(r.location)));
    }

    #[test]
    fn duplicate_task_is_reported_not_fatal() {
        let mut sim = SimBuilder::new(config(), warehouse_layout()).build().unwrap();
        let id = sim.world_mut().new_task(loc(1), loc(2)).unwrap();
        let dup = fleet_tasks::Task::new(id, loc(3), loc(4));
        assert!(!sim.world_mut().add_task(dup).unwrap());
    }

    #[test]
    fn congestion_lowers_weights_around_robots() {
        let sim = SimBuilder::new(config(), warehouse_layout())
            .robot_at(loc(1))
            .build()
            .unwrap();
        let world = sim.world();
        world.apply_congestion(2);
        assert_eq!(world.topology().weight(loc(1), loc(2)), Some(0.0));
        assert_eq!(world.topology().weight(loc(3), loc(4)), Some(1.0));
        world.topology().reset_weights();
        assert_eq!(world.topology().weight(loc(1), loc(2)), Some(1.0));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = SimConfig { feed_probability: 2.0, ..SimConfig::default() };
        let err = SimBuilder::new(cfg, warehouse_layout()).build().err().unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn seed_probability_outside_unit_range_is_rejected() {
        for p in [f64::NAN, -0.1, 1.5, f64::INFINITY] {
            let err = SimBuilder::new(config(), warehouse_layout())
                .seed_tasks(3, p)
                .build()
                .err()
                .unwrap();
            assert!(matches!(err, SimError::Config(_)), "p = {p}");
        }
    }

    #[test]
    fn empty_topology_is_rejected() {
        let err = SimBuilder::new(config(), TopologyBuilder::new().build()).build().err().unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }
}

// ── Task generation ───────────────────────────────────────────────────────────

#[cfg(test)]
mod generation {
    use super::*;
    use crate::{random_task, random_tasks};

    #[test]
    fn random_task_stays_on_topology() {
        let topo = warehouse_layout();
        let ids = IdSupplier::new();
        let mut rng = SimRng::new(7);
        for _ in 0..50 {
            let t = random_task(&ids, &topo, &mut rng).unwrap();
            assert!(topo.contains(t.origin) && topo.contains(t.destination));
            assert_eq!(t.status, TaskStatus::Unassigned);
        }
    }

    #[test]
    fn random_task_on_empty_topology_is_none() {
        let topo = TopologyBuilder::new().build();
        assert!(random_task(&IdSupplier::new(), &topo, &mut SimRng::new(1)).is_none());
    }

    #[test]
    fn random_tasks_respects_probability_extremes() {
        let topo = warehouse_layout();
        let ids = IdSupplier::new();
        let mut rng = SimRng::new(3);
        assert_eq!(random_tasks(8, 1.0, &ids, &topo, &mut rng).len(), 8);
        assert!(random_tasks(8, 0.0, &ids, &topo, &mut rng).is_empty());
    }

    #[test]
    fn random_tasks_have_unique_ids() {
        let topo = warehouse_layout();
        let ids = IdSupplier::new();
        let tasks = random_tasks(20, 1.0, &ids, &topo, &mut SimRng::new(9));
        let mut seen: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
        seen.dedup();
        assert_eq!(seen.len(), 20);
    }
}

// ── Serial driver ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod serial {
    use super::*;

    fn two_robot_scenario() -> crate::SerialSim {
        SimBuilder::new(config(), warehouse_layout())
            .robots_at(2, loc(1))
            .task(loc(1), loc(2))
            .task(loc(1), loc(6))
            .build()
            .unwrap()
    }

    #[test]
    fn two_robots_two_tasks() {
        let mut sim = two_robot_scenario();
        let mut obs = CountingObserver::new();

        sim.run_ticks(2, &mut obs).unwrap();
        let broker = sim.world().broker();
        assert_eq!(broker.pending_count(), 0, "both tasks claimed after two ticks");
        assert_eq!(broker.active_count(), 2);
        assert_eq!(broker.all_tasks().len(), 2);

        sim.run_ticks(2, &mut obs).unwrap();
        let broker = sim.world().broker();
        assert_eq!(broker.finished_count(), 2);
        assert_eq!(broker.active_count(), 0);
        assert!(sim.world().robots().iter().all(|r| r.is_idle()));

        assert_eq!(obs.pickups, 2);
        assert_eq!(obs.deliveries, 2);
        assert_eq!(obs.ticks, 4);
        assert_eq!(obs.total(), 8, "one trace per robot per tick");
    }

    #[test]
    fn robots_end_at_destinations() {
        let mut sim = two_robot_scenario();
        sim.run_ticks(4, &mut NoopObserver).unwrap();
        let mut ends: Vec<Location> = sim.world().robots().iter().map(|r| r.location).collect();
        ends.sort();
        assert_eq!(ends, vec![loc(2), loc(6)]);
    }

    #[test]
    fn run_stops_when_observer_done() {
        let mut sim = two_robot_scenario();
        let mut obs = CountingObserver::until_deliveries(1);
        sim.run(&mut obs).unwrap();
        // Both deliveries land in the same iteration.
        assert_eq!(sim.iteration(), 3);
        assert!(obs.final_tick.is_some());
    }

    #[test]
    fn run_until_idle_drains_seeded_work() {
        let mut sim = SimBuilder::new(config(), warehouse_layout())
            .seed_tasks(6, 1.0)
            .build()
            .unwrap();
        assert_eq!(sim.world().broker().pending_count(), 6);

        let ran = sim.run_until_idle(500, &mut NoopObserver).unwrap();
        assert!(ran > 0 && ran < 500);
        let broker = sim.world().broker();
        assert_eq!(broker.finished_count(), 6);
        assert_eq!(broker.pending_count() + broker.active_count(), 0);
    }

    #[test]
    fn same_seed_same_run() {
        let run = || {
            let mut sim = SimBuilder::new(config(), warehouse_layout())
                .seed_tasks(5, 0.8)
                .build()
                .unwrap();
            let mut obs = CountingObserver::new();
            sim.run(&mut obs).unwrap();
            let locations: Vec<Location> = sim.world().robots().iter().map(|r| r.location).collect();
            (obs, locations)
        };
        assert_eq!(run(), run());
    }

    /// Nodes 1-2 connected, 3 isolated.
    fn split_topology() -> fleet_topology::Topology {
        let mut b = TopologyBuilder::new();
        b.add_edge(loc(1), loc(2));
        b.add_node(loc(3));
        b.build()
    }

    #[test]
    fn unreachable_task_idles_robots_every_tick() {
        let mut sim = SimBuilder::new(config(), split_topology())
            .robots_at(2, loc(1))
            .task(loc(1), loc(3))
            .build()
            .unwrap();

        let mut obs = CountingObserver::new();
        sim.run_ticks(3, &mut obs).unwrap();
        assert_eq!(obs.idles, 3 * 2);
        assert_eq!(obs.total(), 3 * 2);
        assert_eq!(sim.world().broker().pending_count(), 1);
    }

    #[test]
    fn unreachable_head_does_not_starve_the_pool() {
        let mut sim = SimBuilder::new(config(), split_topology())
            .robot_at(loc(1))
            .task(loc(1), loc(3))
            .task(loc(1), loc(2))
            .build()
            .unwrap();

        let mut obs = CountingObserver::new();
        sim.run_ticks(50, &mut obs).unwrap();
        assert_eq!(obs.total(), 50);
        assert_eq!(obs.deliveries, 1);

        let broker = sim.world().broker();
        assert_eq!(broker.finished_count(), 1);
        assert_eq!(broker.pending_count(), 1);
        assert_eq!(broker.status_of(TaskId(0)), Some(TaskStatus::Unassigned));
        assert_eq!(broker.status_of(TaskId(1)), Some(TaskStatus::Completed));
    }

    #[test]
    fn foreign_completion_aborts_run() {
        let mut sim = SimBuilder::new(config(), warehouse_layout())
            .robot_at(loc(1))
            .task(loc(1), loc(2))
            .build()
            .unwrap();
        sim.run_ticks(2, &mut NoopObserver).unwrap();

        // Someone else completes the task the robot is carrying.
        sim.world_mut()
            .broker_mut()
            .task_update(TaskId(0), TaskStatus::Completed)
            .unwrap();

        let err = sim.run_ticks(1, &mut NoopObserver).unwrap_err();
        assert!(matches!(err, SimError::Agent(_)));
    }
}

// ── Concurrent driver ─────────────────────────────────────────────────────────

#[cfg(test)]
mod concurrent {
    use tokio::time::timeout;

    use fleet_agent::Trace;
    use fleet_core::{RobotId, Tick};

    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn five_robots_drain_fed_tasks() {
        let cfg = SimConfig {
            robot_count:      5,
            feed_probability: 0.3,
            feed_cap:         5,
            ..SimConfig::default()
        };
        let sim = SimBuilder::new(cfg, warehouse_layout()).build_concurrent().unwrap();
        let mut handle = sim.start(CountingObserver::new());

        timeout(Duration::from_secs(5), handle.run_until_drained())
            .await
            .expect("drained within the deadline")
            .unwrap();

        assert!(!handle.is_running());
        assert_eq!(handle.fed(), 5);
        assert_eq!(handle.broker().finished(), 5);
        assert_eq!(handle.broker().active() + handle.broker().pending(), 0);
        assert_eq!(handle.robots().len(), 5);

        let obs = handle.observer().unwrap();
        assert_eq!(obs.deliveries, 5);
        assert_eq!(obs.pickups, 5);
        assert!(obs.final_tick.is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn preloaded_tasks_are_each_delivered_once() {
        let cfg = SimConfig { robot_count: 4, feed_cap: 0, ..SimConfig::default() };
        let sim = SimBuilder::new(cfg, warehouse_layout())
            .seed_tasks(30, 1.0)
            .build_concurrent()
            .unwrap();
        let mut handle = sim.start(CountingObserver::new());

        timeout(Duration::from_secs(5), handle.run_until_drained_every(Duration::from_millis(1)))
            .await
            .expect("drained within the deadline")
            .unwrap();

        assert_eq!(handle.broker().finished(), 30);
        assert_eq!(handle.observer().unwrap().deliveries, 30);
        assert_eq!(handle.fed(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_is_idempotent() {
        let cfg = SimConfig { robot_count: 2, feed_cap: 0, ..SimConfig::default() };
        let sim = SimBuilder::new(cfg, warehouse_layout()).build_concurrent().unwrap();
        let mut handle = sim.start(NoopObserver);

        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.stop().await.unwrap();
        handle.stop().await.unwrap();
        assert!(!handle.is_running());
        assert_eq!(handle.robots().len(), 2);
        assert!(handle.robots().iter().all(|r| r.tick > Tick::ZERO));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn external_traces_reach_observer() {
        let cfg = SimConfig { robot_count: 0, feed_cap: 0, ..SimConfig::default() };
        let sim = SimBuilder::new(cfg, warehouse_layout()).build_concurrent().unwrap();
        let mut handle = sim.start(CountingObserver::new());

        let sender = handle.sender();
        let trace = Trace::Move {
            robot:     RobotId(7),
            source:    loc(1),
            target:    loc(2),
            timestamp: Tick(3),
        };
        assert!(sender.send(trace).await);
        handle.stop().await.unwrap();

        let obs = handle.take_observer().unwrap();
        assert_eq!(obs.moves, 1);
        assert_eq!(obs.final_tick, Some(Tick(3)));
        assert!(handle.observer().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn observer_done_stops_run() {
        let cfg = SimConfig { robot_count: 3, feed_cap: 0, ..SimConfig::default() };
        let sim = SimBuilder::new(cfg, warehouse_layout())
            .seed_tasks(10, 1.0)
            .build_concurrent()
            .unwrap();
        let mut handle = sim.start(CountingObserver::until_deliveries(1));

        timeout(Duration::from_secs(5), handle.run_until_drained())
            .await
            .expect("stopped within the deadline")
            .unwrap();

        assert!(handle.observer().unwrap().deliveries >= 1);
        let broker = handle.broker();
        assert_eq!(broker.finished() + broker.active() + broker.pending(), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn unreachable_head_does_not_block_delivery() {
        let cfg = SimConfig { robot_count: 2, feed_cap: 0, ..SimConfig::default() };
        let mut b = TopologyBuilder::new();
        b.add_edge(loc(1), loc(2));
        b.add_node(loc(3));
        let sim = SimBuilder::new(cfg, b.build())
            .robots_at(2, loc(1))
            .task(loc(1), loc(3))
            .task(loc(1), loc(2))
            .build_concurrent()
            .unwrap();
        let mut handle = sim.start(CountingObserver::until_deliveries(1));

        timeout(Duration::from_secs(5), handle.run_until_drained())
            .await
            .expect("delivered within the deadline")
            .unwrap();

        assert_eq!(handle.observer().unwrap().deliveries, 1);
        assert_eq!(handle.broker().status_of(TaskId(1)), Some(TaskStatus::Completed));
        assert_eq!(handle.broker().status_of(TaskId(0)), Some(TaskStatus::Unassigned));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn shared_topology_is_visible_to_units() {
        let topo = Arc::new(warehouse_layout());
        let cfg = SimConfig { robot_count: 1, feed_cap: 0, ..SimConfig::default() };
        let sim = SimBuilder::new(cfg, Arc::clone(&topo)).build_concurrent().unwrap();
        assert!(Arc::ptr_eq(sim.world().topology(), &topo));
        let mut handle = sim.start(NoopObserver);
        handle.stop().await.unwrap();
    }
}
