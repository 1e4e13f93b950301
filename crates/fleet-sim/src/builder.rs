//! Fluent builder for both drivers.

use std::sync::Arc;

use fleet_core::{Location, SimConfig, SimRng};
use fleet_tasks::{OldestFirst, SharedBroker, TaskBroker, TaskPool, TaskSelector};
use fleet_topology::{BellmanFordRouter, Router, Topology};

use crate::feeder::random_tasks;
use crate::{ConcurrentSim, SerialSim, SimError, SimResult, World};

/// Fluent builder for [`SerialSim`] and [`ConcurrentSim`].
///
/// # Optional inputs (have defaults)
///
/// | Method                  | Default                                         |
/// |-------------------------|-------------------------------------------------|
/// | `.router(r)`            | `BellmanFordRouter`                             |
/// | `.selector(s)`          | `OldestFirst`                                   |
/// | `.robot_at(loc)`        | `config.robot_count` robots on random nodes     |
/// | `.task(origin, dest)`   | no tasks                                        |
/// | `.seed_tasks(n, p)`     | no random tasks                                 |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, warehouse_layout())
///     .robots_at(2, Location(1))
///     .task(Location(1), Location(2))
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<S = OldestFirst, R = BellmanFordRouter> {
    config:     SimConfig,
    topology:   Arc<Topology>,
    router:     R,
    selector:   S,
    robots:     Vec<Location>,
    tasks:      Vec<(Location, Location)>,
    seed_tasks: Option<(usize, f64)>,
}

impl SimBuilder<OldestFirst, BellmanFordRouter> {
    pub fn new(config: SimConfig, topology: impl Into<Arc<Topology>>) -> Self {
        Self {
            config,
            topology:   topology.into(),
            router:     BellmanFordRouter,
            selector:   OldestFirst,
            robots:     Vec::new(),
            tasks:      Vec::new(),
            seed_tasks: None,
        }
    }
}

impl<S: TaskSelector, R: Router> SimBuilder<S, R> {
    pub fn router<R2: Router>(self, router: R2) -> SimBuilder<S, R2> {
        SimBuilder {
            config:     self.config,
            topology:   self.topology,
            router,
            selector:   self.selector,
            robots:     self.robots,
            tasks:      self.tasks,
            seed_tasks: self.seed_tasks,
        }
    }

    pub fn selector<S2: TaskSelector>(self, selector: S2) -> SimBuilder<S2, R> {
        SimBuilder {
            config:     self.config,
            topology:   self.topology,
            router:     self.router,
            selector,
            robots:     self.robots,
            tasks:      self.tasks,
            seed_tasks: self.seed_tasks,
        }
    }

    /// Place one robot.  Once any robot is placed explicitly,
    /// `config.robot_count` is ignored.
    pub fn robot_at(mut self, location: Location) -> Self {
        self.robots.push(location);
        self
    }

    pub fn robots_at(mut self, n: usize, location: Location) -> Self {
        self.robots.extend(std::iter::repeat_n(location, n));
        self
    }

    pub fn task(mut self, origin: Location, destination: Location) -> Self {
        self.tasks.push((origin, destination));
        self
    }

    /// Add up to `n` random tasks at build time, each with probability `p`.
    pub fn seed_tasks(mut self, n: usize, p: f64) -> Self {
        self.seed_tasks = Some((n, p));
        self
    }

    /// Build the single-threaded driver.
    pub fn build(self) -> SimResult<SerialSim<S, R>> {
        let (config, world, rng) = self.assemble(TaskPool::with_selector)?;
        Ok(SerialSim::new(config, world, rng))
    }

    /// Build the tokio-based driver.  Start it from inside a runtime.
    pub fn build_concurrent(self) -> SimResult<ConcurrentSim<S, R>>
    where
        R: Clone + 'static,
    {
        let (config, world, rng) =
            self.assemble(|s| SharedBroker::from_pool(TaskPool::with_selector(s)))?;
        Ok(ConcurrentSim::new(config, world, rng))
    }

    fn assemble<B: TaskBroker>(
        self,
        broker: impl FnOnce(S) -> B,
    ) -> SimResult<(SimConfig, World<B, R>, SimRng)> {
        self.config.validate()?;
        if self.topology.is_empty() {
            return Err(SimError::Config("topology has no nodes".into()));
        }
        if let Some((_, p)) = self.seed_tasks {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimError::Config(format!(
                    "seed task probability must be within [0, 1], got {p}"
                )));
            }
        }

        let mut rng = SimRng::new(self.config.seed);
        let mut world = World::new(self.topology, self.router, broker(self.selector));

        // ── Robots ────────────────────────────────────────────────────────
        if self.robots.is_empty() {
            let mut placement = rng.child(0);
            for _ in 0..self.config.robot_count {
                let nodes = world.topology().nodes();
                let Some(&loc) = placement.choose(nodes) else { break };
                world.add_robot(loc)?;
            }
        } else {
            for loc in self.robots {
                world.add_robot(loc)?;
            }
        }

        // ── Tasks ─────────────────────────────────────────────────────────
        for (origin, destination) in self.tasks {
            world.new_task(origin, destination)?;
        }
        if let Some((n, p)) = self.seed_tasks {
            let mut gen_rng = rng.child(1);
            let tasks = random_tasks(n, p, world.ids(), world.topology(), &mut gen_rng);
            for task in tasks {
                world.add_task(task)?;
            }
        }

        Ok((self.config, world, rng))
    }
}
