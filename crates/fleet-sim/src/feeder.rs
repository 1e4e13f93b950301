//! Random task generation and the periodic feeder unit.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use fleet_core::{IdSupplier, SimConfig, SimRng};
use fleet_tasks::{Task, TaskBroker};
use fleet_topology::Topology;

/// A task between two uniformly chosen nodes.  `None` on an empty topology.
///
/// Origin and destination may coincide.
pub fn random_task(ids: &IdSupplier, topology: &Topology, rng: &mut SimRng) -> Option<Task> {
    let nodes = topology.nodes();
    let origin = *rng.choose(nodes)?;
    let destination = *rng.choose(nodes)?;
    Some(Task::new(ids.next_task(), origin, destination))
}

/// Up to `n` random tasks, each drawn with probability `p`.
pub fn random_tasks(
    n:        usize,
    p:        f64,
    ids:      &IdSupplier,
    topology: &Topology,
    rng:      &mut SimRng,
) -> Vec<Task> {
    let mut tasks = Vec::new();
    for _ in 0..n {
        if rng.gen_bool(p) {
            tasks.extend(random_task(ids, topology, rng));
        }
    }
    tasks
}

/// Adds random tasks on a timer until its cap is reached.
///
/// Each interval it adds one task with probability `probability`.
#[derive(Debug)]
pub struct TaskFeeder {
    probability: f64,
    cap:         usize,
    period:      Duration,
    rng:         SimRng,
    ids:         Arc<IdSupplier>,
    topology:    Arc<Topology>,
}

impl TaskFeeder {
    pub fn new(config: &SimConfig, rng: SimRng, ids: Arc<IdSupplier>, topology: Arc<Topology>) -> Self {
        Self {
            probability: config.feed_probability,
            cap:         config.feed_cap,
            period:      config.feed_interval(),
            rng,
            ids,
            topology,
        }
    }

    /// Feed `broker` until `cap` tasks were accepted or `token` is cancelled.
    ///
    /// Returns the number of tasks added.
    pub async fn run<B: TaskBroker>(mut self, mut broker: B, token: CancellationToken) -> usize {
        let mut added = 0usize;
        if self.cap == 0 || self.topology.is_empty() {
            return added;
        }

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while added < self.cap {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    if !self.rng.gen_bool(self.probability) {
                        continue;
                    }
                    let Some(task) = random_task(&self.ids, &self.topology, &mut self.rng) else {
                        break;
                    };
                    let id = task.id;
                    if broker.add_task(task) {
                        added += 1;
                        debug!(task = %id, added, cap = self.cap, "feeder added task");
                    }
                }
            }
        }
        info!(added, "task feeder finished");
        added
    }
}
