//! The concurrent driver: one tokio task per robot.
//!
//! # Units
//!
//! ```text
//!   root token ─┬─ child ─► robot unit × N ──┐
//!               └─ child ─► task feeder      │ Trace (bounded mpsc)
//!                                            ▼
//!   drain token ───────────► observer unit ──► SimObserver
//! ```
//!
//! Robot units loop `run → send trace → yield` until their token is
//! cancelled.  The broker lock is the only point where units contend.
//! `stop` cancels the root token, waits for robots and the feeder, then lets
//! the observer drain whatever is still queued.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use fleet_agent::{AgentResult, Navigator, Robot, Trace};
use fleet_core::{SimConfig, SimRng, Tick};
use fleet_tasks::{OldestFirst, SharedBroker, TaskSelector};
use fleet_topology::{BellmanFordRouter, Router};

use crate::feeder::TaskFeeder;
use crate::{SimError, SimObserver, SimResult, World};

// ── TraceSender ───────────────────────────────────────────────────────────────

/// Producer side of the observer channel.
///
/// Robot units hold one each; [`SimHandle::sender`] hands out more for
/// external producers.
#[derive(Clone, Debug)]
pub struct TraceSender(mpsc::Sender<Trace>);

impl TraceSender {
    /// Wait for channel capacity and post `trace`.  `false` once the
    /// observer has shut down.
    pub async fn send(&self, trace: Trace) -> bool {
        self.0.send(trace).await.is_ok()
    }

    /// Post without waiting.  `false` if the channel is full or closed.
    pub fn try_send(&self, trace: Trace) -> bool {
        self.0.try_send(trace).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}

// ── ConcurrentSim ─────────────────────────────────────────────────────────────

/// A configured but not yet started concurrent run.
///
/// Create via [`SimBuilder::build_concurrent`][crate::SimBuilder::build_concurrent].
pub struct ConcurrentSim<S = OldestFirst, R = BellmanFordRouter> {
    pub config: SimConfig,
    world:      World<SharedBroker<S>, R>,
    rng:        SimRng,
}

impl<S: TaskSelector, R: Router + Clone + 'static> ConcurrentSim<S, R> {
    pub(crate) fn new(config: SimConfig, world: World<SharedBroker<S>, R>, rng: SimRng) -> Self {
        Self { config, world, rng }
    }

    #[inline]
    pub fn world(&self) -> &World<SharedBroker<S>, R> {
        &self.world
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut World<SharedBroker<S>, R> {
        &mut self.world
    }

    /// Spawn every unit and return the handle that controls them.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn start<O>(mut self, observer: O) -> SimHandle<O, S>
    where
        O: SimObserver + Send + 'static,
    {
        let (navigator, broker, robots, ids) = self.world.into_parts();
        let topology = navigator.topology().clone();

        let root = CancellationToken::new();
        let drain = CancellationToken::new();
        let done = CancellationToken::new();
        let (tx, rx) = mpsc::channel(self.config.trace_channel_capacity);
        let sender = TraceSender(tx);

        let observer_task = tokio::spawn(observer_unit(observer, rx, drain.clone(), done.clone()));

        let robot_count = robots.len();
        let units = robots
            .into_iter()
            .map(|robot| {
                tokio::spawn(robot_unit(
                    robot,
                    navigator.clone(),
                    broker.clone(),
                    sender.clone(),
                    root.child_token(),
                    root.clone(),
                ))
            })
            .collect();

        let feeder = TaskFeeder::new(&self.config, self.rng.child(1), ids, topology);
        let feeder = tokio::spawn(feeder.run(broker.clone(), root.child_token()));

        info!(robots = robot_count, pending = broker.pending(), "concurrent simulation started");

        SimHandle {
            broker,
            sender,
            root,
            drain,
            done,
            poll: self.config.poll_interval(),
            units,
            feeder: Some(feeder),
            observer_task: Some(observer_task),
            robots: Vec::with_capacity(robot_count),
            observer: None,
            fed: 0,
            stopped: false,
        }
    }
}

// ── SimHandle ─────────────────────────────────────────────────────────────────

/// Controls a running concurrent simulation.
///
/// Dropping the handle cancels every unit without waiting for them.
pub struct SimHandle<O, S = OldestFirst> {
    broker:        SharedBroker<S>,
    sender:        TraceSender,
    root:          CancellationToken,
    drain:         CancellationToken,
    done:          CancellationToken,
    poll:          Duration,
    units:         Vec<JoinHandle<AgentResult<Robot>>>,
    feeder:        Option<JoinHandle<usize>>,
    observer_task: Option<JoinHandle<O>>,

    // Filled in by `stop`.
    robots:        Vec<Robot>,
    observer:      Option<O>,
    fed:           usize,
    stopped:       bool,
}

impl<O: SimObserver + Send + 'static, S: TaskSelector> SimHandle<O, S> {
    #[inline]
    pub fn broker(&self) -> &SharedBroker<S> {
        &self.broker
    }

    /// Another producer handle onto the observer channel.
    pub fn sender(&self) -> TraceSender {
        self.sender.clone()
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        !self.stopped
    }

    /// `true` while the feeder unit is still adding tasks.
    pub fn is_feeding(&self) -> bool {
        self.feeder.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Poll until no task is pending, none is in flight and the feeder has
    /// finished, or until the observer is done or a robot failed.  Then stop.
    pub async fn run_until_drained(&mut self) -> SimResult<()> {
        let poll = self.poll;
        self.run_until_drained_every(poll).await
    }

    /// [`run_until_drained`](Self::run_until_drained) with an explicit poll
    /// interval.
    pub async fn run_until_drained_every(&mut self, poll: Duration) -> SimResult<()> {
        let mut ticker = interval(poll);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !self.stopped {
            tokio::select! {
                _ = self.done.cancelled() => {
                    debug!("observer reported done");
                    break;
                }
                _ = self.root.cancelled() => break,
                _ = ticker.tick() => {
                    // Feeder first: a task it adds before finishing is then
                    // visible to the outstanding check.
                    let feeding = self.is_feeding();
                    if !feeding && !self.broker.has_outstanding() {
                        break;
                    }
                }
            }
        }
        self.stop().await
    }

    /// Cancel every unit and wait for them.
    ///
    /// The first call reports the first unit failure, if any.  Later calls
    /// return `Ok(())` without doing anything.
    pub async fn stop(&mut self) -> SimResult<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        self.root.cancel();

        let mut failure = None;
        for unit in self.units.drain(..) {
            match unit.await {
                Ok(Ok(robot)) => self.robots.push(robot),
                Ok(Err(e)) => keep_first(&mut failure, e.into()),
                Err(e) => keep_first(&mut failure, e.into()),
            }
        }
        if let Some(feeder) = self.feeder.take() {
            match feeder.await {
                Ok(n) => self.fed = n,
                Err(e) => keep_first(&mut failure, e.into()),
            }
        }

        self.drain.cancel();
        if let Some(task) = self.observer_task.take() {
            match task.await {
                Ok(observer) => self.observer = Some(observer),
                Err(e) => keep_first(&mut failure, e.into()),
            }
        }

        info!(
            finished = self.broker.finished(),
            active = self.broker.active(),
            pending = self.broker.pending(),
            fed = self.fed,
            "concurrent simulation stopped"
        );
        failure.map_or(Ok(()), Err)
    }

    // ── Results (available after `stop`) ──────────────────────────────────

    /// Robots that exited cleanly, in registry order.
    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn observer(&self) -> Option<&O> {
        self.observer.as_ref()
    }

    pub fn take_observer(&mut self) -> Option<O> {
        self.observer.take()
    }

    /// Tasks the feeder added.
    pub fn fed(&self) -> usize {
        self.fed
    }
}

impl<O, S> Drop for SimHandle<O, S> {
    fn drop(&mut self) {
        self.root.cancel();
        self.drain.cancel();
    }
}

fn keep_first(slot: &mut Option<SimError>, e: SimError) {
    if slot.is_none() {
        *slot = Some(e);
    }
}

// ── Units ─────────────────────────────────────────────────────────────────────

async fn robot_unit<S, R>(
    mut robot:  Robot,
    navigator:  Navigator<R>,
    mut broker: SharedBroker<S>,
    sender:     TraceSender,
    token:      CancellationToken,
    root:       CancellationToken,
) -> AgentResult<Robot>
where
    S: TaskSelector,
    R: Router,
{
    while !token.is_cancelled() {
        match robot.run(&navigator, &mut broker) {
            // The observer unit outlives every robot unit.
            Ok(trace) => {
                if !sender.send(trace).await {
                    break;
                }
            }
            Err(e) => {
                error!(robot = %robot.id, error = %e, "robot failed, cancelling simulation");
                root.cancel();
                return Err(e);
            }
        }
        tokio::task::yield_now().await;
    }
    debug!(robot = %robot.id, tick = %robot.tick, location = %robot.location, "robot unit stopped");
    Ok(robot)
}

async fn observer_unit<O: SimObserver>(
    mut observer: O,
    mut rx:       mpsc::Receiver<Trace>,
    drain:        CancellationToken,
    done:         CancellationToken,
) -> O {
    let mut last = Tick::ZERO;
    loop {
        tokio::select! {
            biased;
            msg = rx.recv() => match msg {
                Some(trace) => observe(&mut observer, &trace, &mut last, &done),
                None => break,
            },
            _ = drain.cancelled() => {
                while let Ok(trace) = rx.try_recv() {
                    observe(&mut observer, &trace, &mut last, &done);
                }
                break;
            }
        }
    }
    observer.on_sim_end(last);
    observer
}

fn observe<O: SimObserver>(observer: &mut O, trace: &Trace, last: &mut Tick, done: &CancellationToken) {
    observer.on_trace(trace);
    *last = (*last).max(trace.timestamp());
    if !done.is_cancelled() && observer.is_done() {
        done.cancel();
    }
}
