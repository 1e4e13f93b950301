//! The `TaskBroker` trait, the contract shared by both brokers.

use fleet_core::TaskId;

use crate::{BrokerResult, Task, TaskStatus};

/// Owner of the task lifecycle and arbiter of claims.
///
/// Mutating methods take `&mut self`.  The concurrent broker
/// ([`SharedBroker`](crate::SharedBroker)) is a cheap clonable handle, so each
/// robot unit owns its own handle and still sees one shared set of pools.
///
/// # Claim protocol
///
/// Claiming is deliberately two calls: [`next_task`](Self::next_task) peeks,
/// [`claim`](Self::claim) commits.  Another robot may claim the same task in
/// between; the loser receives [`BrokerError::ClaimConflict`] and simply
/// tries again next tick.
///
/// [`BrokerError::ClaimConflict`]: crate::BrokerError::ClaimConflict
pub trait TaskBroker {
    /// Insert `task` into the pending pool.
    ///
    /// Returns `false` (and changes nothing) if the task is already
    /// `Completed` or if its ID is tracked in any pool.
    fn add_task(&mut self, task: Task) -> bool;

    /// Add every task; `true` iff all were accepted.  A rejected task does
    /// not stop the rest from being added.
    fn add_tasks(&mut self, tasks: Vec<Task>) -> bool {
        let mut all = true;
        for task in tasks {
            all &= self.add_task(task);
        }
        all
    }

    /// Peek at the pending task the selection policy offers next.
    ///
    /// Does not move the task; `None` when nothing is pending.
    fn next_task(&mut self) -> Option<Task>;

    /// Up to `n` pending tasks in priority order (oldest first).
    fn tasks(&self, n: usize) -> Vec<Task>;

    /// Apply a lifecycle transition.
    ///
    /// - `Assigned`: pending → active, else `NotFound`.
    /// - `Completed`: active → archive, else `InvalidTransition`.
    /// - `Unassigned`: always `InvalidTransition`.
    fn task_update(&mut self, id: TaskId, status: TaskStatus) -> BrokerResult<()>;

    /// Atomically move `id` from pending to active and return it.
    ///
    /// Fails with `ClaimConflict` when the task is no longer pending.
    fn claim(&mut self, id: TaskId) -> BrokerResult<Task>;

    /// `true` iff the pending pool is non-empty.
    fn has_tasks(&self) -> bool;

    /// Snapshot of pending and active tasks (archive excluded).
    fn all_tasks(&self) -> Vec<Task>;

    fn pending_count(&self) -> usize;

    fn active_count(&self) -> usize;

    fn finished_count(&self) -> usize;
}
