//! `SharedBroker<S>`: a clonable, thread-safe handle to one `TaskPool`.
//!
//! Every operation takes the lock once, so each is atomic with respect to
//! the others.  In particular two concurrent `claim`s of the same ID resolve
//! to exactly one success and one `ClaimConflict`.

use std::sync::Arc;

use parking_lot::Mutex;

use fleet_core::TaskId;

use crate::{BrokerResult, OldestFirst, Task, TaskBroker, TaskPool, TaskSelector, TaskStatus};

pub struct SharedBroker<S = OldestFirst> {
    inner: Arc<Mutex<TaskPool<S>>>,
}

// Manual impl: `S` itself need not be `Clone`.
impl<S> Clone for SharedBroker<S> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl SharedBroker<OldestFirst> {
    pub fn new() -> Self {
        Self::from_pool(TaskPool::new())
    }
}

impl Default for SharedBroker<OldestFirst> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TaskSelector> SharedBroker<S> {
    pub fn with_selector(selector: S) -> Self {
        Self::from_pool(TaskPool::with_selector(selector))
    }

    /// Wrap an existing pool, e.g. one pre-seeded by a serial setup phase.
    pub fn from_pool(pool: TaskPool<S>) -> Self {
        Self { inner: Arc::new(Mutex::new(pool)) }
    }

    /// Run `f` with exclusive access to the pool.
    pub fn with_pool<R>(&self, f: impl FnOnce(&mut TaskPool<S>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    // Query helpers that do not need a `&mut` handle.

    pub fn add(&self, task: Task) -> bool {
        self.inner.lock().add_task(task)
    }

    pub fn status_of(&self, id: TaskId) -> Option<TaskStatus> {
        self.inner.lock().status_of(id)
    }

    pub fn pending(&self) -> usize {
        self.inner.lock().pending_count()
    }

    pub fn active(&self) -> usize {
        self.inner.lock().active_count()
    }

    pub fn finished(&self) -> usize {
        self.inner.lock().finished_count()
    }

    /// `true` while any task is pending or in flight.
    pub fn has_outstanding(&self) -> bool {
        let pool = self.inner.lock();
        pool.has_tasks() || pool.active_count() > 0
    }
}

impl<S: TaskSelector> TaskBroker for SharedBroker<S> {
    fn add_task(&mut self, task: Task) -> bool {
        self.inner.lock().add_task(task)
    }

    fn add_tasks(&mut self, tasks: Vec<Task>) -> bool {
        self.inner.lock().add_tasks(tasks)
    }

    fn next_task(&mut self) -> Option<Task> {
        self.inner.lock().next_task()
    }

    fn tasks(&self, n: usize) -> Vec<Task> {
        self.inner.lock().tasks(n)
    }

    fn task_update(&mut self, id: TaskId, status: TaskStatus) -> BrokerResult<()> {
        self.inner.lock().task_update(id, status)
    }

    fn claim(&mut self, id: TaskId) -> BrokerResult<Task> {
        self.inner.lock().claim(id)
    }

    fn has_tasks(&self) -> bool {
        self.inner.lock().has_tasks()
    }

    fn all_tasks(&self) -> Vec<Task> {
        self.inner.lock().all_tasks()
    }

    fn pending_count(&self) -> usize {
        self.inner.lock().pending_count()
    }

    fn active_count(&self) -> usize {
        self.inner.lock().active_count()
    }

    fn finished_count(&self) -> usize {
        self.inner.lock().finished_count()
    }
}

impl<S> std::fmt::Debug for SharedBroker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedBroker")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish_non_exhaustive()
    }
}
