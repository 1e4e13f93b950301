//! `TaskPool<S>`: single-threaded broker over three ID-keyed maps.

use std::collections::HashMap;

use tracing::{debug, trace};

use fleet_core::TaskId;

use crate::{BrokerError, BrokerResult, OldestFirst, Task, TaskBroker, TaskSelector, TaskStatus};

/// Pending, active and archived tasks, each keyed by ID.
///
/// Every tracked ID lives in exactly one map, and each task's `status`
/// matches the map it lives in.
#[derive(Debug)]
pub struct TaskPool<S = OldestFirst> {
    unassigned: HashMap<TaskId, Task>,
    active:     HashMap<TaskId, Task>,
    archive:    HashMap<TaskId, Task>,
    selector:   S,
}

impl TaskPool<OldestFirst> {
    pub fn new() -> Self {
        Self::with_selector(OldestFirst)
    }
}

impl Default for TaskPool<OldestFirst> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TaskSelector> TaskPool<S> {
    pub fn with_selector(selector: S) -> Self {
        Self {
            unassigned: HashMap::new(),
            active:     HashMap::new(),
            archive:    HashMap::new(),
            selector,
        }
    }

    /// Status of a tracked task, `None` if the ID is unknown.
    pub fn status_of(&self, id: TaskId) -> Option<TaskStatus> {
        if self.unassigned.contains_key(&id) {
            Some(TaskStatus::Unassigned)
        } else if self.active.contains_key(&id) {
            Some(TaskStatus::Assigned)
        } else if self.archive.contains_key(&id) {
            Some(TaskStatus::Completed)
        } else {
            None
        }
    }

    /// Look up a task in any pool.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.unassigned
            .get(&id)
            .or_else(|| self.active.get(&id))
            .or_else(|| self.archive.get(&id))
    }

    /// Archived tasks in completion-agnostic ID order.
    pub fn completed(&self) -> Vec<Task> {
        let mut done: Vec<Task> = self.archive.values().cloned().collect();
        done.sort_by_key(|t| t.id);
        done
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn pending_sorted(&self) -> Vec<&Task> {
        sorted_by_priority(&self.unassigned)
    }

    fn assign(&mut self, id: TaskId) -> Option<Task> {
        let mut task = self.unassigned.remove(&id)?;
        task.status = TaskStatus::Assigned;
        self.active.insert(id, task.clone());
        trace!(task = %id, "task assigned");
        Some(task)
    }

    fn complete(&mut self, id: TaskId) -> BrokerResult<()> {
        let Some(mut task) = self.active.remove(&id) else {
            return Err(BrokerError::InvalidTransition {
                id,
                from: self.status_of(id),
                to:   TaskStatus::Completed,
            });
        };
        task.status = TaskStatus::Completed;
        self.archive.insert(id, task);
        debug!(task = %id, finished = self.archive.len(), "task completed");
        Ok(())
    }
}

impl<S: TaskSelector> TaskBroker for TaskPool<S> {
    fn add_task(&mut self, mut task: Task) -> bool {
        if task.status == TaskStatus::Completed || self.status_of(task.id).is_some() {
            debug!(task = %task.id, status = %task.status, "task rejected");
            return false;
        }
        task.status = TaskStatus::Unassigned;
        trace!(task = %task.id, origin = %task.origin, destination = %task.destination, "task added");
        self.unassigned.insert(task.id, task);
        true
    }

    fn next_task(&mut self) -> Option<Task> {
        // Field-level borrow: the selector needs `&mut` alongside the pending view.
        let pending = sorted_by_priority(&self.unassigned);
        let idx = self.selector.select(&pending)?;
        pending.get(idx).map(|t| (*t).clone())
    }

    fn tasks(&self, n: usize) -> Vec<Task> {
        self.pending_sorted().into_iter().take(n).cloned().collect()
    }

    fn task_update(&mut self, id: TaskId, status: TaskStatus) -> BrokerResult<()> {
        match status {
            TaskStatus::Assigned => self
                .assign(id)
                .map(|_| ())
                .ok_or(BrokerError::NotFound(id)),
            TaskStatus::Completed => self.complete(id),
            TaskStatus::Unassigned => Err(BrokerError::InvalidTransition {
                id,
                from: self.status_of(id),
                to:   TaskStatus::Unassigned,
            }),
        }
    }

    fn claim(&mut self, id: TaskId) -> BrokerResult<Task> {
        self.assign(id).ok_or(BrokerError::ClaimConflict(id))
    }

    fn has_tasks(&self) -> bool {
        !self.unassigned.is_empty()
    }

    fn all_tasks(&self) -> Vec<Task> {
        let mut all: Vec<Task> = self
            .unassigned
            .values()
            .chain(self.active.values())
            .cloned()
            .collect();
        all.sort_by_key(|t| t.id);
        all
    }

    fn pending_count(&self) -> usize {
        self.unassigned.len()
    }

    fn active_count(&self) -> usize {
        self.active.len()
    }

    fn finished_count(&self) -> usize {
        self.archive.len()
    }
}

/// Pending tasks, oldest first, ties by ID.
fn sorted_by_priority(pool: &HashMap<TaskId, Task>) -> Vec<&Task> {
    let mut pending: Vec<&Task> = pool.values().collect();
    pending.sort_by(|a, b| a.priority_cmp(b));
    pending
}
