//! Action chains.
//!
//! A chain is a singly linked list of steps that each own their successor.
//! Chains are built whole by the planner, executed one step per tick, and end
//! in [`Action::Null`].

use std::collections::VecDeque;

use fleet_core::{Location, TaskId};

/// Progress of a single [`MoveAction`].
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum ActionStatus {
    #[default]
    Pending,
    Active,
    Ended,
}

/// Walk from `start` to `end` one hop per tick.
///
/// `path` holds the hops still to take: it excludes the robot's current
/// position and ends with `end` (empty when `start == end`).
#[derive(Clone, PartialEq, Debug)]
pub struct MoveAction {
    pub start:  Location,
    pub end:    Location,
    pub path:   VecDeque<Location>,
    pub status: ActionStatus,
}

impl MoveAction {
    pub fn new(start: Location, end: Location, path: impl Into<VecDeque<Location>>) -> Self {
        Self {
            start,
            end,
            path: path.into(),
            status: ActionStatus::Pending,
        }
    }

    /// Number of hops still to take.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.path.len()
    }
}

/// One step of a plan plus everything after it.
#[derive(Clone, PartialEq, Debug, Default)]
pub enum Action {
    Move {
        step:  MoveAction,
        child: Box<Action>,
    },
    /// Pick up `task` at `here`.
    BeginTask {
        task:  TaskId,
        here:  Location,
        child: Box<Action>,
    },
    /// Drop off `task` at `here` and report it completed.
    EndTask {
        task:  TaskId,
        here:  Location,
        child: Box<Action>,
    },
    /// Terminal step; a robot holding `Null` is idle.
    #[default]
    Null,
}

impl Action {
    pub fn moving(step: MoveAction, child: Action) -> Self {
        Action::Move { step, child: Box::new(child) }
    }

    pub fn begin(task: TaskId, here: Location, child: Action) -> Self {
        Action::BeginTask { task, here, child: Box::new(child) }
    }

    pub fn end(task: TaskId, here: Location, child: Action) -> Self {
        Action::EndTask { task, here, child: Box::new(child) }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Action::Null)
    }

    /// The next step, `None` for `Null`.
    pub fn child(&self) -> Option<&Action> {
        match self {
            Action::Move { child, .. }
            | Action::BeginTask { child, .. }
            | Action::EndTask { child, .. } => Some(child),
            Action::Null => None,
        }
    }

    /// Drop this step and return the rest of the chain.
    pub fn into_child(self) -> Action {
        match self {
            Action::Move { child, .. }
            | Action::BeginTask { child, .. }
            | Action::EndTask { child, .. } => *child,
            Action::Null => Action::Null,
        }
    }

    /// Iterate over every step, this one first, ending with `Null`.
    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter { next: Some(self) }
    }

    /// Steps in the chain including the terminal `Null`.
    pub fn step_count(&self) -> usize {
        self.iter().count()
    }

    /// Short lowercase label, e.g. for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Action::Move { .. }      => "move",
            Action::BeginTask { .. } => "begin",
            Action::EndTask { .. }   => "end",
            Action::Null             => "null",
        }
    }
}

/// Iterator returned by [`Action::iter`].
pub struct ChainIter<'a> {
    next: Option<&'a Action>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a Action;

    fn next(&mut self) -> Option<&'a Action> {
        let cur = self.next?;
        self.next = cur.child();
        Some(cur)
    }
}
