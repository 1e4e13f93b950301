//! Execution traces: one per robot per tick.

use std::fmt;

use fleet_core::{Location, RobotId, TaskId, Tick};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskPhase {
    Start,
    End,
}

impl TaskPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskPhase::Start => "start",
            TaskPhase::End   => "end",
        }
    }
}

impl fmt::Display for TaskPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one robot did in one tick.  `timestamp` is the robot's own tick.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Trace {
    Move {
        robot:     RobotId,
        source:    Location,
        target:    Location,
        timestamp: Tick,
    },
    TaskExecution {
        phase:     TaskPhase,
        task:      TaskId,
        robot:     RobotId,
        location:  Location,
        timestamp: Tick,
    },
    NullAction {
        robot:     RobotId,
        location:  Location,
        timestamp: Tick,
    },
}

impl Trace {
    pub fn robot(&self) -> RobotId {
        match *self {
            Trace::Move { robot, .. }
            | Trace::TaskExecution { robot, .. }
            | Trace::NullAction { robot, .. } => robot,
        }
    }

    pub fn timestamp(&self) -> Tick {
        match *self {
            Trace::Move { timestamp, .. }
            | Trace::TaskExecution { timestamp, .. }
            | Trace::NullAction { timestamp, .. } => timestamp,
        }
    }

    /// Where the robot was at the start of the step.
    pub fn source(&self) -> Location {
        match *self {
            Trace::Move { source, .. } => source,
            Trace::TaskExecution { location, .. } | Trace::NullAction { location, .. } => location,
        }
    }

    /// Where the robot is after the step.
    pub fn target(&self) -> Location {
        match *self {
            Trace::Move { target, .. } => target,
            Trace::TaskExecution { location, .. } | Trace::NullAction { location, .. } => location,
        }
    }

    pub fn task(&self) -> Option<TaskId> {
        match *self {
            Trace::TaskExecution { task, .. } => Some(task),
            _ => None,
        }
    }

    pub fn phase(&self) -> Option<TaskPhase> {
        match *self {
            Trace::TaskExecution { phase, .. } => Some(phase),
            _ => None,
        }
    }

    /// `"move"`, `"task"` or `"null"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Trace::Move { .. }          => "move",
            Trace::TaskExecution { .. } => "task",
            Trace::NullAction { .. }    => "null",
        }
    }
}
