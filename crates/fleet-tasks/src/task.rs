//! Transport task record.

use std::cmp::Ordering;
use std::fmt;
use std::time::Instant;

use fleet_core::{Location, TaskId};

/// Where a task is in its lifecycle.  Transitions are monotonic.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskStatus {
    Unassigned,
    Assigned,
    Completed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Unassigned => "unassigned",
            TaskStatus::Assigned   => "assigned",
            TaskStatus::Completed  => "completed",
        };
        f.write_str(s)
    }
}

/// Move a load from `origin` to `destination`.
///
/// `id`, `origin`, `destination` and `originated_at` never change after
/// construction; only the broker updates `status`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub id:            TaskId,
    pub origin:        Location,
    pub destination:   Location,
    pub status:        TaskStatus,
    pub originated_at: Instant,
}

impl Task {
    /// A fresh `Unassigned` task stamped with the current instant.
    pub fn new(id: TaskId, origin: Location, destination: Location) -> Self {
        Self {
            id,
            origin,
            destination,
            status: TaskStatus::Unassigned,
            originated_at: Instant::now(),
        }
    }

    /// Override the origination stamp (used to replay or reorder tasks).
    pub fn originated(mut self, at: Instant) -> Self {
        self.originated_at = at;
        self
    }

    /// Priority order: older first, then lower ID.
    #[inline]
    pub fn priority_cmp(&self, other: &Task) -> Ordering {
        self.originated_at
            .cmp(&other.originated_at)
            .then(self.id.cmp(&other.id))
    }
}
