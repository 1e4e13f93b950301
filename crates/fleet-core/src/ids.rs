//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Identity is the inner integer only;
//! a `Location` carries no coordinates.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Raw integer value, e.g. for output rows.
            #[inline(always)]
            pub fn raw(self) -> $inner {
                self.0
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// Unique robot identifier, issued once at setup.
    pub struct RobotId(u32);
}

typed_id! {
    /// Unique, immutable task identifier.
    pub struct TaskId(u64);
}

typed_id! {
    /// A node in the warehouse topology.
    pub struct Location(u32);
}

// ── IdSupplier ────────────────────────────────────────────────────────────────

/// Opaque source of unique robot and task IDs.
///
/// Thread-safe: the concurrent task feeder and the setup code may draw from
/// the same supplier through a shared reference.  IDs are never reused within
/// one supplier.
#[derive(Debug, Default)]
pub struct IdSupplier {
    next_robot: AtomicU64,
    next_task:  AtomicU64,
}

impl IdSupplier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_robot(&self) -> RobotId {
        let raw = self.next_robot.fetch_add(1, Ordering::Relaxed);
        RobotId(raw as u32)
    }

    pub fn next_task(&self) -> TaskId {
        TaskId(self.next_task.fetch_add(1, Ordering::Relaxed))
    }
}
