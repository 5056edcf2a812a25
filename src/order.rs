//! Priority, sequence and the total order shared by both containers.
//!
//! Entries sort by priority descending. Equal priorities are resolved by
//! the insertion sequence according to a `TieBreak`. Sequences are unique
//! within a container, so `compare` never returns `Equal` for two distinct
//! entries and the outcome does not depend on sort stability.

use crate::error::{PriorityError, Result};
use core::cmp::Ordering;
use core::fmt;
use serde::de::{self, Deserializer, Visitor};

/// Signed priority; higher values come first.
pub type Priority = i64;

/// Per-container insertion counter used only to break ties.
pub type Sequence = u64;

/// Priority used by `OrderedPriorityMap` when callers have no preference.
pub const DEFAULT_MAP_PRIORITY: Priority = 0;

/// Priority used by `PriorityExtractionQueue::push`.
pub const DEFAULT_QUEUE_PRIORITY: Priority = 1;

/// Which of two equal-priority entries is considered earlier.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum TieBreak {
    /// Most recently inserted first (LIFO within a priority).
    #[default]
    NewestFirst,
    /// Least recently inserted first (FIFO within a priority).
    OldestFirst,
}

/// Total order over `(priority, sequence)` pairs. `Less` means `a` is
/// yielded before `b`.
#[inline]
pub(crate) fn compare(
    a: (Priority, Sequence),
    b: (Priority, Sequence),
    tie_break: TieBreak,
) -> Ordering {
    match b.0.cmp(&a.0) {
        Ordering::Equal => match tie_break {
            TieBreak::NewestFirst => b.1.cmp(&a.1),
            TieBreak::OldestFirst => a.1.cmp(&b.1),
        },
        other => other,
    }
}

/// Monotonic sequence source owned by a single container.
#[derive(Clone, Debug, Default)]
pub(crate) struct SequenceCounter {
    next: Sequence,
}

impl SequenceCounter {
    pub(crate) const fn new() -> Self {
        Self { next: 0 }
    }

    #[inline]
    pub(crate) fn next(&mut self) -> Sequence {
        let s = self.next;
        assert_ne!(s, Sequence::MAX, "sequence counter exhausted");
        self.next = s + 1;
        s
    }

    pub(crate) fn reset(&mut self) {
        self.next = 0;
    }
}

/// Convert a floating-point priority, rejecting anything that is not an
/// exact `i64` (fractions, NaN, infinities, out of range).
pub fn priority_from_f64(value: f64) -> Result<Priority> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    if value.is_finite() && value.fract() == 0.0 && in_range {
        Ok(value as Priority)
    } else {
        Err(PriorityError::InvalidPriority {
            value: value.to_string(),
        })
    }
}

/// Convert a decoded JSON number into a priority.
pub(crate) fn priority_from_number(n: &serde_json::Number) -> Result<Priority> {
    if let Some(p) = n.as_i64() {
        return Ok(p);
    }
    match n.as_f64() {
        Some(f) if n.is_f64() => priority_from_f64(f),
        _ => Err(PriorityError::InvalidPriority {
            value: n.to_string(),
        }),
    }
}

struct PriorityVisitor;

impl<'de> Visitor<'de> for PriorityVisitor {
    type Value = Priority;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integral priority")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> core::result::Result<Priority, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> core::result::Result<Priority, E> {
        Priority::try_from(v).map_err(|_| {
            E::custom(PriorityError::InvalidPriority {
                value: v.to_string(),
            })
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> core::result::Result<Priority, E> {
        priority_from_f64(v).map_err(E::custom)
    }
}

/// `deserialize_with` helper for priority fields. Asks for an `i64`, so
/// non-self-describing formats work; self-describing ones may still hand
/// over an unsigned or float value, which is range-checked.
pub(crate) fn deserialize_priority<'de, D>(deserializer: D) -> core::result::Result<Priority, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_i64(PriorityVisitor)
}
