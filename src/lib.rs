//! priority-collections: single-threaded containers whose items carry a
//! signed priority, with insertion order breaking ties.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: two small containers sharing one ordering contract, usable as
//!   building blocks for event dispatch, middleware chains or job queues.
//! - Containers:
//!   - OrderedPriorityMap<K, V, S>: unique keys, mutable priorities,
//!     non-destructive iteration from highest to lowest priority. Equal
//!     priorities iterate newest-first unless switched to oldest-first.
//!   - PriorityExtractionQueue<V>: anonymous entries (duplicates allowed),
//!     fixed priorities, destructive `extract`. Equal priorities extract
//!     oldest-first, always.
//! - Shared pieces: the `(priority, sequence)` total order in `order`, the
//!   `Extract` shape selector, and a debug-only reentrancy guard.
//!
//! Constraints
//! - Single-threaded: both containers are `!Send`/`!Sync` (no atomics, no
//!   locks).
//! - Every container owns its own sequence counter; sequences are never
//!   reused within a container's lifetime, except after `clear()`.
//! - The ordering comparator is total, so sorts never rely on stability.
//! - Priorities are `i64`. Values arriving from outside the type system
//!   (floats, decoded blobs) are validated and rejected, never truncated.
//!
//! Map layout
//! - A `hashbrown::HashTable` index over generational `slotmap` slots gives
//!   O(1) average lookup. A cached vector of slot keys holds the sorted
//!   order and is rebuilt lazily after any mutation.
//! - Iteration borrows the map, so the borrow checker rejects mutation
//!   while an iterator is alive.
//!
//! Queue layout
//! - An insertion-ordered ledger plus a binary heap of ledger positions.
//! - `extract` pops the heap but leaves the ledger untouched: `len()`,
//!   `to_vec()` and serialization still see extracted entries. This
//!   asymmetry is part of the contract.
//! - `remove` rebuilds the heap from the remaining ledger in O(n). The new
//!   heap is built before the old state is replaced.
//!
//! Reentrancy policy
//! - User `Hash`/`Eq`/`PartialEq` code runs while the containers probe their
//!   storage. Every operation that scans or mutates storage marks the
//!   container busy; re-entering it from such code panics in debug builds
//!   and is unchecked in release builds. Counters and borrowing views are
//!   not tracked.
//!
//! Notes and non-goals
//! - No thread safety and no persistence beyond the queue's JSON blob.
//! - Blob round trips keep values, priorities and relative insertion order;
//!   sequence numbers are reassigned.

mod error;
mod extract;
#[cfg(feature = "bench_internal")]
pub mod heap;
#[cfg(not(feature = "bench_internal"))]
mod heap;
mod order;
mod priority_map;
mod priority_map_proptest;
mod priority_queue;
mod reentrancy;

// Public surface
pub use error::{PriorityError, Result};
pub use extract::{Extract, Extracted};
pub use order::{priority_from_f64, Priority, TieBreak, DEFAULT_MAP_PRIORITY, DEFAULT_QUEUE_PRIORITY};
pub use priority_map::OrderedPriorityMap;
pub use priority_queue::PriorityExtractionQueue;

/// Iterator types returned by the containers.
pub mod iter {
    pub use crate::priority_map::Iter as MapIter;
    pub use crate::priority_queue::{Drain as QueueDrain, Iter as QueueIter};
}
