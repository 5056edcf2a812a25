//! Debug-only detection of user code reaching back into a container.
//!
//! Three places hand control to caller code while storage is mid-operation:
//! - the map's index probe runs `Hash`/`Eq` on keys (`insert`, `remove`,
//!   `get`, `set_priority`, ...);
//! - the map's lazy re-sort reads every slot while `order` is being rebuilt;
//! - the queue's ledger scan runs `PartialEq` or a caller predicate
//!   (`contains`, `remove_where`), and `remove_where` swaps the heap for a
//!   rebuilt one right after.
//!
//! A key or value that smuggles a pointer back to its container could
//! observe a half-sorted `order` or a heap whose positions no longer match
//! the ledger. Each container therefore owns an `AccessTracker`, and the
//! operations that scan or mutate storage open a section on it. Plain
//! counters (`len`, `pending`) and borrowing views (`to_vec`, `iter`,
//! `drain`, `top`) skip the tracker: they run no caller code, and the borrow
//! checker already keeps them apart from mutation.
//!
//! Opening a second section while one is open panics in debug builds. In
//! release builds the tracker is zero-sized and `open` does nothing.

use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub(crate) struct AccessTracker {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    // Containers hold raw positions into their own storage; keep them !Send + !Sync.
    _local: PhantomData<*mut ()>,
}

impl AccessTracker {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            _local: PhantomData,
        }
    }

    /// Mark the container busy until the returned section is dropped.
    #[inline]
    pub(crate) fn enter(&self) -> AccessSection<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "priority container re-entered from a key, value or predicate callback"
            );
            return AccessSection { tracker: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return AccessSection { _z: PhantomData };
        }
    }
}

// A copy taken mid-operation is a different container and starts idle.
impl Clone for AccessTracker {
    fn clone(&self) -> Self {
        Self::new()
    }
}

pub(crate) struct AccessSection<'a> {
    #[cfg(debug_assertions)]
    tracker: &'a AccessTracker,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for AccessSection<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.tracker.busy.set(false);
    }
}
