//! SequencedHeap: array-backed binary heap ordered by `(priority, sequence)`.
//!
//! The root is always the entry with the highest priority; among equal
//! priorities the smallest sequence (oldest insertion) wins. The heap is a
//! standalone generic container: the extraction queue composes it with its
//! ledger rather than layering behavior on a platform heap.

use crate::order::{compare, Priority, Sequence, TieBreak};
use core::cmp::Ordering;

/// One heap slot: ordering key plus an arbitrary payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeapItem<T> {
    pub priority: Priority,
    pub sequence: Sequence,
    pub payload: T,
}

impl<T> HeapItem<T> {
    #[inline]
    fn key(&self) -> (Priority, Sequence) {
        (self.priority, self.sequence)
    }

    /// True when `self` should be extracted before `other`.
    #[inline]
    fn precedes(&self, other: &Self) -> bool {
        compare(self.key(), other.key(), TieBreak::OldestFirst) == Ordering::Less
    }
}

#[derive(Clone, Debug)]
pub struct SequencedHeap<T> {
    items: Vec<HeapItem<T>>,
}

impl<T> Default for SequencedHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SequencedHeap<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Build a heap from arbitrary items in O(n).
    pub fn from_vec(items: Vec<HeapItem<T>>) -> Self {
        let mut heap = Self { items };
        let len = heap.items.len();
        for idx in (0..len / 2).rev() {
            heap.sift_down(idx);
        }
        heap
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The item that `pop` would return next.
    pub fn peek(&self) -> Option<&HeapItem<T>> {
        self.items.first()
    }

    pub fn push(&mut self, priority: Priority, sequence: Sequence, payload: T) {
        self.items.push(HeapItem {
            priority,
            sequence,
            payload,
        });
        let last = self.items.len() - 1;
        self.sift_up(last);
    }

    pub fn pop(&mut self) -> Option<HeapItem<T>> {
        if self.items.is_empty() {
            return None;
        }
        let top = self.items.swap_remove(0);
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        Some(top)
    }

    /// Consume the heap, returning items in extraction order.
    pub fn into_sorted_vec(mut self) -> Vec<HeapItem<T>> {
        let mut out = Vec::with_capacity(self.items.len());
        while let Some(item) = self.pop() {
            out.push(item);
        }
        out
    }

    /// Move `idx` towards the root while it precedes its parent.
    fn sift_up(&mut self, mut idx: usize) {
        while idx != 0 {
            let parent = (idx - 1) / 2;
            if !self.items[idx].precedes(&self.items[parent]) {
                break;
            }
            self.items.swap(idx, parent);
            idx = parent;
        }
    }

    /// Move `idx` towards the leaves while a child precedes it.
    fn sift_down(&mut self, mut idx: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * idx + 1;
            if left >= len {
                break;
            }
            let mut child = left;
            let right = left + 1;
            if right < len && self.items[right].precedes(&self.items[left]) {
                child = right;
            }
            if !self.items[child].precedes(&self.items[idx]) {
                break;
            }
            self.items.swap(idx, child);
            idx = child;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn drain<T>(h: SequencedHeap<T>) -> Vec<T> {
        h.into_sorted_vec().into_iter().map(|i| i.payload).collect()
    }

    /// Invariant: higher priority pops first; ties pop in insertion order.
    #[test]
    fn pops_by_priority_then_oldest() {
        let mut h = SequencedHeap::new();
        h.push(1, 0, "low");
        h.push(5, 1, "a");
        h.push(5, 2, "b");
        h.push(9, 3, "top");
        h.push(5, 4, "c");
        assert_eq!(h.peek().map(|i| i.payload), Some("top"));
        assert_eq!(drain(h), vec!["top", "a", "b", "c", "low"]);
    }

    #[test]
    fn empty_heap_pops_none() {
        let mut h: SequencedHeap<()> = SequencedHeap::new();
        assert!(h.peek().is_none());
        assert!(h.pop().is_none());
        assert!(h.is_empty());
    }

    /// Invariant: mutating a clone leaves the original intact.
    #[test]
    fn clone_is_independent() {
        let mut h = SequencedHeap::new();
        h.push(2, 0, 'x');
        h.push(3, 1, 'y');
        let mut c = h.clone();
        assert_eq!(c.pop().map(|i| i.payload), Some('y'));
        assert_eq!(h.len(), 2);
        assert_eq!(h.peek().map(|i| i.payload), Some('y'));
    }

    // Property: heapify and incremental pushes agree with a full sort on
    // (priority desc, sequence asc).
    proptest! {
        #[test]
        fn prop_matches_sorted_model(prios in proptest::collection::vec(-5i64..5, 0..80)) {
            let items: Vec<HeapItem<usize>> = prios
                .iter()
                .enumerate()
                .map(|(i, &p)| HeapItem { priority: p, sequence: i as u64, payload: i })
                .collect();

            let mut model = items.clone();
            model.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.sequence.cmp(&b.sequence)));
            let expected: Vec<usize> = model.into_iter().map(|i| i.payload).collect();

            let mut pushed = SequencedHeap::with_capacity(items.len());
            for it in items.iter().cloned() {
                pushed.push(it.priority, it.sequence, it.payload);
            }
            prop_assert_eq!(drain(pushed), expected.clone());
            prop_assert_eq!(drain(SequencedHeap::from_vec(items)), expected);
        }
    }
}
