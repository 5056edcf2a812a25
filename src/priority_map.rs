//! OrderedPriorityMap: named entries iterated in priority order.
//!
//! Storage is a `hashbrown::HashTable` index over generational `slotmap`
//! slots, the same split used for handle-based maps. On top of that sits a
//! cached vector of slot keys in sorted order, rebuilt lazily the first time
//! an iteration follows a mutation.

use crate::error::{PriorityError, Result};
use crate::extract::{Extract, Extracted};
use crate::order::{compare, Priority, Sequence, SequenceCounter, TieBreak};
use crate::reentrancy::AccessTracker;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_table::Entry as TableEntry;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;

#[derive(Clone, Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    priority: Priority,
    sequence: Sequence,
    hash: u64,
}

impl<K, V> Entry<K, V> {
    #[inline]
    fn order_key(&self) -> (Priority, Sequence) {
        (self.priority, self.sequence)
    }
}

/// A keyed collection iterated from highest to lowest priority.
///
/// Keys are unique. Re-inserting a key overwrites its value and priority and
/// makes it the newest entry for tie-breaking purposes. Equal priorities are
/// ordered newest-first by default; see [`TieBreak`].
///
/// Iteration takes `&mut self` because it may need to refresh the sort
/// cache. The returned iterator borrows the map, so the map cannot be
/// mutated while an iteration is in progress.
#[derive(Clone, Debug)]
pub struct OrderedPriorityMap<K, V, S = RandomState> {
    hasher: S,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    order: Vec<DefaultKey>,
    sorted: bool,
    tie_break: TieBreak,
    sequence: SequenceCounter,
    reentrancy: AccessTracker,
}

impl<K, V> OrderedPriorityMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut m = Self::new();
        m.index = HashTable::with_capacity(capacity);
        m.slots = SlotMap::with_capacity(capacity);
        m.order = Vec::with_capacity(capacity);
        m
    }

    /// Empty map with the given tie-break direction.
    pub fn with_tie_break(tie_break: TieBreak) -> Self {
        let mut m = Self::new();
        m.tie_break = tie_break;
        m
    }
}

impl<K, V> Default for OrderedPriorityMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> OrderedPriorityMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            index: HashTable::new(),
            slots: SlotMap::with_key(),
            order: Vec::new(),
            sorted: true,
            tie_break: TieBreak::default(),
            sequence: SequenceCounter::new(),
            reentrancy: AccessTracker::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// True when the cached order reflects every mutation so far.
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Change the tie-break direction. The sort cache is only invalidated
    /// when the direction actually changes.
    pub fn set_tie_break(&mut self, tie_break: TieBreak) {
        let _g = self.reentrancy.enter();
        if self.tie_break != tie_break {
            self.tie_break = tie_break;
            self.sorted = false;
        }
    }

    fn find_slot<Q>(&self, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hasher.hash_one(q);
        self.index
            .find(hash, |&k| {
                self.slots
                    .get(k)
                    .map(|e| e.key.borrow() == q)
                    .unwrap_or(false)
            })
            .copied()
    }

    /// Insert `value` under `key`, or overwrite the existing entry.
    ///
    /// Returns the previous value when the key was already present. The
    /// entry receives a fresh sequence number either way.
    pub fn insert(&mut self, key: K, value: V, priority: Priority) -> Option<V> {
        let _g = self.reentrancy.enter();
        let hash = self.hasher.hash_one(&key);
        let sequence = self.sequence.next();
        self.sorted = false;
        match self.index.entry(
            hash,
            |&kk| self.slots.get(kk).map(|e| e.key == key).unwrap_or(false),
            |&kk| self.slots.get(kk).map(|e| e.hash).unwrap_or(0),
        ) {
            TableEntry::Occupied(o) => {
                let e = self
                    .slots
                    .get_mut(*o.get())
                    .expect("index must refer to a live slot");
                e.priority = priority;
                e.sequence = sequence;
                Some(core::mem::replace(&mut e.value, value))
            }
            TableEntry::Vacant(v) => {
                let k = self.slots.insert(Entry {
                    key,
                    value,
                    priority,
                    sequence,
                    hash,
                });
                let _ = v.insert(k);
                None
            }
        }
    }

    /// Change the priority of an existing entry. Its sequence is kept.
    pub fn set_priority<Q>(&mut self, q: &Q, priority: Priority) -> Result<()>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let slot = self.find_slot(q).ok_or(PriorityError::NotFound)?;
        let e = self.slots.get_mut(slot).ok_or(PriorityError::NotFound)?;
        e.priority = priority;
        self.sorted = false;
        Ok(())
    }

    /// Remove an entry; absent keys are ignored.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.hasher.hash_one(q);
        let found = self
            .index
            .find_entry(hash, |&k| {
                self.slots
                    .get(k)
                    .map(|e| e.key.borrow() == q)
                    .unwrap_or(false)
            })
            .ok()?;
        let (slot, _) = found.remove();
        let entry = self.slots.remove(slot)?;
        self.sorted = false;
        Some(entry.value)
    }

    /// Drop every entry and restart the sequence counter.
    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter();
        log::debug!("clearing priority map with {} entries", self.slots.len());
        self.index.clear();
        self.slots.clear();
        self.order.clear();
        self.sequence.reset();
        self.sorted = false;
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let slot = self.find_slot(q)?;
        self.slots.get(slot).map(|e| &e.value)
    }

    /// Mutable access to a value. Does not affect ordering.
    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let slot = self.find_slot(q)?;
        self.slots.get_mut(slot).map(|e| &mut e.value)
    }

    pub fn priority<Q>(&self, q: &Q) -> Option<Priority>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let slot = self.find_slot(q)?;
        self.slots.get(slot).map(|e| e.priority)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.find_slot(q).is_some()
    }

    /// Rebuild the cached order if any mutation happened since the last sort.
    fn sort(&mut self) {
        if self.sorted {
            return;
        }
        let _g = self.reentrancy.enter();
        self.order.clear();
        self.order.extend(self.slots.keys());
        let slots = &self.slots;
        let tie_break = self.tie_break;
        // The comparator is total (sequences are unique), so stability is moot.
        self.order.sort_unstable_by(|&a, &b| {
            compare(slots[a].order_key(), slots[b].order_key(), tie_break)
        });
        log::trace!("re-sorted priority map ({} entries)", self.order.len());
        self.sorted = true;
    }

    /// Iterate `(key, value)` from highest to lowest priority.
    pub fn iter(&mut self) -> Iter<'_, K, V> {
        self.sort();
        Iter {
            order: self.order.iter(),
            slots: &self.slots,
        }
    }

    /// Like [`iter`](Self::iter) but also yields each entry's priority.
    pub fn iter_with_priority(&mut self) -> impl Iterator<Item = (&K, &V, Priority)> + '_ {
        self.sort();
        let slots = &self.slots;
        self.order
            .iter()
            .filter_map(move |&k| slots.get(k))
            .map(|e| (&e.key, &e.value, e.priority))
    }

    /// Snapshot of the map in priority order, shaped by `extract`.
    pub fn to_vec(&mut self, extract: Extract) -> Vec<(&K, Extracted<'_, V>)> {
        self.sort();
        let slots = &self.slots;
        self.order
            .iter()
            .filter_map(|&k| slots.get(k))
            .map(|e| (&e.key, Extracted::shape(extract, &e.value, e.priority)))
            .collect()
    }

    /// Consume the map, returning `(key, value)` pairs in priority order.
    pub fn into_sorted_vec(mut self) -> Vec<(K, V)> {
        self.sort();
        let mut slots = self.slots;
        self.order
            .iter()
            .filter_map(|&k| slots.remove(k))
            .map(|e| (e.key, e.value))
            .collect()
    }
}

/// Priority-ordered iterator over an `OrderedPriorityMap`.
pub struct Iter<'a, K, V> {
    order: core::slice::Iter<'a, DefaultKey>,
    slots: &'a SlotMap<DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let slots = self.slots;
        self.order
            .by_ref()
            .find_map(|&k| slots.get(k))
            .map(|e| (&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.order.len()))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let slots = self.slots;
        self.order
            .by_ref()
            .rev()
            .find_map(|&k| slots.get(k))
            .map(|e| (&e.key, &e.value))
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut OrderedPriorityMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> Extend<(K, V, Priority)> for OrderedPriorityMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V, Priority)>>(&mut self, iter: I) {
        for (k, v, p) in iter {
            self.insert(k, v, p);
        }
    }
}
