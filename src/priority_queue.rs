//! PriorityExtractionQueue: anonymous entries drained highest-priority first.
//!
//! Two structures live side by side:
//! - the ledger, every live entry in insertion order; it answers `len`,
//!   `contains`, `to_vec` and serialization;
//! - a `SequencedHeap` of ledger positions; it answers `extract`, `top` and
//!   iteration.
//!
//! `extract` pops the heap only. An extracted entry stays in the ledger, so
//! `len()` keeps counting it until it is explicitly removed. `remove`
//! rebuilds the heap from the remaining ledger, which also puts previously
//! extracted entries back into the heap.

use crate::error::{PriorityError, Result};
use crate::extract::{Extract, Extracted};
use crate::heap::{HeapItem, SequencedHeap};
use crate::order::{
    deserialize_priority, priority_from_number, Priority, Sequence, SequenceCounter,
    DEFAULT_QUEUE_PRIORITY,
};
use crate::reentrancy::AccessTracker;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Clone, Debug)]
struct LedgerEntry<V> {
    value: V,
    priority: Priority,
    sequence: Sequence,
}

/// Wire form of one ledger entry.
#[derive(Serialize)]
struct RecordRef<'a, V> {
    data: &'a V,
    priority: Priority,
}

/// Record as read by the generic `Deserialize` impl; works with any format.
#[derive(Deserialize)]
struct Record<V> {
    data: V,
    #[serde(deserialize_with = "deserialize_priority")]
    priority: Priority,
}

/// Record as read from a JSON blob. The raw number is kept so a bad
/// priority surfaces as `InvalidPriority` rather than a parse error.
#[derive(Deserialize)]
struct BlobRecord<V> {
    data: V,
    priority: serde_json::Number,
}

/// Validate every record before anything is inserted.
fn decode_records<V>(raw: Vec<BlobRecord<V>>) -> Result<Vec<(V, Priority)>> {
    raw.into_iter()
        .map(|r| Ok((r.data, priority_from_number(&r.priority)?)))
        .collect()
}

/// A multiset of values extracted by descending priority, oldest first
/// among equals.
///
/// Duplicates are allowed and tracked as distinct entries. Value lookups
/// (`remove`, `contains`) use `PartialEq`; wrap payloads in a type whose
/// equality compares pointers to get identity semantics.
#[derive(Clone, Debug)]
pub struct PriorityExtractionQueue<V> {
    ledger: Vec<LedgerEntry<V>>,
    heap: SequencedHeap<usize>,
    sequence: SequenceCounter,
    reentrancy: AccessTracker,
}

impl<V> Default for PriorityExtractionQueue<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PriorityExtractionQueue<V> {
    pub fn new() -> Self {
        Self {
            ledger: Vec::new(),
            heap: SequencedHeap::new(),
            sequence: SequenceCounter::new(),
            reentrancy: AccessTracker::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ledger: Vec::with_capacity(capacity),
            heap: SequencedHeap::with_capacity(capacity),
            sequence: SequenceCounter::new(),
            reentrancy: AccessTracker::new(),
        }
    }

    pub fn insert(&mut self, value: V, priority: Priority) {
        let _g = self.reentrancy.enter();
        let sequence = self.sequence.next();
        let pos = self.ledger.len();
        self.ledger.push(LedgerEntry {
            value,
            priority,
            sequence,
        });
        self.heap.push(priority, sequence, pos);
    }

    /// Insert with [`DEFAULT_QUEUE_PRIORITY`].
    pub fn push(&mut self, value: V) {
        self.insert(value, DEFAULT_QUEUE_PRIORITY);
    }

    /// Number of ledger entries, including ones already extracted.
    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Number of entries still waiting in the heap.
    pub fn pending(&self) -> usize {
        self.heap.len()
    }

    /// True once every entry has been extracted (the ledger may still hold them).
    pub fn is_drained(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    fn value_at(&self, pos: usize) -> &V {
        &self.ledger[pos].value
    }

    /// Pop the highest-priority value. The ledger keeps its copy.
    pub fn extract(&mut self) -> Result<V>
    where
        V: Clone,
    {
        let _g = self.reentrancy.enter();
        let item = self.heap.pop().ok_or(PriorityError::EmptyQueue)?;
        Ok(self.value_at(item.payload).clone())
    }

    /// The value `extract` would return next, without removing it.
    pub fn top(&self) -> Result<&V> {
        self.heap
            .peek()
            .map(|item| self.value_at(item.payload))
            .ok_or(PriorityError::EmptyQueue)
    }

    /// Remove the first ledger entry equal to `value` and rebuild the heap.
    ///
    /// Costs O(n) in the remaining size. Returns false when nothing matched.
    pub fn remove(&mut self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.remove_where(|v| v == value)
    }

    /// Remove the first ledger entry matching `pred` and rebuild the heap.
    pub fn remove_where<F>(&mut self, mut pred: F) -> bool
    where
        F: FnMut(&V) -> bool,
    {
        let _g = self.reentrancy.enter();
        let Some(pos) = self.ledger.iter().position(|e| pred(&e.value)) else {
            return false;
        };

        // Positions after `pos` shift down by one once the ledger entry goes.
        let items: Vec<HeapItem<usize>> = self
            .ledger
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != pos)
            .map(|(i, e)| HeapItem {
                priority: e.priority,
                sequence: e.sequence,
                payload: if i > pos { i - 1 } else { i },
            })
            .collect();
        let heap = SequencedHeap::from_vec(items);

        self.ledger.remove(pos);
        self.heap = heap;
        log::trace!("rebuilt queue heap after removal ({} entries)", self.heap.len());
        true
    }

    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        let _g = self.reentrancy.enter();
        self.ledger.iter().any(|e| e.value == *value)
    }

    pub fn has_priority(&self, priority: Priority) -> bool {
        let _g = self.reentrancy.enter();
        self.ledger.iter().any(|e| e.priority == priority)
    }

    /// Ledger contents in insertion order, shaped by `extract`.
    pub fn to_vec(&self, extract: Extract) -> Vec<Extracted<'_, V>> {
        self.ledger
            .iter()
            .map(|e| Extracted::shape(extract, &e.value, e.priority))
            .collect()
    }

    /// Pending entries in extraction order, with their priorities.
    pub fn sorted_entries(&self) -> Vec<(&V, Priority)> {
        self.heap
            .clone()
            .into_sorted_vec()
            .into_iter()
            .map(|item| (self.value_at(item.payload), item.priority))
            .collect()
    }

    /// Non-destructive iteration in extraction order over a heap snapshot.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            snapshot: self.heap.clone(),
            ledger: &self.ledger,
        }
    }

    /// Destructive iteration: each step is an `extract` without the clone.
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            heap: &mut self.heap,
            ledger: &self.ledger,
        }
    }

    /// Drop every entry and restart the sequence counter.
    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter();
        log::debug!("clearing priority queue with {} entries", self.ledger.len());
        self.ledger.clear();
        self.heap.clear();
        self.sequence.reset();
    }

    /// Serialize the ledger as a JSON array of `{"data", "priority"}` records.
    pub fn to_blob(&self) -> Result<String>
    where
        V: Serialize,
    {
        Ok(serde_json::to_string(self)?)
    }

    /// Build a queue from a blob produced by [`to_blob`](Self::to_blob).
    ///
    /// Values, priorities and relative insertion order survive the round
    /// trip; sequence numbers are assigned afresh.
    pub fn from_blob(blob: &str) -> Result<Self>
    where
        V: DeserializeOwned,
    {
        let mut q = Self::new();
        q.restore(blob)?;
        Ok(q)
    }

    /// Append every record of `blob` through the normal insert path.
    /// Nothing is inserted if any record is malformed.
    pub fn restore(&mut self, blob: &str) -> Result<()>
    where
        V: DeserializeOwned,
    {
        let raw: Vec<BlobRecord<V>> = serde_json::from_str(blob)?;
        let records = decode_records(raw)?;
        log::debug!("restoring {} queue entries from blob", records.len());
        self.extend(records);
        Ok(())
    }
}

impl<V> Extend<(V, Priority)> for PriorityExtractionQueue<V> {
    fn extend<I: IntoIterator<Item = (V, Priority)>>(&mut self, iter: I) {
        for (v, p) in iter {
            self.insert(v, p);
        }
    }
}

impl<V> FromIterator<(V, Priority)> for PriorityExtractionQueue<V> {
    fn from_iter<I: IntoIterator<Item = (V, Priority)>>(iter: I) -> Self {
        let mut q = Self::new();
        q.extend(iter);
        q
    }
}

impl<V: Serialize> Serialize for PriorityExtractionQueue<V> {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.ledger.iter().map(|e| RecordRef {
            data: &e.value,
            priority: e.priority,
        }))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for PriorityExtractionQueue<V> {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let records = Vec::<Record<V>>::deserialize(deserializer)?;
        Ok(records.into_iter().map(|r| (r.data, r.priority)).collect())
    }
}

/// Snapshot iterator returned by [`PriorityExtractionQueue::iter`].
pub struct Iter<'a, V> {
    snapshot: SequencedHeap<usize>,
    ledger: &'a [LedgerEntry<V>],
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let ledger = self.ledger;
        let item = self.snapshot.pop()?;
        Some(&ledger[item.payload].value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.snapshot.len();
        (n, Some(n))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<'a, V> IntoIterator for &'a PriorityExtractionQueue<V> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Draining iterator returned by [`PriorityExtractionQueue::drain`].
pub struct Drain<'a, V> {
    heap: &'a mut SequencedHeap<usize>,
    ledger: &'a [LedgerEntry<V>],
}

impl<'a, V> Iterator for Drain<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let ledger = self.ledger;
        let item = self.heap.pop()?;
        Some(&ledger[item.payload].value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.heap.len();
        (n, Some(n))
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}
