// PriorityExtractionQueue property tests.
//
// Property 1: extraction order and ledger bookkeeping match a model.
//  - Model: Vec of (value, priority, sequence) for the ledger, plus the set
//    of sequences still pending in the heap.
//  - Operations: insert, extract, remove(value), top.
//  - Invariants: len() == ledger size; pending() == heap size; extract and
//    top return the pending entry with max priority, min sequence; remove
//    drops the first ledger match and re-pends every remaining entry.
//
// Property 2: blob round trip preserves ledger and extraction order.
use priority_collections::{Extract, PriorityError, PriorityExtractionQueue};
use proptest::prelude::*;
use std::collections::BTreeSet;

#[derive(Clone, Debug)]
enum Op {
    Insert(u8, i64),
    Extract,
    Remove(u8),
    Top,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..6, -3i64..=3).prop_map(|(v, p)| Op::Insert(v, p)),
        3 => Just(Op::Extract),
        1 => (0u8..6).prop_map(Op::Remove),
        1 => Just(Op::Top),
    ]
}

struct Model {
    ledger: Vec<(u8, i64, u64)>,
    pending: BTreeSet<u64>,
    next_seq: u64,
}

impl Model {
    fn best(&self) -> Option<(u8, u64)> {
        self.ledger
            .iter()
            .filter(|(_, _, s)| self.pending.contains(s))
            .min_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)))
            .map(|&(v, _, s)| (v, s))
    }
}

proptest! {
    #[test]
    fn prop_queue_matches_model(ops in proptest::collection::vec(arb_op(), 1..120)) {
        let mut q: PriorityExtractionQueue<u8> = PriorityExtractionQueue::new();
        let mut m = Model { ledger: Vec::new(), pending: BTreeSet::new(), next_seq: 0 };

        for op in ops {
            match op {
                Op::Insert(v, p) => {
                    q.insert(v, p);
                    m.ledger.push((v, p, m.next_seq));
                    m.pending.insert(m.next_seq);
                    m.next_seq += 1;
                }
                Op::Extract => match (q.extract(), m.best()) {
                    (Ok(got), Some((want, seq))) => {
                        prop_assert_eq!(got, want);
                        m.pending.remove(&seq);
                    }
                    (Err(PriorityError::EmptyQueue), None) => {}
                    (res, want) => prop_assert!(false, "mismatch: {:?} vs {:?}", res, want),
                },
                Op::Remove(v) => {
                    let removed = q.remove(&v);
                    let pos = m.ledger.iter().position(|(x, _, _)| *x == v);
                    prop_assert_eq!(removed, pos.is_some());
                    if let Some(pos) = pos {
                        m.ledger.remove(pos);
                        m.pending = m.ledger.iter().map(|(_, _, s)| *s).collect();
                    }
                }
                Op::Top => {
                    let want = m.best().map(|(v, _)| v);
                    prop_assert_eq!(q.top().ok().copied(), want);
                }
            }
            prop_assert_eq!(q.len(), m.ledger.len());
            prop_assert_eq!(q.pending(), m.pending.len());
            let ledger_values: Vec<u8> = q
                .to_vec(Extract::Data)
                .iter()
                .filter_map(|x| x.data().copied())
                .collect();
            let model_values: Vec<u8> = m.ledger.iter().map(|(v, _, _)| *v).collect();
            prop_assert_eq!(ledger_values, model_values);
        }
    }

    #[test]
    fn prop_blob_round_trip(items in proptest::collection::vec((any::<u16>(), any::<i64>()), 0..40)) {
        let q: PriorityExtractionQueue<u16> = items.iter().copied().collect();
        let blob = q.to_blob().unwrap();
        let r: PriorityExtractionQueue<u16> = PriorityExtractionQueue::from_blob(&blob).unwrap();

        prop_assert_eq!(r.to_vec(Extract::Both), q.to_vec(Extract::Both));
        let a: Vec<u16> = q.iter().copied().collect();
        let b: Vec<u16> = r.iter().copied().collect();
        prop_assert_eq!(a, b);
    }
}
