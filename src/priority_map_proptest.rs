#![cfg(test)]

// Property tests for OrderedPriorityMap kept inside the crate so they can
// observe the sort cache directly.

use crate::error::PriorityError;
use crate::order::TieBreak;
use crate::priority_map::OrderedPriorityMap;
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations: indices shrink to earlier keys and op lists
// shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32, i64),
    SetPriority(usize, i64),
    Remove(usize),
    Get(usize),
    TieBreak(bool),
    Iterate,
    Clear,
}

#[derive(Clone, Debug)]
struct ModelEntry {
    value: i32,
    priority: i64,
    sequence: u64,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{1,4}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let prio = -3i64..=3;
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>(), prio.clone()).prop_map(|(i, v, p)| Op::Insert(i, v, p)),
            2 => (idx.clone(), prio).prop_map(|(i, p)| Op::SetPriority(i, p)),
            2 => idx.clone().prop_map(Op::Remove),
            1 => idx.prop_map(Op::Get),
            1 => any::<bool>().prop_map(Op::TieBreak),
            2 => Just(Op::Iterate),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn model_order(model: &HashMap<String, ModelEntry>, tb: TieBreak) -> Vec<String> {
    let mut items: Vec<(&String, &ModelEntry)> = model.iter().collect();
    items.sort_by(|a, b| {
        b.1.priority.cmp(&a.1.priority).then(match tb {
            TieBreak::NewestFirst => b.1.sequence.cmp(&a.1.sequence),
            TieBreak::OldestFirst => a.1.sequence.cmp(&b.1.sequence),
        })
    });
    items.into_iter().map(|(k, _)| k.clone()).collect()
}

// Property: state-machine equivalence against a HashMap model carrying
// explicit sequences.
// Invariants exercised across random operation sequences:
// - `len` equals the number of live keys; re-insert does not change it.
// - Iteration order equals the model sorted by (priority desc, sequence
//   per tie-break), and repeated iteration without mutation is identical.
// - `set_priority` fails exactly when the key is absent.
// - The sort cache is clean right after iteration and dirty after mutation.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: OrderedPriorityMap<String, i32> = OrderedPriorityMap::new();
        let mut model: HashMap<String, ModelEntry> = HashMap::new();
        let mut next_seq = 0u64;
        let mut tb = TieBreak::NewestFirst;

        for op in ops {
            match op {
                Op::Insert(i, v, p) => {
                    let k = pool[i].clone();
                    let prev = sut.insert(k.clone(), v, p);
                    let old = model.insert(k, ModelEntry { value: v, priority: p, sequence: next_seq });
                    next_seq += 1;
                    prop_assert_eq!(prev, old.map(|e| e.value));
                    prop_assert!(!sut.is_sorted());
                }
                Op::SetPriority(i, p) => {
                    let k = &pool[i];
                    match (sut.set_priority(k.as_str(), p), model.get_mut(k)) {
                        (Ok(()), Some(e)) => e.priority = p,
                        (Err(PriorityError::NotFound), None) => {}
                        (res, m) => prop_assert!(false, "mismatch: {:?} vs {:?}", res, m),
                    }
                }
                Op::Remove(i) => {
                    let k = &pool[i];
                    let got = sut.remove(k.as_str());
                    let want = model.remove(k).map(|e| e.value);
                    prop_assert_eq!(got, want);
                }
                Op::Get(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.get(k.as_str()).copied(), model.get(k).map(|e| e.value));
                    prop_assert_eq!(sut.priority(k.as_str()), model.get(k).map(|e| e.priority));
                }
                Op::TieBreak(newest) => {
                    tb = if newest { TieBreak::NewestFirst } else { TieBreak::OldestFirst };
                    sut.set_tie_break(tb);
                    prop_assert_eq!(sut.tie_break(), tb);
                }
                Op::Iterate => {
                    let first: Vec<String> = sut.iter().map(|(k, _)| k.clone()).collect();
                    prop_assert!(sut.is_sorted());
                    let second: Vec<String> = sut.iter().map(|(k, _)| k.clone()).collect();
                    prop_assert_eq!(&first, &second);
                    prop_assert_eq!(first, model_order(&model, tb));
                }
                Op::Clear => {
                    sut.clear();
                    model.clear();
                    next_seq = 0;
                }
            }
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
        }

        let final_order: Vec<String> = sut.iter().map(|(k, _)| k.clone()).collect();
        prop_assert_eq!(final_order, model_order(&model, tb));
    }
}
