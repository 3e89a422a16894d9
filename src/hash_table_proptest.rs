#![cfg(test)]

// Property tests for HashTable kept inside the crate so the same scenarios
// run under both allocator disciplines without feature gates.

use crate::alloc::{Arena, Heap, RawAllocator};
use crate::hash_table::{HashTable, TableError};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Add(usize, i32),
    Set(usize, i32),
    AddOrSet(usize, i32),
    Remove(usize),
    RemoveIfContains(usize),
    Get(usize),
    Contains(usize),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<u32>, Vec<OpI>)> {
    proptest::collection::btree_set(any::<u32>(), 1..=16).prop_flat_map(|pool| {
        let pool: Vec<u32> = pool.into_iter().collect();
        let idx = 0..pool.len();
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Add(i, v)),
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::AddOrSet(i, v)),
            idx.clone().prop_map(OpI::Remove),
            idx.clone().prop_map(OpI::RemoveIfContains),
            idx.clone().prop_map(OpI::Get),
            idx.clone().prop_map(OpI::Contains),
        ];
        proptest::collection::vec(op, 1..100).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - add rejects exactly the keys the model already holds; set/remove fail
//   on exactly the keys it does not.
// - add_or_set reports prior existence in agreement with the model.
// - get/contains parity after every operation; len parity after every
//   operation; capacity never decreases.
// - Final membership and values equal the model's for the whole key pool.
fn run_scenario<A: RawAllocator + Clone>(
    alloc: A,
    pool: &[u32],
    ops: &[OpI],
) -> Result<(), TestCaseError> {
    let mut sut: HashTable<u32, i32, A> = HashTable::with_capacity_in(8, alloc).unwrap();
    let mut model: HashMap<u32, i32> = HashMap::new();
    let mut last_capacity = sut.capacity();

    for op in ops {
        match *op {
            OpI::Add(i, v) => {
                let k = pool[i];
                match sut.add(&k, v) {
                    Ok(()) => {
                        prop_assert!(!model.contains_key(&k), "add must fail on duplicate");
                        model.insert(k, v);
                    }
                    Err(TableError::DuplicateKey) => {
                        prop_assert!(model.contains_key(&k), "duplicate error only when present");
                    }
                    Err(e) => return Err(TestCaseError::fail(format!("add: {e}"))),
                }
            }
            OpI::Set(i, v) => {
                let k = pool[i];
                match sut.set(&k, v) {
                    Ok(()) => {
                        prop_assert!(model.contains_key(&k), "set must fail on absence");
                        model.insert(k, v);
                    }
                    Err(TableError::KeyNotFound) => {
                        prop_assert!(!model.contains_key(&k), "not-found error only when absent");
                    }
                    Err(e) => return Err(TestCaseError::fail(format!("set: {e}"))),
                }
            }
            OpI::AddOrSet(i, v) => {
                let k = pool[i];
                let existed = sut
                    .add_or_set(&k, v)
                    .map_err(|e| TestCaseError::fail(format!("add_or_set: {e}")))?;
                prop_assert_eq!(existed, model.contains_key(&k));
                model.insert(k, v);
            }
            OpI::Remove(i) => {
                let k = pool[i];
                match sut.remove(&k) {
                    Ok(v) => {
                        prop_assert_eq!(model.remove(&k), Some(v));
                    }
                    Err(TableError::KeyNotFound) => {
                        prop_assert!(!model.contains_key(&k));
                    }
                    Err(e) => return Err(TestCaseError::fail(format!("remove: {e}"))),
                }
            }
            OpI::RemoveIfContains(i) => {
                let k = pool[i];
                let removed = sut.remove_if_contains(&k);
                prop_assert_eq!(removed, model.remove(&k).is_some());
            }
            OpI::Get(i) => {
                let k = pool[i];
                prop_assert_eq!(sut.get(&k).ok().copied(), model.get(&k).copied());
            }
            OpI::Contains(i) => {
                let k = pool[i];
                prop_assert_eq!(sut.contains(&k), model.contains_key(&k));
            }
        }

        prop_assert_eq!(sut.len() as usize, model.len());
        prop_assert!(
            sut.capacity() >= last_capacity,
            "capacity must never decrease"
        );
        last_capacity = sut.capacity();
    }

    for k in pool {
        prop_assert_eq!(sut.get(k).ok().copied(), model.get(k).copied());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_state_machine_heap((pool, ops) in arb_scenario()) {
        run_scenario(Heap, &pool, &ops)?;
    }

    #[test]
    fn prop_state_machine_arena((pool, ops) in arb_scenario()) {
        let arena = Arena::new();
        run_scenario(&arena, &pool, &ops)?;
    }
}
