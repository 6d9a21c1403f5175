#![cfg(test)]

// Property tests for StagingMap kept inside the crate so they do not
// require feature gates to access internal modules.

use crate::capacity::Capacity;
use crate::staging::StagingMap;
use proptest::prelude::*;
use std::cell::Cell;
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Ordered association list; the reference semantics for StagingMap.
#[derive(Default)]
struct Model(Vec<(Key, i32)>);

impl Model {
    fn pos(&self, k: &str) -> Option<usize> {
        self.0.iter().position(|(kk, _)| kk.0 == k)
    }
    fn insert(&mut self, k: Key, v: i32) -> Option<i32> {
        match self.pos(&k.0) {
            Some(i) => Some(std::mem::replace(&mut self.0[i].1, v)),
            None => {
                self.0.push((k, v));
                None
            }
        }
    }
    fn remove(&mut self, k: &str) -> Option<(Key, i32)> {
        self.pos(k).map(|i| self.0.remove(i))
    }
    fn get(&self, k: &str) -> Option<i32> {
        self.pos(k).map(|i| self.0[i].1)
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    GetOrInsertWith(usize, i32),
    Remove(usize),
    Contains(String),
    Mutate(usize, i32),
    RetainEven,
    Clear,
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::GetOrInsertWith(i, v)),
            3 => idx.clone().prop_map(OpI::Remove),
            2 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::RetainEven),
            1 => Just(OpI::Clear),
            2 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_scenario<S>(mut sut: StagingMap<Key, i32, S>, pool: &[String], ops: Vec<OpI>) -> Result<(), TestCaseError>
where
    S: BuildHasher,
{
    let mut model = Model::default();
    let default_calls = Cell::new(0);

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let expected = model.insert(k.clone(), v);
                prop_assert_eq!(sut.insert(k, v), expected);
            }
            OpI::GetOrInsertWith(i, v) => {
                let k = key_from(pool, i);
                let before = default_calls.get();
                let present = model.get(&k.0);
                let got = *sut.get_or_insert_with(k.clone(), || {
                    default_calls.set(default_calls.get() + 1);
                    v
                });
                match present {
                    Some(mv) => {
                        prop_assert_eq!(got, mv);
                        prop_assert_eq!(default_calls.get(), before, "default must not run when present");
                    }
                    None => {
                        prop_assert_eq!(got, v);
                        prop_assert_eq!(default_calls.get(), before + 1, "default must run exactly once on insert");
                        model.insert(k, v);
                    }
                }
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.remove_entry(k.0.as_str()), model.remove(&k.0));
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.pos(&s).is_some());
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                if let Some(vr) = sut.get_mut(k.0.as_str()) {
                    *vr = vr.saturating_add(d);
                    let mi = model.pos(&k.0).expect("live in model");
                    model.0[mi].1 = model.0[mi].1.saturating_add(d);
                } else {
                    prop_assert!(model.pos(&k.0).is_none());
                }
            }
            OpI::RetainEven => {
                sut.retain(|_, v| *v % 2 == 0);
                model.0.retain(|(_, v)| *v % 2 == 0);
            }
            OpI::Clear => {
                sut.clear();
                model.0.clear();
            }
            OpI::Iterate => {
                let got: Vec<(Key, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(&got, &model.0);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.0.len());
        prop_assert_eq!(sut.is_empty(), model.0.is_empty());
        prop_assert_eq!(sut.iter().len(), model.0.len());
    }

    // Freezing yields the model's associations in the model's order.
    let frozen = sut.freeze();
    let got: Vec<(Key, i32)> = frozen.iter().map(|(k, v)| (k.clone(), *v)).collect();
    prop_assert_eq!(&got, &model.0);
    for (k, v) in &model.0 {
        prop_assert_eq!(frozen.get(k.0.as_str()), Some(v));
    }
    Ok(())
}

// Property: State-machine equivalence against an ordered association list.
// Invariants exercised across random operation sequences:
// - `insert` overwrites in place and reports the previous value.
// - `get_or_insert_with` runs its constructor only when inserting.
// - `remove_entry` returns the owned pair and keeps survivors in order.
// - `iter` yields live entries in first-insertion order.
// - `freeze` preserves order and lookups.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(StagingMap::new(), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: Same state-machine invariants as above, under worst-case
// collision behavior (constant hasher). This stresses equality probing
// and collision resolution in the index.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = StagingMap::with_capacity_and_hasher(Capacity::ZERO, ConstBuildHasher);
        run_scenario(sut, &pool, ops)?;
    }
}
