//! StagingMap: mutable, insertion-ordered table behind a builder handle.
//!
//! Entries live in a generational `SlotMap`; a `HashTable` of slot keys
//! indexes them by hash, and a doubly linked list threaded through the
//! slots records insertion order. Removal unlinks in O(1) and leaves the
//! relative order of the remaining entries intact.

use crate::capacity::{preallocation, Capacity};
use crate::immutable::{Entry, ImmutableMap};
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_table;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;

#[derive(Debug)]
struct Slot<K, V> {
    key: K,
    value: V,
    hash: u64,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

pub struct StagingMap<K, V, S = RandomState> {
    hasher: S,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Slot<K, V>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<K, V> StagingMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_capacity_and_hasher(Capacity::ZERO, Default::default())
    }
}

impl<K, V> Default for StagingMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over entries in insertion order.
pub struct Iter<'a, K, V> {
    slots: &'a SlotMap<DefaultKey, Slot<K, V>>,
    next: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.next?;
        let slot = &self.slots[k];
        self.next = slot.next;
        self.remaining -= 1;
        Some((&slot.key, &slot.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V, S> StagingMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_capacity_and_hasher(capacity: Capacity, hasher: S) -> Self {
        let n = preallocation(capacity);
        Self {
            hasher,
            index: HashTable::with_capacity(n),
            slots: SlotMap::with_capacity_and_key(n),
            head: None,
            tail: None,
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn find<Q>(&self, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.index
            .find(hash, |&k| {
                self.slots
                    .get(k)
                    .map(|s| s.key.borrow() == q)
                    .unwrap_or(false)
            })
            .copied()
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).is_some()
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = &self.slots[self.find(q)?];
        Some((&slot.key, &slot.value))
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self.find(q)?;
        self.slots.get_mut(k).map(|s| &mut s.value)
    }

    /// Insert or overwrite. An existing key keeps its position and its
    /// original key value; the previous value is returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.make_hash(&key);
        let k = match self.index.entry(
            hash,
            |&kk| {
                self.slots
                    .get(kk)
                    .map(|s| s.key == key)
                    .unwrap_or(false)
            },
            |&kk| self.slots.get(kk).map(|s| s.hash).unwrap_or(0),
        ) {
            hash_table::Entry::Occupied(o) => {
                let slot = &mut self.slots[*o.get()];
                return Some(core::mem::replace(&mut slot.value, value));
            }
            hash_table::Entry::Vacant(v) => {
                let k = self.slots.insert(Slot {
                    key,
                    value,
                    hash,
                    prev: self.tail,
                    next: None,
                });
                let _ = v.insert(k);
                k
            }
        };
        self.link_back(k);
        None
    }

    /// Return the value for `key`, inserting `default()` first when absent.
    /// `default` runs only on the inserting path.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let hash = self.make_hash(&key);
        let (k, inserted) = match self.index.entry(
            hash,
            |&kk| {
                self.slots
                    .get(kk)
                    .map(|s| s.key == key)
                    .unwrap_or(false)
            },
            |&kk| self.slots.get(kk).map(|s| s.hash).unwrap_or(0),
        ) {
            hash_table::Entry::Occupied(o) => (*o.get(), false),
            hash_table::Entry::Vacant(v) => {
                let k = self.slots.insert(Slot {
                    key,
                    value: default(),
                    hash,
                    prev: self.tail,
                    next: None,
                });
                let _ = v.insert(k);
                (k, true)
            }
        };
        if inserted {
            self.link_back(k);
        }
        &mut self.slots[k].value
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let found = self.index.find_entry(hash, |&k| {
            self.slots
                .get(k)
                .map(|s| s.key.borrow() == q)
                .unwrap_or(false)
        });
        let (k, _) = found.ok()?.remove();
        Some(self.unlink(k))
    }

    /// Keep only the entries for which `keep` returns true, visiting them
    /// in insertion order.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut cur = self.head;
        while let Some(k) = cur {
            let slot = &mut self.slots[k];
            cur = slot.next;
            if !keep(&slot.key, &mut slot.value) {
                let hash = slot.hash;
                self.index
                    .find_entry(hash, |&kk| kk == k)
                    .expect("live slot must be indexed")
                    .remove();
                let _ = self.unlink(k);
            }
        }
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.head = None;
        self.tail = None;
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            next: self.head,
            remaining: self.slots.len(),
        }
    }

    /// Consume the table into an immutable map in insertion order.
    pub fn freeze(mut self) -> ImmutableMap<K, V, S> {
        let mut entries = Vec::with_capacity(self.slots.len());
        let mut cur = self.head;
        while let Some(k) = cur {
            let slot = self
                .slots
                .remove(k)
                .expect("insertion list must only link live slots");
            cur = slot.next;
            entries.push(Entry {
                key: slot.key,
                value: slot.value,
                hash: slot.hash,
            });
        }
        debug_assert!(self.slots.is_empty());
        ImmutableMap::from_entries(entries, self.hasher)
    }

    fn link_back(&mut self, k: DefaultKey) {
        match self.tail {
            Some(t) => self.slots[t].next = Some(k),
            None => self.head = Some(k),
        }
        self.tail = Some(k);
    }

    // Caller must already have dropped `k` from the index.
    fn unlink(&mut self, k: DefaultKey) -> (K, V) {
        let slot = self
            .slots
            .remove(k)
            .expect("indexed slot must be live");
        match slot.prev {
            Some(p) => self.slots[p].next = slot.next,
            None => self.head = slot.next,
        }
        match slot.next {
            Some(n) => self.slots[n].prev = slot.prev,
            None => self.tail = slot.prev,
        }
        (slot.key, slot.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn keys<V, S>(m: &StagingMap<String, V, S>) -> Vec<&str>
    where
        S: BuildHasher,
    {
        m.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Invariant: overwriting an existing key returns the old value and keeps
    /// the key in its first-insertion position.
    #[test]
    fn overwrite_keeps_position() {
        let mut m: StagingMap<String, i32> = StagingMap::new();
        assert_eq!(m.insert("a".to_string(), 1), None);
        assert_eq!(m.insert("b".to_string(), 2), None);
        assert_eq!(m.insert("a".to_string(), 3), Some(1));
        assert_eq!(keys(&m), ["a", "b"]);
        assert_eq!(m.get_key_value("a"), Some((&"a".to_string(), &3)));
        assert_eq!(m.len(), 2);
    }

    /// Invariant: removal preserves the relative order of the survivors, and a
    /// key inserted again after removal goes to the end.
    #[test]
    fn remove_then_reinsert_moves_to_end() {
        let mut m: StagingMap<String, i32> = StagingMap::new();
        for (i, k) in ["a", "b", "c", "d"].iter().enumerate() {
            m.insert((*k).to_string(), i as i32);
        }
        assert_eq!(m.remove_entry("b"), Some(("b".to_string(), 1)));
        assert_eq!(keys(&m), ["a", "c", "d"]);
        assert_eq!(m.remove_entry("a"), Some(("a".to_string(), 0)));
        assert_eq!(m.remove_entry("d"), Some(("d".to_string(), 3)));
        assert_eq!(keys(&m), ["c"]);
        assert_eq!(m.remove_entry("zz"), None);

        m.insert("a".to_string(), 10);
        assert_eq!(keys(&m), ["c", "a"]);
    }

    /// Invariant: `get_or_insert_with` runs the constructor only on insert.
    #[test]
    fn get_or_insert_with_is_lazy() {
        let mut m: StagingMap<&'static str, Vec<i32>> = StagingMap::new();
        let calls = Cell::new(0);
        m.get_or_insert_with("k", || {
            calls.set(calls.get() + 1);
            Vec::new()
        })
        .push(1);
        m.get_or_insert_with("k", || {
            calls.set(calls.get() + 1);
            Vec::new()
        })
        .push(2);
        assert_eq!(calls.get(), 1);
        assert_eq!(m.get_key_value("k").map(|(_, v)| v.clone()), Some(vec![1, 2]));
    }

    /// Invariant: `retain` drops rejected entries from both index and order.
    #[test]
    fn retain_filters_in_order() {
        let mut m: StagingMap<String, i32> = StagingMap::new();
        for i in 0..10 {
            m.insert(format!("k{}", i), i);
        }
        let mut visited = Vec::new();
        m.retain(|k, v| {
            visited.push(k.clone());
            *v *= 10;
            *v % 20 == 0
        });
        let expected: Vec<String> = (0..10).map(|i| format!("k{}", i)).collect();
        assert_eq!(visited, expected);
        assert_eq!(keys(&m), ["k0", "k2", "k4", "k6", "k8"]);
        assert!(!m.contains_key("k1"));
        assert_eq!(m.get_key_value("k4").map(|(_, v)| *v), Some(40));
    }

    #[test]
    fn clear_resets_order() {
        let mut m: StagingMap<String, i32> = StagingMap::new();
        m.insert("x".to_string(), 1);
        m.insert("y".to_string(), 2);
        m.clear();
        assert!(m.is_empty());
        assert_eq!(m.iter().len(), 0);
        m.insert("y".to_string(), 3);
        m.insert("x".to_string(), 4);
        assert_eq!(keys(&m), ["y", "x"]);
    }

    /// Invariant: freezing preserves insertion order and values.
    #[test]
    fn freeze_preserves_order() {
        let mut m: StagingMap<String, i32> = StagingMap::new();
        for (i, k) in ["z", "y", "x", "w"].iter().enumerate() {
            m.insert((*k).to_string(), i as i32);
        }
        m.remove_entry("y");
        *m.get_mut("w").unwrap() += 100;
        let frozen = m.freeze();
        let got: Vec<(&str, i32)> = frozen.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(got, [("z", 0), ("x", 2), ("w", 103)]);
        assert_eq!(frozen.get("x"), Some(&2));
        assert_eq!(frozen.get("y"), None);
    }

    /// Invariant: lookups resolve by equality under total hash collision.
    #[test]
    fn collision_handling_with_const_hasher() {
        #[derive(Clone, Default)]
        struct ConstBuildHasher;
        struct ConstHasher;
        impl BuildHasher for ConstBuildHasher {
            type Hasher = ConstHasher;
            fn build_hasher(&self) -> Self::Hasher {
                ConstHasher
            }
        }
        impl core::hash::Hasher for ConstHasher {
            fn write(&mut self, _bytes: &[u8]) {}
            fn finish(&self) -> u64 {
                0
            }
        }

        let mut m: StagingMap<String, i32, ConstBuildHasher> =
            StagingMap::with_capacity_and_hasher(Capacity::ZERO, ConstBuildHasher);
        m.insert("a".to_string(), 1);
        m.insert("b".to_string(), 2);
        m.insert("a".to_string(), 3);
        assert_eq!(m.len(), 2);
        assert_eq!(m.get_key_value("a").map(|(_, v)| *v), Some(3));
        assert_eq!(m.remove_entry("a"), Some(("a".to_string(), 3)));
        assert_eq!(m.get_key_value("b").map(|(_, v)| *v), Some(2));
        assert_eq!(keys(&m), ["b"]);
    }
}
