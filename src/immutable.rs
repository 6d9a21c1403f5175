//! Read-only, insertion-ordered snapshots produced by the builders.
//!
//! `ImmutableMap` keeps its entries in a `Vec` in insertion order. Maps
//! with more than one entry also carry a `HashTable` of positions keyed by
//! the hash stored with each entry; empty and singleton maps skip the
//! index and compare keys directly.

use crate::capacity::Capacity;
use crate::error::BuildResult;
use crate::singleton::singleton_map;
use crate::staging::StagingMap;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;
use hashbrown::HashTable;
use std::collections::hash_map::RandomState;

#[derive(Clone, Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
}

/// An immutable map whose iteration order is the order in which its keys
/// were first inserted.
#[derive(Clone)]
pub struct ImmutableMap<K, V, S = RandomState> {
    hasher: S,
    entries: Vec<Entry<K, V>>,
    index: Option<HashTable<usize>>,
}

impl<K, V> ImmutableMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::from_entries(Vec::new(), RandomState::new())
    }

    /// A map holding exactly one entry.
    pub fn singleton(key: K, value: V) -> Self {
        Self::singleton_with_hasher(key, value, RandomState::new())
    }
}

impl<K, V> Default for ImmutableMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ImmutableMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub(crate) fn from_entries(entries: Vec<Entry<K, V>>, hasher: S) -> Self {
        let index = if entries.len() > 1 {
            let mut index = HashTable::with_capacity(entries.len());
            for (i, e) in entries.iter().enumerate() {
                index.insert_unique(e.hash, i, |&j| entries[j].hash);
            }
            Some(index)
        } else {
            None
        };
        Self {
            hasher,
            entries,
            index,
        }
    }

    pub fn singleton_with_hasher(key: K, value: V, hasher: S) -> Self {
        let hash = hasher.hash_one(&key);
        Self::from_entries(vec![Entry { key, value, hash }], hasher)
    }

    fn position<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match &self.index {
            None => self.entries.iter().position(|e| e.key.borrow() == q),
            Some(index) => {
                let hash = self.hasher.hash_one(q);
                index
                    .find(hash, |&i| self.entries[i].key.borrow() == q)
                    .copied()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.position(q).map(|i| &self.entries[i].value)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.position(q).map(|i| {
            let e = &self.entries[i];
            (&e.key, &e.value)
        })
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.position(q).is_some()
    }

    /// The earliest-inserted entry.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.entries.first().map(|e| (&e.key, &e.value))
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.entries.iter(),
        }
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &K> + '_ {
        self.entries.iter().map(|e| &e.key)
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> + '_ {
        self.entries.iter().map(|e| &e.value)
    }

    /// A new one-entry map holding a copy of this map's first entry.
    pub fn to_singleton(&self) -> BuildResult<ImmutableMap<K, V>>
    where
        K: Clone,
        V: Clone,
    {
        singleton_map(self)
    }
}

/// Iterator over a map's entries in insertion order.
pub struct Iter<'a, K, V> {
    it: core::slice::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|e| (&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(|e| (&e.key, &e.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Owning iterator over a map's entries in insertion order.
pub struct IntoIter<K, V> {
    it: std::vec::IntoIter<Entry<K, V>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|e| (e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V, S> IntoIterator for ImmutableMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            it: self.entries.into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a ImmutableMap<K, V, S>
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

impl<K, V, S> FromIterator<(K, V)> for ImmutableMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let hint = Capacity::try_from(iter.size_hint().0).unwrap_or_default();
        let mut staging = StagingMap::with_capacity_and_hasher(hint, S::default());
        for (k, v) in iter {
            staging.insert(k, v);
        }
        staging.freeze()
    }
}

impl<K, Q, V, S> Index<&Q> for ImmutableMap<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    /// Panics if the key is absent.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not present in ImmutableMap")
    }
}

/// Maps are equal when they hold the same associations, in any order.
impl<K, V, S> PartialEq for ImmutableMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).map_or(false, |ov| v == ov))
    }
}

impl<K, V, S> Eq for ImmutableMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> fmt::Debug for ImmutableMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|e| (&e.key, &e.value)))
            .finish()
    }
}

/// An immutable set whose iteration order is the order in which its
/// elements were first inserted.
#[derive(Clone)]
pub struct ImmutableSet<T, S = RandomState> {
    map: ImmutableMap<T, (), S>,
}

impl<T> ImmutableSet<T>
where
    T: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            map: ImmutableMap::new(),
        }
    }

    /// A set holding exactly one element.
    pub fn singleton(value: T) -> Self {
        Self {
            map: ImmutableMap::singleton(value, ()),
        }
    }
}

impl<T> Default for ImmutableSet<T>
where
    T: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> ImmutableSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    pub(crate) fn from_map(map: ImmutableMap<T, (), S>) -> Self {
        Self { map }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(q)
    }

    /// The stored element equal to `q`, if any.
    pub fn get<Q>(&self, q: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get_key_value(q).map(|(k, _)| k)
    }

    pub fn first(&self) -> Option<&T> {
        self.map.first().map(|(k, _)| k)
    }

    pub fn iter(&self) -> SetIter<'_, T> {
        SetIter {
            it: self.map.iter(),
        }
    }

    pub fn is_subset<S2>(&self, other: &ImmutableSet<T, S2>) -> bool
    where
        S2: BuildHasher,
    {
        self.len() <= other.len() && self.iter().all(|v| other.contains(v))
    }
}

/// Iterator over a set's elements in insertion order.
pub struct SetIter<'a, T> {
    it: Iter<'a, T, ()>,
}

impl<'a, T> Iterator for SetIter<'a, T> {
    type Item = &'a T;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<T> DoubleEndedIterator for SetIter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(|(k, _)| k)
    }
}

impl<T> ExactSizeIterator for SetIter<'_, T> {}

impl<T, S> IntoIterator for ImmutableSet<T, S> {
    type Item = T;
    type IntoIter = core::iter::Map<IntoIter<T, ()>, fn((T, ())) -> T>;
    fn into_iter(self) -> Self::IntoIter {
        let first: fn((T, ())) -> T = |(k, _)| k;
        self.map.into_iter().map(first)
    }
}

impl<'a, T, S> IntoIterator for &'a ImmutableSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    type Item = &'a T;
    type IntoIter = SetIter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S> FromIterator<T> for ImmutableSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|v| (v, ())).collect(),
        }
    }
}

impl<T, S> PartialEq for ImmutableSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T, S> Eq for ImmutableSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
}

impl<T, S> fmt::Debug for ImmutableSet<T, S>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.map.entries.iter().map(|e| &e.key))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ImmutableMap<String, i32> {
        [("c", 3), ("a", 1), ("b", 2)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn empty_and_singleton_skip_index() {
        let e: ImmutableMap<String, i32> = ImmutableMap::new();
        assert!(e.index.is_none());
        assert!(e.is_empty());
        assert_eq!(e.get("a"), None);
        assert_eq!(e.first(), None);

        let s = ImmutableMap::singleton("k".to_string(), 7);
        assert!(s.index.is_none());
        assert_eq!(s.len(), 1);
        assert_eq!(s.get("k"), Some(&7));
        assert!(!s.contains_key("x"));

        assert!(sample().index.is_some());
    }

    #[test]
    fn lookups_and_iteration_follow_insertion_order() {
        let m = sample();
        assert_eq!(m.len(), 3);
        assert_eq!(m["a"], 1);
        assert_eq!(m.get_key_value("b"), Some((&"b".to_string(), &2)));
        assert!(!m.contains_key("z"));
        let keys: Vec<&str> = m.keys().map(String::as_str).collect();
        assert_eq!(keys, ["c", "a", "b"]);
        let values: Vec<i32> = m.values().copied().collect();
        assert_eq!(values, [3, 1, 2]);
        assert_eq!(m.first(), Some((&"c".to_string(), &3)));
        let rev: Vec<&str> = m.iter().rev().map(|(k, _)| k.as_str()).collect();
        assert_eq!(rev, ["b", "a", "c"]);
        let owned: Vec<(String, i32)> = m.into_iter().collect();
        assert_eq!(owned[0], ("c".to_string(), 3));
    }

    #[test]
    #[should_panic(expected = "key not present")]
    fn index_panics_on_missing_key() {
        let m = sample();
        let _v: &i32 = &m["missing"];
    }

    #[test]
    fn equality_ignores_order() {
        let m1 = sample();
        let m2: ImmutableMap<String, i32> = [("a", 1), ("b", 2), ("c", 3)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(m1, m2);
        let m3: ImmutableMap<String, i32> = [("a", 1), ("b", 2), ("c", 4)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_ne!(m1, m3);
    }

    #[test]
    fn debug_renders_in_insertion_order() {
        let m: ImmutableMap<&str, i32> = [("b", 2), ("a", 1)].into_iter().collect();
        assert_eq!(format!("{:?}", m), r#"{"b": 2, "a": 1}"#);
        let s: ImmutableSet<i32> = [3, 1, 2].into_iter().collect();
        assert_eq!(format!("{:?}", s), "{3, 1, 2}");
    }

    #[test]
    fn set_basics() {
        let s: ImmutableSet<String> = ["x", "y", "x", "z"]
            .into_iter()
            .map(str::to_string)
            .collect();
        assert_eq!(s.len(), 3);
        assert!(s.contains("y"));
        assert_eq!(s.get("z"), Some(&"z".to_string()));
        assert_eq!(s.first().map(String::as_str), Some("x"));
        let items: Vec<&str> = s.iter().map(String::as_str).collect();
        assert_eq!(items, ["x", "y", "z"]);

        let one = ImmutableSet::singleton("y".to_string());
        assert!(one.is_subset(&s));
        assert!(!s.is_subset(&one));
        assert_eq!(one.into_iter().collect::<Vec<_>>(), ["y".to_string()]);
    }
}
