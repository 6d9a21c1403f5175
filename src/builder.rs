//! Builder entry points.
//!
//! Each builder creates a staging collection, lends it to `action` exactly
//! once as `&mut`, and freezes it when `action` returns. The handle's
//! borrow is higher-ranked over the callback, so it cannot be stored
//! anywhere that outlives the call.

use crate::capacity::Capacity;
use crate::error::{BuildError, BuildResult};
use crate::immutable::{ImmutableMap, ImmutableSet};
use crate::mutable::{MutableMap, MutableSet};
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

fn validate<C>(capacity: C) -> BuildResult<Capacity>
where
    C: TryInto<Capacity>,
    C::Error: Into<BuildError>,
{
    capacity.try_into().map_err(|e| {
        let e = e.into();
        tracing::debug!(error = %e, "rejected capacity hint");
        e
    })
}

/// Build an [`ImmutableMap`] by populating a [`MutableMap`] in `action`.
///
/// Entries iterate in the order their keys were first inserted.
pub fn build_map<K, V, F>(action: F) -> ImmutableMap<K, V>
where
    K: Eq + Hash,
    F: FnOnce(&mut MutableMap<K, V>),
{
    build_map_with_hasher(Capacity::ZERO, RandomState::new(), action)
}

/// As [`build_map`], with `capacity` hinting how many entries `action`
/// will add.
///
/// Fails with [`BuildError::NegativeCapacity`] or
/// [`BuildError::CapacityOverflow`] before `action` runs.
pub fn build_map_with_capacity<K, V, C, F>(capacity: C, action: F) -> BuildResult<ImmutableMap<K, V>>
where
    K: Eq + Hash,
    C: TryInto<Capacity>,
    C::Error: Into<BuildError>,
    F: FnOnce(&mut MutableMap<K, V>),
{
    let capacity = validate(capacity)?;
    Ok(build_map_with_hasher(capacity, RandomState::new(), action))
}

pub fn build_map_with_hasher<K, V, S, F>(capacity: Capacity, hasher: S, action: F) -> ImmutableMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
    F: FnOnce(&mut MutableMap<K, V, S>),
{
    tracing::trace!(capacity = capacity.get(), "building map");
    let mut staging = MutableMap::with_capacity_and_hasher(capacity, hasher);
    action(&mut staging);
    let map = staging.freeze();
    tracing::trace!(len = map.len(), "map frozen");
    map
}

/// Build an [`ImmutableSet`] by populating a [`MutableSet`] in `action`.
///
/// Elements iterate in the order they were first inserted.
pub fn build_set<T, F>(action: F) -> ImmutableSet<T>
where
    T: Eq + Hash,
    F: FnOnce(&mut MutableSet<T>),
{
    build_set_with_hasher(Capacity::ZERO, RandomState::new(), action)
}

/// As [`build_set`], with `capacity` hinting how many elements `action`
/// will add.
pub fn build_set_with_capacity<T, C, F>(capacity: C, action: F) -> BuildResult<ImmutableSet<T>>
where
    T: Eq + Hash,
    C: TryInto<Capacity>,
    C::Error: Into<BuildError>,
    F: FnOnce(&mut MutableSet<T>),
{
    let capacity = validate(capacity)?;
    Ok(build_set_with_hasher(capacity, RandomState::new(), action))
}

pub fn build_set_with_hasher<T, S, F>(capacity: Capacity, hasher: S, action: F) -> ImmutableSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
    F: FnOnce(&mut MutableSet<T, S>),
{
    tracing::trace!(capacity = capacity.get(), "building set");
    let mut staging = MutableSet::with_capacity_and_hasher(capacity, hasher);
    action(&mut staging);
    let set = staging.freeze();
    tracing::trace!(len = set.len(), "set frozen");
    set
}
