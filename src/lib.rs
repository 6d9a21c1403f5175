//! buildmap: construct immutable, insertion-ordered maps and sets by
//! populating a short-lived mutable handle inside a callback.
//!
//! ```
//! use buildmap::{build_map, build_set};
//!
//! let m = build_map(|m| {
//!     m.insert("a", 1);
//!     m.insert("b", 2);
//!     m.insert("a", 3);
//! });
//! assert_eq!(m.keys().copied().collect::<Vec<_>>(), ["a", "b"]);
//! assert_eq!(m["a"], 3);
//!
//! let s = build_set(|s| {
//!     s.insert(1);
//!     s.insert(2);
//!     s.insert(1);
//! });
//! assert_eq!(s.iter().copied().collect::<Vec<_>>(), [1, 2]);
//! ```
//!
//! Internal Design:
//!
//! Layers
//! - StagingMap<K, V, S>: mutable structural table. Entries sit in a
//!   generational slot map, a hash table of slot keys indexes them, and a
//!   linked list through the slots keeps insertion order across removals.
//! - MutableMap / MutableSet: the handles lent to callbacks; thin wrappers
//!   over StagingMap with no public constructor.
//! - ImmutableMap / ImmutableSet: the frozen result. Entries are compacted
//!   into a Vec in insertion order and re-indexed by their stored hashes,
//!   so `K: Hash` is not invoked again while freezing.
//!
//! Handle lifetime
//! - Callbacks have type `FnOnce(&mut MutableMap<K, V, S>)`. The borrow is
//!   higher-ranked, so the handle cannot escape the callback:
//!
//! ```compile_fail
//! use buildmap::{build_map, MutableMap};
//!
//! let mut escaped: Option<&mut MutableMap<&str, i32>> = None;
//! let _m = build_map(|m| {
//!     escaped = Some(m);
//! });
//! ```
//!
//! - Handles cannot be constructed, defaulted or cloned outside the crate,
//!   so there is nothing to swap a handle's contents out into.
//!
//! Capacity hints
//! - Accepted as any primitive integer; negative values and values above
//!   `isize::MAX` are rejected before the callback runs. Hints never
//!   change contents, and pre-allocation from a hint is clamped.
//!
//! Singletons
//! - Frozen maps of zero or one entry carry no hash index. `singleton_map`
//!   copies one pair of any map into such a map.

mod builder;
mod capacity;
mod error;
mod immutable;
mod mutable;
mod singleton;
mod staging;
mod staging_proptest;

// Public surface
pub use builder::{
    build_map, build_map_with_capacity, build_map_with_hasher, build_set,
    build_set_with_capacity, build_set_with_hasher,
};
pub use capacity::{map_capacity, Capacity};
pub use error::{BuildError, BuildResult};
pub use immutable::{ImmutableMap, ImmutableSet, IntoIter, Iter, SetIter};
pub use mutable::{MutableMap, MutableSet};
pub use singleton::singleton_map;
pub use staging::Iter as MutableMapIter;

#[cfg(feature = "bench_internal")]
pub use staging::StagingMap;
