//! Singleton conversion: reduce a map to a new one-entry immutable map.

use crate::error::{BuildError, BuildResult};
use crate::immutable::ImmutableMap;
use core::hash::Hash;

/// Build a one-entry map from the first pair `source` yields.
///
/// Which pair that is depends on the source's iteration order; for
/// insertion-ordered maps it is the earliest entry. The result owns clones
/// and shares nothing with `source`.
pub fn singleton_map<'a, K, V, I>(source: I) -> BuildResult<ImmutableMap<K, V>>
where
    I: IntoIterator<Item = (&'a K, &'a V)>,
    K: Eq + Hash + Clone + 'a,
    V: Clone + 'a,
{
    let (k, v) = source
        .into_iter()
        .next()
        .ok_or(BuildError::EmptySource)?;
    Ok(ImmutableMap::singleton(k.clone(), v.clone()))
}
