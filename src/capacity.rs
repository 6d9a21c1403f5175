//! Capacity hints: validated conversion from caller integers and the
//! mapping from expected element count to table sizing.

use crate::error::{BuildError, BuildResult};

/// Largest number of slots reserved up front from a hint. Tables grow on
/// demand past this point.
const PREALLOCATION_LIMIT: usize = 1 << 20;

/// A validated, non-negative capacity hint.
///
/// Obtained from any primitive integer with `TryFrom`; negative values
/// and values above `isize::MAX` are rejected.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Capacity(usize);

impl Capacity {
    pub const ZERO: Capacity = Capacity(0);
    pub const MAX: usize = isize::MAX as usize;

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }

    fn from_signed(n: i64) -> BuildResult<Self> {
        if n < 0 {
            return Err(BuildError::NegativeCapacity(n));
        }
        Self::from_unsigned(n as u64)
    }

    fn from_unsigned(n: u64) -> BuildResult<Self> {
        if n > Self::MAX as u64 {
            return Err(BuildError::CapacityOverflow(n));
        }
        Ok(Capacity(n as usize))
    }
}

macro_rules! capacity_from_signed {
    ($($t:ty),*) => {$(
        impl TryFrom<$t> for Capacity {
            type Error = BuildError;
            #[inline]
            fn try_from(n: $t) -> BuildResult<Self> {
                Self::from_signed(n as i64)
            }
        }
    )*};
}

macro_rules! capacity_from_unsigned {
    ($($t:ty),*) => {$(
        impl TryFrom<$t> for Capacity {
            type Error = BuildError;
            #[inline]
            fn try_from(n: $t) -> BuildResult<Self> {
                Self::from_unsigned(n as u64)
            }
        }
    )*};
}

capacity_from_signed!(i8, i16, i32, i64, isize);
capacity_from_unsigned!(u8, u16, u32, u64, usize);

impl From<Capacity> for usize {
    fn from(c: Capacity) -> usize {
        c.0
    }
}

/// Maps an expected element count to the sizing unit of the backing table.
///
/// `hashbrown` applies its own load factor when reserving, so the count is
/// passed through unchanged.
#[inline]
pub fn map_capacity(expected_size: usize) -> usize {
    expected_size
}

/// Number of slots actually reserved for a hint.
pub(crate) fn preallocation(capacity: Capacity) -> usize {
    map_capacity(capacity.get()).min(PREALLOCATION_LIMIT)
}
