//! Error type shared by the builders and the singleton conversion.

use thiserror::Error;

/// Failure raised at a builder call boundary, before any callback runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("capacity hint must be non-negative, got {0}")]
    NegativeCapacity(i64),

    #[error("capacity hint {0} exceeds the maximum of isize::MAX elements")]
    CapacityOverflow(u64),

    #[error("cannot take a singleton of an empty map")]
    EmptySource,
}

pub type BuildResult<T> = Result<T, BuildError>;

// Lets an already validated `Capacity` pass through `TryInto<Capacity>`.
impl From<core::convert::Infallible> for BuildError {
    fn from(never: core::convert::Infallible) -> Self {
        match never {}
    }
}

#[cfg(test)]
mod tests {
    use super::BuildError;

    #[test]
    fn messages_name_the_offending_value() {
        assert_eq!(
            BuildError::NegativeCapacity(-3).to_string(),
            "capacity hint must be non-negative, got -3"
        );
        assert!(BuildError::CapacityOverflow(u64::MAX)
            .to_string()
            .contains(&u64::MAX.to_string()));
        assert_eq!(
            BuildError::EmptySource.to_string(),
            "cannot take a singleton of an empty map"
        );
    }
}
