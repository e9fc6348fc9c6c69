//! Error types for list and ring operations.

use core::fmt;

/// Error returned when a [`Ring`](crate::Ring) cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// A ring needs at least one slot.
    #[error("ring capacity must be greater than zero")]
    ZeroCapacity,
}

/// Error returned when an insertion anchor is not linked into the list.
///
/// The anchor handle belongs to another list or its node was already
/// deleted. The payload is handed back untouched.
#[derive(Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError<T> {
    /// The anchor node is foreign or stale.
    #[error("anchor node is not linked into this list")]
    Detached(T),
}

impl<T> LinkError<T> {
    /// Returns the value that could not be inserted.
    pub fn into_inner(self) -> T {
        match self {
            Self::Detached(value) => value,
        }
    }
}

impl<T> fmt::Debug for LinkError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detached(_) => f.write_str("Detached(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_error_returns_payload() {
        let err = LinkError::Detached(String::from("payload"));
        assert_eq!(err.to_string(), "anchor node is not linked into this list");
        assert_eq!(format!("{err:?}"), "Detached(..)");
        assert_eq!(err.into_inner(), "payload");
    }

    #[test]
    fn ring_error_display() {
        assert_eq!(
            RingError::ZeroCapacity.to_string(),
            "ring capacity must be greater than zero"
        );
    }
}
