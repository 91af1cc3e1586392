//! Error types for map operations.

/// Error returned when a set operation is given two maps built with
/// different key-hasher capabilities.
///
/// `difference` and `intersection` compare tries slot by slot, which is only
/// meaningful when both sides placed their entries under the same hash
/// function. Hashers are compared by identity, never by behavior, so two
/// distinct custom hashers are always a mismatch even if their functions
/// agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HasherMismatch;

impl std::fmt::Display for HasherMismatch {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "maps were built with different key hashers and cannot be combined"
        )
    }
}

impl std::error::Error for HasherMismatch {}
