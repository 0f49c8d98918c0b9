//! Error types for AEAD operations.
//!
//! The taxonomy maps directly onto the status codes a caller sees at the
//! operation boundary: `INVALID_INPUT`, `AUTH_FAIL`, `UNSUPPORTED`, and
//! `INTERNAL`. `OK` is represented by `Result::Ok` rather than a variant.

use core::fmt;

/// Result type alias using our Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur during an AEAD operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// Null/zero-length argument where one isn't allowed, a key or IV of the
    /// wrong size, or a state-machine violation (e.g. `aad_update` after
    /// `encrypt_update`, or any `update` after `final`).
    InvalidInput,

    /// Tag mismatch in `decrypt_final`. The only error recoverable at the
    /// application layer, by rejecting the message.
    AuthenticationFailed,

    /// An optional feature was not compiled in (currently: the batch-stream
    /// API stub).
    Unsupported,

    /// Reserved. No code path in a correct implementation should produce
    /// this; its presence indicates a bug in the core itself.
    Internal,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInput => write!(f, "invalid input or state-machine violation"),
            Error::AuthenticationFailed => write!(f, "authentication tag mismatch"),
            Error::Unsupported => write!(f, "feature not compiled in"),
            Error::Internal => write!(f, "internal error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
