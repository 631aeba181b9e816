//! Error types for decoding and validating bencode.

use core::fmt;

/// Why [`crate::decode`]'s internal recursive-descent routines gave up.
///
/// The public [`crate::decode`] entry point collapses every variant to
/// `None`, matching the source implementation's uniform NULL-on-failure
/// contract; this type exists so the decoder's internals can be unit
/// tested against a specific failure reason.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The input ended before a value that was expected to be there.
    UnexpectedEnd,
    /// The first byte of a value did not match any known tag.
    UnknownTag(u8),
    /// An `i...e` body was empty, non-numeric, or otherwise malformed.
    InvalidInteger,
    /// An `i...e` body parsed but did not fit in an `i64`.
    IntegerOverflow,
    /// A string's decimal length prefix was malformed.
    InvalidStringLength,
    /// A string's declared length reached past the end of the input.
    TruncatedString,
    /// A dictionary key was not a `String` node.
    NonStringKey,
    /// A dictionary key was immediately followed by the end marker.
    DanglingKey,
    /// The arena's allocator is in its sticky-failure state.
    AllocationFailed,
    /// Nesting exceeded [`crate::RECURSION_LIMIT`].
    RecursionLimitReached,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnexpectedEnd => write!(f, "unexpected end of input"),
            DecodeError::UnknownTag(b) => write!(f, "unknown leading byte {b:#04x}"),
            DecodeError::InvalidInteger => write!(f, "invalid integer"),
            DecodeError::IntegerOverflow => write!(f, "integer does not fit in i64"),
            DecodeError::InvalidStringLength => write!(f, "invalid string length prefix"),
            DecodeError::TruncatedString => write!(f, "string payload truncated"),
            DecodeError::NonStringKey => write!(f, "dictionary key is not a string"),
            DecodeError::DanglingKey => write!(f, "dictionary key has no paired value"),
            DecodeError::AllocationFailed => write!(f, "arena allocation failed"),
            DecodeError::RecursionLimitReached => write!(f, "recursion limit reached"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// Outcome of [`crate::validate`] when the input is not a single complete value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidateError {
    /// The input is a valid prefix of bencode but ends before the value is
    /// complete; it could succeed if more bytes were appended.
    ShortInput,
    /// The input contains a syntactic error; no amount of additional input
    /// would make it valid at this position.
    Malformed,
}

impl fmt::Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidateError::ShortInput => write!(f, "short input"),
            ValidateError::Malformed => write!(f, "malformed bencode"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ValidateError {}
